#![forbid(unsafe_code)]

//! Rules and their evaluation
//!
//! Rules are a closed set of variants behind one capability: evaluate a
//! candidate, consulting the store when needed, and yield the evidence of
//! violation. Evidence is produced as a lazy stream so callers can stop early;
//! [`Rule::evaluate`] drains the stream for a complete answer.

use crate::engine::{CancellationToken, CorpusCursor};
use crate::error::CheckError;
use crate::model::Document;
use crate::rules::{Comparison, ContradictionOracle, StatementPattern, TagSelector};
use crate::store::DocumentStore;
use crate::types::RuleId;
use tracing::debug;

/// Default number of documents fetched per corpus scan read
pub const DEFAULT_SCAN_BATCH: usize = 64;

/// Everything a rule may consult while evaluating a candidate
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub store: &'a dyn DocumentStore,
    pub oracle: &'a dyn ContradictionOracle,
    pub token: &'a CancellationToken,
    pub scan_batch: usize,
}

/// Outcome of evaluating one rule against one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Satisfied,
    /// Evidence documents in the order the rule produced them
    Violated(Vec<Document>),
}

impl Evaluation {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Evaluation::Satisfied)
    }

    pub fn evidence(&self) -> &[Document] {
        match self {
            Evaluation::Satisfied => &[],
            Evaluation::Violated(docs) => docs,
        }
    }

    pub fn into_evidence(self) -> Vec<Document> {
        match self {
            Evaluation::Satisfied => Vec::new(),
            Evaluation::Violated(docs) => docs,
        }
    }
}

/// Checks that look only at the candidate's own statements
#[derive(Debug, Clone)]
pub enum SelfContainedCheck {
    /// At least one statement matches the pattern
    Require(StatementPattern),
    /// No statement matches the pattern
    Forbid(StatementPattern),
    /// No two statements contradict each other
    Consistent,
    /// The candidate has at least one statement
    NonEmpty,
}

impl SelfContainedCheck {
    fn holds(&self, candidate: &Document, oracle: &dyn ContradictionOracle) -> bool {
        let statements = &candidate.statements;
        match self {
            SelfContainedCheck::Require(pattern) => statements.iter().any(|s| pattern.matches(s)),
            SelfContainedCheck::Forbid(pattern) => !statements.iter().any(|s| pattern.matches(s)),
            SelfContainedCheck::Consistent => statements.iter().enumerate().all(|(i, a)| {
                statements[i + 1..].iter().all(|b| !oracle.contradicts(a, b))
            }),
            SelfContainedCheck::NonEmpty => !statements.is_empty(),
        }
    }
}

/// A rule judged against other documents in the store
#[derive(Debug, Clone)]
pub struct CorpusRule {
    pub selector: TagSelector,
    pub comparison: Comparison,
}

impl CorpusRule {
    fn implicates(&self, candidate: &Document, reference: &Document, oracle: &dyn ContradictionOracle) -> bool {
        // A stored candidate is never evidence against itself
        if candidate.id.is_some() && candidate.id == reference.id {
            return false;
        }
        self.selector.selects(reference)
            && self
                .comparison
                .conflicts(&candidate.statements, &reference.statements, oracle)
    }
}

#[derive(Debug, Clone)]
pub enum RuleKind {
    SelfContained(SelfContainedCheck),
    CorpusRelative(CorpusRule),
}

/// A named predicate over a document's statements
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    description: String,
    kind: RuleKind,
}

impl Rule {
    pub fn new(id: RuleId, description: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            id,
            description: description.into(),
            kind,
        }
    }

    pub fn id(&self) -> &RuleId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Short name of the rule's variant, as used in configuration
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            RuleKind::SelfContained(SelfContainedCheck::Require(_)) => "require",
            RuleKind::SelfContained(SelfContainedCheck::Forbid(_)) => "forbid",
            RuleKind::SelfContained(SelfContainedCheck::Consistent) => "consistent",
            RuleKind::SelfContained(SelfContainedCheck::NonEmpty) => "non-empty",
            RuleKind::CorpusRelative(_) => "corpus",
        }
    }

    /// What the rule matches on, e.g. `subject=/^X$/` or `tags=policy:A comparison=contradicts`
    ///
    /// Empty for checks that take no parameters.
    pub fn criteria(&self) -> String {
        match &self.kind {
            RuleKind::SelfContained(SelfContainedCheck::Require(pattern))
            | RuleKind::SelfContained(SelfContainedCheck::Forbid(pattern)) => pattern.describe(),
            RuleKind::SelfContained(_) => String::new(),
            RuleKind::CorpusRelative(corpus) => {
                let patterns = corpus.selector.patterns();
                let tags = if patterns.is_empty() {
                    "*".to_string()
                } else {
                    patterns.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(",")
                };
                format!("tags={} comparison={}", tags, corpus.comparison.as_str())
            }
        }
    }

    /// Lazily yields the evidence documents this rule holds against `candidate`
    ///
    /// Self-contained rules yield the candidate itself at most once. Corpus rules
    /// yield matching stored documents in ascending id order, reading the store
    /// one batch at a time.
    pub fn evidence<'a>(&'a self, candidate: &'a Document, ctx: EvaluationContext<'a>) -> RuleEvidence<'a> {
        match &self.kind {
            RuleKind::SelfContained(check) => {
                let violated = !check.holds(candidate, ctx.oracle);
                debug!(rule = %self.id, violated, "Evaluated self-contained rule");
                RuleEvidence::Candidate(violated.then(|| candidate.clone()))
            }
            RuleKind::CorpusRelative(rule) => RuleEvidence::Corpus {
                rule,
                candidate,
                oracle: ctx.oracle,
                cursor: CorpusCursor::new(ctx.store, ctx.token, ctx.scan_batch),
            },
        }
    }

    /// Evaluates the rule to completion
    ///
    /// Fails only when a store read fails or the check is cancelled; "no
    /// matching document" is a satisfied rule, never an error.
    pub fn evaluate(&self, candidate: &Document, ctx: EvaluationContext<'_>) -> Result<Evaluation, CheckError> {
        let evidence = self.evidence(candidate, ctx).collect::<Result<Vec<_>, _>>()?;
        debug!(rule = %self.id, evidence = evidence.len(), "Rule evaluated");
        if evidence.is_empty() {
            Ok(Evaluation::Satisfied)
        } else {
            Ok(Evaluation::Violated(evidence))
        }
    }
}

/// Lazy evidence stream for one rule
pub enum RuleEvidence<'a> {
    Candidate(Option<Document>),
    Corpus {
        rule: &'a CorpusRule,
        candidate: &'a Document,
        oracle: &'a dyn ContradictionOracle,
        cursor: CorpusCursor<'a>,
    },
}

impl Iterator for RuleEvidence<'_> {
    type Item = Result<Document, CheckError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RuleEvidence::Candidate(doc) => doc.take().map(Ok),
            RuleEvidence::Corpus {
                rule,
                candidate,
                oracle,
                cursor,
            } => loop {
                match cursor.next()? {
                    Ok(reference) if rule.implicates(candidate, &reference, *oracle) => {
                        return Some(Ok(reference));
                    }
                    Ok(_) => continue,
                    Err(e) => return Some(Err(e)),
                }
            },
        }
    }
}
