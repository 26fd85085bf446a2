#![forbid(unsafe_code)]

//! Compliance search: runs a rulebase against a candidate and pages the evidence
//!
//! The checker holds no per-call state, so one instance can serve any number
//! of concurrent checks. Each check resolves its rulebase once, evaluates every
//! rule, merges evidence in rule order and slices out the requested page.

use crate::engine::{CancellationToken, EvidenceSet};
use crate::error::CheckError;
use crate::model::Document;
use crate::rules::{
    ContradictionOracle, DEFAULT_SCAN_BATCH, DeclaredOpposites, Evaluation, EvaluationContext,
    Rulebase, RulebaseRegistry,
};
use crate::store::DocumentStore;
use crate::types::RulebaseId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// How rules are driven during a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStrategy {
    /// Evaluate every rule to completion in parallel; the total evidence count is known
    #[default]
    Exhaustive,
    /// Pull evidence rule by rule and stop once the page and verdict are settled
    Lazy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    pub strategy: EvaluationStrategy,
    /// Documents fetched per corpus scan read
    pub scan_batch: usize,
    /// Deadline applied to each check started with [`ComplianceChecker::check`]
    pub timeout: Option<Duration>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            strategy: EvaluationStrategy::default(),
            scan_batch: DEFAULT_SCAN_BATCH,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Compliant,
    NonCompliant,
}

/// Result of one compliance check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceReport {
    pub rulebase: RulebaseId,
    /// True iff the full evidence sequence is empty, regardless of the page
    pub compliant: bool,
    /// Evidence documents in `[offset, offset + limit)`
    pub documents: Vec<Document>,
    pub offset: usize,
    pub limit: usize,
    /// Length of the full evidence sequence, when the strategy computed it
    pub total: Option<usize>,
}

impl ComplianceReport {
    pub fn verdict(&self) -> Verdict {
        if self.compliant {
            Verdict::Compliant
        } else {
            Verdict::NonCompliant
        }
    }

    /// Splits the report into `(compliant, page)`
    pub fn into_parts(self) -> (bool, Vec<Document>) {
        (self.compliant, self.documents)
    }
}

/// Checks candidate documents against registered rulebases
pub struct ComplianceChecker {
    registry: Arc<RulebaseRegistry>,
    store: Arc<dyn DocumentStore>,
    oracle: Arc<dyn ContradictionOracle>,
    options: CheckOptions,
}

impl ComplianceChecker {
    /// Creates a checker using [`DeclaredOpposites::default`] as its contradiction oracle
    pub fn new(registry: Arc<RulebaseRegistry>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            registry,
            store,
            oracle: Arc::new(DeclaredOpposites::default()),
            options: CheckOptions::default(),
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn ContradictionOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    /// Checks `candidate` against rulebase `base_id` and returns one page of evidence
    ///
    /// `offset` is a zero-based index into the full, ordered evidence sequence;
    /// an offset past the end yields an empty page, not an error. `compliant`
    /// always reflects the whole sequence, so a `limit` of 0 still answers it.
    ///
    /// # Errors
    ///
    /// Fails with `RulebaseNotFound` for an unknown rulebase, `Store` if a
    /// required store read fails, and `Timeout` past the configured deadline.
    /// No partial evidence is ever returned alongside an error.
    pub fn check(
        &self,
        base_id: &str,
        candidate: &Document,
        limit: usize,
        offset: usize,
    ) -> Result<ComplianceReport, CheckError> {
        let token = match self.options.timeout {
            Some(timeout) => CancellationToken::with_timeout(timeout),
            None => CancellationToken::new(),
        };
        self.check_with_token(base_id, candidate, limit, offset, &token)
    }

    /// Like [`check`](Self::check), bound to a caller-supplied cancellation token
    #[instrument(
        name = "compliance_check",
        skip(self, candidate, token),
        fields(document = %candidate.label())
    )]
    pub fn check_with_token(
        &self,
        base_id: &str,
        candidate: &Document,
        limit: usize,
        offset: usize,
        token: &CancellationToken,
    ) -> Result<ComplianceReport, CheckError> {
        let rulebase = self.registry.resolve(base_id)?;

        let collected = match self.options.strategy {
            EvaluationStrategy::Exhaustive => self
                .collect_exhaustive(&rulebase, candidate, token)
                .map(|evidence| {
                    let total = evidence.len();
                    (evidence, Some(total))
                }),
            EvaluationStrategy::Lazy => {
                let wanted = offset.saturating_add(limit).max(1);
                self.collect_lazy(&rulebase, candidate, token, wanted)
            }
        };

        let (evidence, total) = match collected {
            Ok(collected) => collected,
            Err(e) => {
                warn!(rulebase = %rulebase.id(), error = %e, "Compliance check aborted");
                return Err(e);
            }
        };

        let report = ComplianceReport {
            rulebase: rulebase.id().clone(),
            compliant: evidence.is_empty(),
            documents: evidence.page(offset, limit),
            offset,
            limit,
            total,
        };
        info!(
            rulebase = %report.rulebase,
            compliant = report.compliant,
            evidence = ?report.total,
            page = report.documents.len(),
            "Compliance check complete"
        );
        Ok(report)
    }

    fn context<'a>(&'a self, token: &'a CancellationToken) -> EvaluationContext<'a> {
        EvaluationContext {
            store: self.store.as_ref(),
            oracle: self.oracle.as_ref(),
            token,
            scan_batch: self.options.scan_batch,
        }
    }

    /// Evaluates all rules in parallel and merges their evidence in rule order
    ///
    /// The first failing rule cancels its siblings. The reported error is the
    /// first one in rule order that is not a sibling's cancellation.
    fn collect_exhaustive(
        &self,
        rulebase: &Rulebase,
        candidate: &Document,
        token: &CancellationToken,
    ) -> Result<EvidenceSet, CheckError> {
        let siblings = token.child();
        let ctx = self.context(&siblings);

        let results: Vec<Result<Evaluation, CheckError>> = rulebase
            .rules()
            .par_iter()
            .map(|rule| {
                let result = rule.evaluate(candidate, ctx);
                if result.is_err() {
                    siblings.cancel();
                }
                result
            })
            .collect();

        let mut evidence = EvidenceSet::new();
        let mut errors = Vec::new();
        for (rule, result) in rulebase.rules().iter().zip(results) {
            match result {
                Ok(evaluation) => {
                    if !evaluation.is_satisfied() {
                        debug!(rule = %rule.id(), evidence = evaluation.evidence().len(), "Rule violated");
                    }
                    evidence.extend(evaluation.into_evidence());
                }
                Err(e) => errors.push(e),
            }
        }

        let root_cause = errors
            .iter()
            .find(|e| !matches!(e, CheckError::Cancelled))
            .or(errors.first());
        match root_cause {
            Some(e) => Err(e.clone()),
            None => Ok(evidence),
        }
    }

    /// Pulls evidence rule by rule until `wanted` distinct documents are known
    ///
    /// Returns the evidence and, if every rule was drained, its total length.
    fn collect_lazy(
        &self,
        rulebase: &Rulebase,
        candidate: &Document,
        token: &CancellationToken,
        wanted: usize,
    ) -> Result<(EvidenceSet, Option<usize>), CheckError> {
        let ctx = self.context(token);
        let mut evidence = EvidenceSet::new();

        for rule in rulebase.rules() {
            for doc in rule.evidence(candidate, ctx) {
                evidence.push(doc?);
                if evidence.len() >= wanted {
                    debug!(rule = %rule.id(), wanted, "Enough evidence collected, stopping early");
                    return Ok((evidence, None));
                }
            }
        }

        let total = evidence.len();
        Ok((evidence, Some(total)))
    }
}
