#![forbid(unsafe_code)]

//! Statement patterns and tag selectors used by rule definitions

use crate::error::RuleError;
use crate::model::{Document, Statement};
use crate::types::GlobPattern;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::{Regex, RegexBuilder};

/// Matches statements field by field with case-insensitive regexes
///
/// Unset fields match anything. A pattern with no fields set is rejected at
/// construction, since it would match every statement.
#[derive(Debug, Clone)]
pub struct StatementPattern {
    subject: Option<Regex>,
    predicate: Option<Regex>,
    object: Option<Regex>,
}

impl StatementPattern {
    pub fn new(
        subject: Option<&str>,
        predicate: Option<&str>,
        object: Option<&str>,
    ) -> Result<Self, RuleError> {
        if subject.is_none() && predicate.is_none() && object.is_none() {
            return Err(RuleError::InvalidDefinition(
                "Statement pattern needs at least one of subject, predicate, object".to_string(),
            ));
        }

        Ok(Self {
            subject: subject.map(compile).transpose()?,
            predicate: predicate.map(compile).transpose()?,
            object: object.map(compile).transpose()?,
        })
    }

    pub fn matches(&self, statement: &Statement) -> bool {
        field_matches(&self.subject, &statement.subject)
            && field_matches(&self.predicate, &statement.predicate)
            && field_matches(&self.object, &statement.object)
    }

    /// Human-readable form, e.g. `subject=/^X$/ object=/forbidden/`
    pub fn describe(&self) -> String {
        [
            ("subject", &self.subject),
            ("predicate", &self.predicate),
            ("object", &self.object),
        ]
        .iter()
        .filter_map(|(name, re)| re.as_ref().map(|re| format!("{}=/{}/", name, re.as_str())))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

fn compile(pattern: &str) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| RuleError::InvalidRegex(format!("Failed to compile pattern '{}': {}", pattern, e)))
}

fn field_matches(pattern: &Option<Regex>, value: &str) -> bool {
    pattern.as_ref().is_none_or(|re| re.is_match(value.trim()))
}

/// Selects reference documents by tag
///
/// A document is selected when any of its tags matches any pattern. An empty
/// selector selects every document.
#[derive(Debug, Clone)]
pub struct TagSelector {
    patterns: Vec<GlobPattern>,
    set: GlobSet,
}

impl TagSelector {
    pub fn new(patterns: Vec<GlobPattern>) -> Result<Self, RuleError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = Glob::new(pattern.as_str()).map_err(|e| {
                RuleError::InvalidSelector(format!(
                    "Invalid tag pattern '{}': {}",
                    pattern.as_str(),
                    e
                ))
            })?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| RuleError::InvalidSelector(format!("Failed to build tag selector: {}", e)))?;
        Ok(Self { patterns, set })
    }

    /// Selector that matches every document
    pub fn all() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    pub fn selects(&self, doc: &Document) -> bool {
        self.patterns.is_empty() || doc.tags.iter().any(|tag| self.set.is_match(tag))
    }

    pub fn patterns(&self) -> &[GlobPattern] {
        &self.patterns
    }
}
