#![forbid(unsafe_code)]

//! TOML definitions for rulebases and rules
//!
//! Rulebases appear inline in `compliance.toml` as `[[rulebase]]` tables, or one
//! per file in the rulebases directory:
//!
//! ```toml
//! id = "R1"
//! description = "Data-use policy A"
//!
//! [[rule]]
//! id = "no-policy-a-conflict"
//! kind = "corpus"
//! tags = ["policy:A"]
//! comparison = "contradicts"
//! ```

use crate::error::RuleError;
use crate::rules::{
    Comparison, CorpusRule, Rule, RuleKind, Rulebase, SelfContainedCheck, StatementPattern,
    TagSelector,
};
use crate::types::{GlobPattern, RuleId, RulebaseId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A rulebase as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulebaseDefinition {
    pub id: String,

    #[serde(default)]
    pub description: String,

    /// Rules in evaluation order
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDefinition>,
}

/// Rule variant names accepted in `kind = "..."`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKindName {
    Require,
    Forbid,
    Consistent,
    NonEmpty,
    Corpus,
}

/// A single rule as written in configuration
///
/// Which optional fields are meaningful depends on `kind`: pattern fields for
/// `require`/`forbid`, `tags` and `comparison` for `corpus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,

    #[serde(default)]
    pub description: String,

    pub kind: RuleKindName,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<GlobPattern>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

impl RuleDefinition {
    /// Compiles the definition into a rule
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if the id is invalid, a regex or glob fails to
    /// compile, or fields are given that the kind does not accept.
    pub fn compile(&self) -> Result<Rule, RuleError> {
        let id = RuleId::new(self.id.clone())
            .ok_or_else(|| RuleError::InvalidDefinition(format!("Invalid rule ID: '{}'", self.id)))?;

        let has_pattern = self.subject.is_some() || self.predicate.is_some() || self.object.is_some();
        let has_corpus_fields = !self.tags.is_empty() || self.comparison.is_some();

        if self.kind != RuleKindName::Corpus && has_corpus_fields {
            return Err(RuleError::InvalidDefinition(format!(
                "Rule '{}': tags and comparison are only valid for corpus rules",
                self.id
            )));
        }
        if !matches!(self.kind, RuleKindName::Require | RuleKindName::Forbid) && has_pattern {
            return Err(RuleError::InvalidDefinition(format!(
                "Rule '{}': subject, predicate and object are only valid for require and forbid rules",
                self.id
            )));
        }

        let kind = match self.kind {
            RuleKindName::Require => RuleKind::SelfContained(SelfContainedCheck::Require(self.pattern()?)),
            RuleKindName::Forbid => RuleKind::SelfContained(SelfContainedCheck::Forbid(self.pattern()?)),
            RuleKindName::Consistent => RuleKind::SelfContained(SelfContainedCheck::Consistent),
            RuleKindName::NonEmpty => RuleKind::SelfContained(SelfContainedCheck::NonEmpty),
            RuleKindName::Corpus => RuleKind::CorpusRelative(CorpusRule {
                selector: if self.tags.is_empty() {
                    TagSelector::all()
                } else {
                    TagSelector::new(self.tags.clone())?
                },
                comparison: self.comparison.unwrap_or_default(),
            }),
        };

        Ok(Rule::new(id, self.description.clone(), kind))
    }

    fn pattern(&self) -> Result<StatementPattern, RuleError> {
        StatementPattern::new(
            self.subject.as_deref(),
            self.predicate.as_deref(),
            self.object.as_deref(),
        )
        .map_err(|e| match e {
            RuleError::InvalidDefinition(msg) => {
                RuleError::InvalidDefinition(format!("Rule '{}': {}", self.id, msg))
            }
            other => other,
        })
    }
}

impl RulebaseDefinition {
    /// Parses a rulebase file's TOML content
    pub fn from_toml(content: &str) -> Result<Self, RuleError> {
        toml::from_str(content)
            .map_err(|e| RuleError::InvalidDefinition(format!("Failed to parse TOML: {}", e)))
    }

    pub fn from_path(path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuleError::InvalidDefinition(format!("Failed to read file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Compiles every rule, keeping declaration order
    pub fn compile(&self) -> Result<Rulebase, RuleError> {
        let id = RulebaseId::new(self.id.clone()).ok_or_else(|| {
            RuleError::InvalidDefinition(format!("Invalid rulebase ID: '{}'", self.id))
        })?;

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(self.rules.len());
        for def in &self.rules {
            let rule = def.compile()?;
            if !seen.insert(rule.id().clone()) {
                return Err(RuleError::DuplicateRule {
                    rulebase: id,
                    rule: rule.id().clone(),
                });
            }
            rules.push(rule);
        }

        Ok(Rulebase::new(id, self.description.clone(), rules))
    }
}
