//! Error types for compliance checking
//!
//! Store, rule, check and configuration failures each get their own enum so
//! callers can match on the category they care about. `ComplianceError` wraps
//! them all for code that only needs to report.

use crate::types::{DocumentId, Revision, RuleId, RulebaseId};
use std::time::Duration;

/// Document store errors
///
/// `Conflict` is an expected outcome of concurrent writers and is kept distinct
/// from every other failure so callers can refetch and retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No document with this id exists (or it was deleted)
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    /// Submitted revision does not match the store's current revision
    #[error(
        "Document update conflict: {id} is at revision {current}, update was based on {}",
        revision_label(.submitted)
    )]
    Conflict {
        id: DocumentId,
        submitted: Option<Revision>,
        current: Revision,
    },

    /// A revision-checked write was attempted on a document without an id
    #[error("Document has no id")]
    MissingId,

    /// Transport or backend failure
    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

fn revision_label(revision: &Option<Revision>) -> &str {
    revision.as_ref().map(Revision::as_str).unwrap_or("no revision")
}

impl StoreError {
    /// Returns true for revision mismatches
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Rule and rulebase definition errors
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Invalid rule definition
    #[error("Invalid rule definition: {0}")]
    InvalidDefinition(String),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),

    /// Invalid tag selector glob
    #[error("Invalid tag selector: {0}")]
    InvalidSelector(String),

    /// Two rules in one rulebase share an id
    #[error("Duplicate rule ID '{rule}' in rulebase '{rulebase}'")]
    DuplicateRule { rulebase: RulebaseId, rule: RuleId },

    /// Two rulebases share an id
    #[error("Duplicate rulebase ID '{0}'")]
    DuplicateRulebase(RulebaseId),
}

/// Errors that abort a compliance check
///
/// A check either completes with a full result or fails with exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// The requested rulebase is not registered
    #[error("Rulebase not found: '{0}'")]
    RulebaseNotFound(String),

    /// A store read required by a rule failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The check ran past its deadline
    #[error("Compliance check timed out after {0:?}")]
    Timeout(Duration),

    /// The check was cancelled by its caller
    #[error("Compliance check cancelled")]
    Cancelled,
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum ComplianceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Check(#[from] CheckError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command-line value could not be interpreted
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
