#![forbid(unsafe_code)]

//! Compliance checking for documents of statements
//!
//! A candidate document is checked against a named rulebase. Self-contained
//! rules inspect the candidate alone; corpus rules compare it against the
//! documents already in a revision-checked store. A check reports whether the
//! candidate is compliant and returns one page of the documents evidencing
//! each violation.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod output;
pub mod rules;
pub mod store;
pub mod types;

// Re-export error types for convenient access
pub use error::{CheckError, ComplianceError, ConfigError, RuleError, StoreError};

// Re-export core domain types for convenient access
pub use engine::{CheckOptions, ComplianceChecker, ComplianceReport, EvaluationStrategy, Verdict};
pub use model::{Document, Statement};
pub use store::{DocumentStore, InMemoryStore, JsonFileStore};
pub use types::{DocumentId, GlobPattern, Revision, RuleId, RulebaseId};
