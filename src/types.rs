#![forbid(unsafe_code)]

//! Core identifier types for compliance checking
//!
//! Identifiers are validated newtypes so that an empty or malformed id is
//! rejected at the boundary instead of surfacing as a confusing lookup miss.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns true if `id` is a usable identifier: non-empty, no whitespace or control characters
fn is_valid_token(id: &str) -> bool {
    !id.is_empty() && !id.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Opaque, store-assigned document identity
///
/// Stable across revisions of the same document. Ordering is lexicographic and is
/// the order in which corpus scans visit documents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new DocumentId, returning None for empty or whitespace-bearing input
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        is_valid_token(&id).then_some(DocumentId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DocumentId::new(value).ok_or_else(|| "Invalid document ID".to_string())
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

/// Opaque token naming one exact version of a document
///
/// Store-issued revisions have the shape `<generation>-<digest>`, but callers must
/// treat them as opaque and only ever compare them for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision(String);

impl Revision {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        is_valid_token(&token).then_some(Revision(token))
    }

    /// Builds a store-issued revision from a generation number and content digest
    pub(crate) fn issue(generation: u64, digest: u64) -> Self {
        Revision(format!("{}-{:016x}", generation, digest))
    }

    /// Generation prefix of a store-issued revision, if the token has one
    pub fn generation(&self) -> Option<u64> {
        self.0.split_once('-').and_then(|(n, _)| n.parse().ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Revision {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Revision::new(value).ok_or_else(|| "Invalid revision".to_string())
    }
}

impl From<Revision> for String {
    fn from(revision: Revision) -> Self {
        revision.0
    }
}

/// Identifier of a named rulebase
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RulebaseId(String);

impl RulebaseId {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        is_valid_token(&id).then_some(RulebaseId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RulebaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RulebaseId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RulebaseId::new(value).ok_or_else(|| "Invalid rulebase ID".to_string())
    }
}

impl From<RulebaseId> for String {
    fn from(id: RulebaseId) -> Self {
        id.0
    }
}

/// A validated rule identifier
///
/// Rule IDs must be non-empty and contain only alphanumeric characters, hyphens, and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl RuleId {
    /// Creates a new RuleId, validating the input
    ///
    /// Returns None if the input is empty or contains invalid characters
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            return None;
        }
        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return None;
        }
        Some(RuleId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RuleId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RuleId::new(value).ok_or_else(|| "Invalid rule ID".to_string())
    }
}

impl From<RuleId> for String {
    fn from(rule_id: RuleId) -> Self {
        rule_id.0
    }
}

/// A glob pattern matched against document tags
///
/// Compiled with the `globset` crate when a corpus selector is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobPattern(String);

impl GlobPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        GlobPattern(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GlobPattern {
    fn from(pattern: &str) -> Self {
        GlobPattern(pattern.to_string())
    }
}
