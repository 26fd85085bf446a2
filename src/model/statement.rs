#![forbid(unsafe_code)]

//! Statements: the atomic content units rules compare

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Verbs recognised when a statement is written as a sentence
const SENTENCE_VERBS: &[&str] = &["is", "are", "must", "shall", "may"];

/// An atomic declarative unit inside a document
///
/// The structured payload is a subject/predicate/object triple; `metadata`
/// carries free-form annotations (for example a `negated = "true"` marker).
/// In JSON a statement may also be written as a sentence such as
/// `"X is forbidden"`, which parses to subject `X`, predicate `is`, object `forbidden`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StatementRepr")]
pub struct Statement {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatementRepr {
    Sentence(String),
    Structured {
        subject: String,
        predicate: String,
        object: String,
        #[serde(default)]
        metadata: BTreeMap<String, String>,
    },
}

impl TryFrom<StatementRepr> for Statement {
    type Error = String;

    fn try_from(repr: StatementRepr) -> Result<Self, Self::Error> {
        match repr {
            StatementRepr::Sentence(text) => Statement::parse_sentence(&text)
                .ok_or_else(|| format!("Cannot parse statement sentence: '{}'", text)),
            StatementRepr::Structured {
                subject,
                predicate,
                object,
                metadata,
            } => Ok(Statement {
                subject,
                predicate,
                object,
                metadata,
            }),
        }
    }
}

impl Statement {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Statement {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Adds a metadata entry, replacing any previous value for `key`
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Parses `"<subject> <verb> <object>"` where verb is one of is/are/must/shall/may
    ///
    /// The first recognised verb splits the sentence. Returns None if there is no
    /// verb or either side is empty.
    pub fn parse_sentence(text: &str) -> Option<Self> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let verb_at = words
            .iter()
            .position(|w| SENTENCE_VERBS.contains(&w.to_ascii_lowercase().as_str()))?;

        if verb_at == 0 || verb_at + 1 >= words.len() {
            return None;
        }

        Some(Statement::new(
            words[..verb_at].join(" "),
            words[verb_at],
            words[verb_at + 1..].join(" "),
        ))
    }

    /// Structural equality of the triple, ignoring case, surrounding whitespace and metadata
    pub fn same_triple(&self, other: &Statement) -> bool {
        self.same_subject_predicate(other) && normalize(&self.object) == normalize(&other.object)
    }

    /// Subject and predicate match, ignoring case and surrounding whitespace
    pub fn same_subject_predicate(&self, other: &Statement) -> bool {
        normalize(&self.subject) == normalize(&other.subject)
            && normalize(&self.predicate) == normalize(&other.predicate)
    }

    /// True if the metadata entry `key` is set to "true" (case-insensitive)
    pub fn flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// Lowercases and collapses internal whitespace
pub(crate) fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentence() {
        let stmt = Statement::parse_sentence("X is forbidden").unwrap();
        assert_eq!(stmt.subject, "X");
        assert_eq!(stmt.predicate, "is");
        assert_eq!(stmt.object, "forbidden");
    }

    #[test]
    fn test_parse_sentence_multi_word() {
        let stmt = Statement::parse_sentence("personal data must be encrypted at rest").unwrap();
        assert_eq!(stmt.subject, "personal data");
        assert_eq!(stmt.predicate, "must");
        assert_eq!(stmt.object, "be encrypted at rest");
    }

    #[test]
    fn test_parse_sentence_rejects_incomplete() {
        assert!(Statement::parse_sentence("is forbidden").is_none());
        assert!(Statement::parse_sentence("X is").is_none());
        assert!(Statement::parse_sentence("no verb here").is_none());
        assert!(Statement::parse_sentence("").is_none());
    }

    #[test]
    fn test_same_triple_ignores_case_and_metadata() {
        let a = Statement::new("X", "is", "Forbidden");
        let b = Statement::new(" x ", "IS", "forbidden").with_metadata("source", "policy");
        assert!(a.same_triple(&b));
        assert!(a.same_subject_predicate(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_flag() {
        let stmt = Statement::new("X", "is", "required").with_metadata("negated", "TRUE");
        assert!(stmt.flag("negated"));
        assert!(!stmt.flag("missing"));
    }

    #[test]
    fn test_deserialize_sentence_and_structured() {
        let stmts: Vec<Statement> = serde_json::from_str(
            r#"["X is forbidden", {"subject": "Y", "predicate": "is", "object": "optional", "metadata": {"k": "v"}}]"#,
        )
        .unwrap();
        assert_eq!(stmts[0], Statement::new("X", "is", "forbidden"));
        assert_eq!(stmts[1].metadata.get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_deserialize_bad_sentence_fails() {
        let result: Result<Statement, _> = serde_json::from_str("\"nonsense\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_is_structured() {
        let json = serde_json::to_string(&Statement::new("X", "is", "forbidden")).unwrap();
        assert_eq!(json, r#"{"subject":"X","predicate":"is","object":"forbidden"}"#);
    }
}
