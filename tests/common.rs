//! Test utilities for compliance integration tests

#![allow(dead_code)]

use compliance_check::rules::{RulebaseDefinition, RulebaseRegistry};
use compliance_check::{Document, DocumentStore, InMemoryStore, Statement};
use std::sync::Arc;

/// Result type alias for tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Extract Ok value or panic with context
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("assertion failed: expected Ok, got Err({:?})", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Extract Some value or panic with context
#[macro_export]
macro_rules! assert_some {
    ($expr:expr) => {
        match $expr {
            Some(v) => v,
            None => panic!("assertion failed: expected Some, got None"),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Some(v) => v,
            None => panic!("{}: got None", $msg),
        }
    };
}

/// Rulebase forbidding contradiction with any document tagged `policy:A`
pub const POLICY_A_RULEBASE: &str = r#"
id = "R1"
description = "Must not contradict policy A"

[[rule]]
id = "no-policy-a-conflict"
kind = "corpus"
tags = ["policy:A"]
comparison = "contradicts"
"#;

pub fn stmt(text: &str) -> Statement {
    assert_some!(Statement::parse_sentence(text), "sentence should parse")
}

/// Builds a document from a name, tags and statement sentences
pub fn doc(name: &str, tags: &[&str], statements: &[&str]) -> Document {
    let doc = tags
        .iter()
        .fold(Document::new(name), |doc, tag| doc.with_tag(*tag));
    statements
        .iter()
        .fold(doc, |doc, text| doc.with_statement(stmt(text)))
}

/// Compiles rulebase definitions written in TOML into a registry
pub fn registry(definitions: &[&str]) -> Arc<RulebaseRegistry> {
    let definitions: Vec<RulebaseDefinition> = definitions
        .iter()
        .map(|toml| assert_ok!(RulebaseDefinition::from_toml(toml), "rulebase should parse"))
        .collect();
    let mut registry = RulebaseRegistry::new();
    assert_ok!(registry.load_definitions(&definitions), "rulebases should compile");
    Arc::new(registry)
}

/// Posts each document and returns the committed copies
pub fn post_all(store: &InMemoryStore, docs: Vec<Document>) -> Vec<Document> {
    docs.into_iter()
        .map(|d| assert_ok!(store.post(&d), "post should succeed"))
        .collect()
}
