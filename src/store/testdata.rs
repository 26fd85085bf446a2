#![forbid(unsafe_code)]

//! Loading fixture documents from a JSON test-data file

use crate::error::ConfigError;
use crate::model::Document;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a test-data file: `{ "documents": [ ... ] }`
#[derive(Debug, Default, Deserialize)]
pub struct TestData {
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl TestData {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Reads a test-data file
///
/// Documents keep any `_id` they carry so fixtures can refer to each other;
/// seeding them into a store is the caller's step.
pub fn load_testdata(path: impl AsRef<Path>) -> Result<TestData, ConfigError> {
    let content = fs::read_to_string(path)?;
    TestData::parse(&content)
}
