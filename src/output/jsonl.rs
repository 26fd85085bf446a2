#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line in a deterministic order:
//! 1. One evidence record per document on the page, in evidence order
//! 2. One status record

use crate::engine::{ComplianceReport, Verdict};
use crate::model::Document;
use serde::Serialize;

/// JSONL output formatter
pub struct JsonlFormatter;

impl JsonlFormatter {
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Format the report as JSONL
    ///
    /// Evidence records carry their absolute position in the full evidence
    /// sequence, so pages fetched separately can be merged by `index`.
    pub fn format(&self, report: &ComplianceReport) -> String {
        let mut output = String::new();

        for (i, document) in report.documents.iter().enumerate() {
            let record = EvidenceRecord {
                record_type: "evidence",
                index: report.offset + i,
                document,
            };
            if let Ok(json) = serde_json::to_string(&record) {
                output.push_str(&json);
                output.push('\n');
            }
        }

        let status = StatusRecord {
            record_type: "status",
            rulebase: report.rulebase.as_str(),
            compliant: report.verdict(),
            offset: report.offset,
            limit: report.limit,
            returned: report.documents.len(),
            total: report.total,
        };
        if let Ok(json) = serde_json::to_string(&status) {
            output.push_str(&json);
            output.push('\n');
        }

        output
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct EvidenceRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    index: usize,
    document: &'a Document,
}

#[derive(Debug, Serialize)]
struct StatusRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    rulebase: &'a str,
    compliant: Verdict,
    offset: usize,
    limit: usize,
    returned: usize,
    /// Omitted when the evaluation stopped before counting all evidence
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<usize>,
}
