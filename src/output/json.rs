#![forbid(unsafe_code)]

//! Single-object JSON responses
//!
//! Checks render as `{"ok": <compliant>, "compliant": "COMPLIANT", "documents": [...]}`,
//! so a non-compliant result carries `"ok": false` alongside its evidence.
//! Failures render as `{"ok": false, "reason": "..."}`.

use crate::engine::{ComplianceReport, Verdict};
use crate::model::Document;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CheckResponse<'a> {
    ok: bool,
    compliant: Verdict,
    documents: &'a [Document],
}

#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    ok: bool,
    reason: &'a str,
}

/// JSON response formatter
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        JsonFormatter
    }

    pub fn format(&self, report: &ComplianceReport) -> String {
        let response = CheckResponse {
            ok: report.compliant,
            compliant: report.verdict(),
            documents: &report.documents,
        };
        to_line(&response)
    }

    pub fn format_error(&self, reason: &str) -> String {
        to_line(&ErrorResponse { ok: false, reason })
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_line<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(mut json) => {
            json.push('\n');
            json
        }
        Err(_) => String::new(),
    }
}
