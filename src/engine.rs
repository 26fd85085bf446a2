//! Compliance checking engine: cancellation, corpus scans and evidence aggregation

pub mod cancel;
pub mod checker;
pub mod cursor;
pub mod evidence;

pub use cancel::CancellationToken;
pub use checker::{
    CheckOptions, ComplianceChecker, ComplianceReport, EvaluationStrategy, Verdict,
};
pub use cursor::CorpusCursor;
pub use evidence::{EvidenceSet, page_bounds};
