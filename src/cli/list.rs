//! Rulebases command implementation
//!
//! This module implements the `compliance rulebases` command, which lists every
//! registered rulebase (inline and from the rulebases directory) with its rules
//! in evaluation order.

use crate::cli::args::OutputFormat;
use crate::cli::common::{EXIT_SUCCESS, Workspace, exit_code};
use crate::error::ComplianceError;
use crate::output::{
    RulebaseHumanFormatter, RulebaseJsonFormatter, RulebaseJsonlFormatter, RulebaseSummary,
};
use std::path::Path;

/// Run the rulebases command
///
/// # Returns
///
/// Exit code:
/// - 0: Success
/// - 2: Error
/// - 3: Invalid configuration
pub fn run_list(config_path: &Path, format: OutputFormat) -> i32 {
    match run_list_inner(config_path) {
        Ok(summaries) => {
            match format {
                OutputFormat::Human => RulebaseHumanFormatter::new().write_to_stdout(&summaries),
                OutputFormat::Jsonl => RulebaseJsonlFormatter::new().write_to_stdout(&summaries),
                OutputFormat::Json => RulebaseJsonFormatter::new().write_to_stdout(&summaries),
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

fn run_list_inner(config_path: &Path) -> Result<Vec<RulebaseSummary>, ComplianceError> {
    let workspace = Workspace::load(config_path)?;
    let registry = workspace.config.build_registry(&workspace.root)?;
    Ok(registry.iter().map(RulebaseSummary::from).collect())
}
