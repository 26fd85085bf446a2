//! Check command implementation
//!
//! This module implements the `compliance check` command, which:
//! - Loads configuration and the rulebases it names
//! - Opens the document store
//! - Reads the candidate from a JSON file or fetches it by id
//! - Runs the compliance search for one page of evidence
//! - Formats output (human, JSONL or JSON)
//! - Returns an exit code reflecting the verdict

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{
    EXIT_NON_COMPLIANT, EXIT_SUCCESS, Workspace, color_choice, exit_code, parse_document_id,
    read_document,
};
use crate::engine::ComplianceReport;
use crate::error::ComplianceError;
use crate::model::Document;
use crate::output::{HumanFormatter, JsonFormatter, JsonlFormatter};
use crate::store::DocumentStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the candidate document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    File(PathBuf),
    Stored(String),
}

/// Arguments of one `compliance check` invocation
#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub rulebase: String,
    pub candidate: Candidate,
    pub limit: usize,
    pub offset: usize,
    pub format: Option<OutputFormat>,
    pub color: Option<ColorChoice>,
}

/// Run the check command
///
/// # Returns
///
/// Exit code:
/// - 0: Compliant
/// - 1: Non-compliant
/// - 2: Error (unknown rulebase, missing document, store failure, timeout)
/// - 3: Invalid configuration
pub fn run_check(config_path: &Path, args: &CheckArgs) -> i32 {
    let workspace = match Workspace::load(config_path) {
        Ok(workspace) => workspace,
        Err(e) => return report_error(args.format, &e.into()),
    };
    let format = workspace.format(args.format);

    match run_check_inner(&workspace, args) {
        Ok(report) => {
            let compliant = report.compliant;
            match format {
                OutputFormat::Human => {
                    let color = color_choice(args.color, workspace.config.output.color);
                    if let Err(e) = HumanFormatter::new().write_to_stdout(&report, color) {
                        return report_error(Some(format), &e.into());
                    }
                }
                OutputFormat::Jsonl => print!("{}", JsonlFormatter::new().format(&report)),
                OutputFormat::Json => print!("{}", JsonFormatter::new().format(&report)),
            }
            if compliant {
                EXIT_SUCCESS
            } else {
                EXIT_NON_COMPLIANT
            }
        }
        Err(e) => report_error(Some(format), &e),
    }
}

fn run_check_inner(workspace: &Workspace, args: &CheckArgs) -> Result<ComplianceReport, ComplianceError> {
    let store: Arc<dyn DocumentStore> = Arc::new(workspace.open_store()?);
    let checker = workspace.checker(Arc::clone(&store))?;

    let candidate = load_candidate(store.as_ref(), &args.candidate)?;
    Ok(checker.check(&args.rulebase, &candidate, args.limit, args.offset)?)
}

fn load_candidate(store: &dyn DocumentStore, candidate: &Candidate) -> Result<Document, ComplianceError> {
    match candidate {
        Candidate::File(path) => Ok(read_document(path)?),
        Candidate::Stored(id) => Ok(store.get(&parse_document_id(id)?)?),
    }
}

/// Prints an error in the requested format and returns its exit code
fn report_error(format: Option<OutputFormat>, error: &ComplianceError) -> i32 {
    if format == Some(OutputFormat::Json) {
        print!("{}", JsonFormatter::new().format_error(&error.to_string()));
    } else {
        eprintln!("Error: {}", error);
    }
    exit_code(error)
}
