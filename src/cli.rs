//! CLI argument parsing and command dispatch

pub mod args;
pub mod check;
pub mod common;
pub mod document;
pub mod list;

// Re-export types for convenient access
pub use args::{Cli, ColorChoice, Command, OutputFormat};

use check::{Candidate, CheckArgs};
use document::DocumentCommand;

/// Runs the parsed command line and returns the process exit code
pub fn run(cli: Cli) -> i32 {
    let config = cli.config.as_path();
    match cli.command {
        Command::Check {
            rulebase,
            document,
            id,
            limit,
            offset,
            format,
        } => {
            let candidate = match (document, id) {
                (Some(path), _) => Candidate::File(path),
                (None, Some(id)) => Candidate::Stored(id),
                // clap requires one of --document / --id
                (None, None) => {
                    eprintln!("Error: either --document or --id is required");
                    return common::EXIT_ERROR;
                }
            };
            let args = CheckArgs {
                rulebase,
                candidate,
                limit,
                offset,
                format,
                color: cli.color,
            };
            check::run_check(config, &args)
        }
        Command::Get { id } => document::run_document(config, DocumentCommand::Get { id: &id }),
        Command::Post { file } => {
            document::run_document(config, DocumentCommand::Post { file: &file })
        }
        Command::Put { file } => document::run_document(config, DocumentCommand::Put { file: &file }),
        Command::Delete { id } => {
            document::run_document(config, DocumentCommand::Delete { id: &id })
        }
        Command::Copy { id, file } => document::run_document(
            config,
            DocumentCommand::Copy {
                id: &id,
                template: &file,
            },
        ),
        Command::LoadTestdata { file } => {
            document::run_document(config, DocumentCommand::LoadTestdata { file: &file })
        }
        Command::Rulebases { format } => list::run_list(config, format),
    }
}
