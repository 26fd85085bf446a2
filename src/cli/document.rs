//! Document store commands: get, post, put, delete, copy and load-testdata
//!
//! Writes go straight through to the JSON file store. A `put` whose `_rev`
//! is stale fails with a conflict and exit code 4 so scripts can refetch and
//! retry.

use crate::cli::common::{EXIT_SUCCESS, Workspace, exit_code, parse_document_id, read_document};
use crate::error::ComplianceError;
use crate::model::Document;
use crate::store::{DocumentStore, JsonFileStore, copy_document, load_testdata};
use std::path::Path;
use tracing::info;

/// A store operation requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentCommand<'a> {
    Get { id: &'a str },
    Post { file: &'a Path },
    Put { file: &'a Path },
    Delete { id: &'a str },
    Copy { id: &'a str, template: &'a Path },
    LoadTestdata { file: &'a Path },
}

/// Run a document store command
///
/// # Returns
///
/// Exit code:
/// - 0: Success
/// - 2: Error (missing document, unreadable file, invalid id)
/// - 3: Invalid configuration
/// - 4: Write conflict
pub fn run_document(config_path: &Path, command: DocumentCommand<'_>) -> i32 {
    match run_document_inner(config_path, command) {
        Ok(output) => {
            print!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

fn run_document_inner(config_path: &Path, command: DocumentCommand<'_>) -> Result<String, ComplianceError> {
    let workspace = Workspace::load(config_path)?;
    let store = workspace.open_store()?;
    execute(&store, command)
}

/// Executes `command` against `store`, returning what should be printed
fn execute(store: &JsonFileStore, command: DocumentCommand<'_>) -> Result<String, ComplianceError> {
    match command {
        DocumentCommand::Get { id } => render(&store.get(&parse_document_id(id)?)?),
        DocumentCommand::Post { file } => {
            let created = store.post(&read_document(file)?)?;
            info!(id = %created.label(), "Created document");
            render(&created)
        }
        DocumentCommand::Put { file } => {
            let committed = store.put(&read_document(file)?)?;
            info!(id = %committed.label(), "Updated document");
            render(&committed)
        }
        DocumentCommand::Delete { id } => {
            let id = parse_document_id(id)?;
            store.delete(&id)?;
            Ok(format!("Deleted {}\n", id))
        }
        DocumentCommand::Copy { id, template } => {
            let copy = copy_document(store, &parse_document_id(id)?, read_document(template)?)?;
            info!(source = id, id = %copy.label(), "Copied document");
            render(&copy)
        }
        DocumentCommand::LoadTestdata { file } => {
            let data = load_testdata(file)?;
            let count = data.documents.len();
            for doc in data.documents {
                store.seed(doc)?;
            }
            Ok(format!(
                "Loaded {} documents into {}\n",
                count,
                store.path().display()
            ))
        }
    }
}

fn render(doc: &Document) -> Result<String, ComplianceError> {
    let mut json = serde_json::to_string_pretty(doc)
        .map_err(|e| ComplianceError::Config(e.into()))?;
    json.push('\n');
    Ok(json)
}
