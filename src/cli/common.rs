//! Common helper functions shared across CLI commands
//!
//! This module provides shared functionality for loading configuration,
//! opening the document store and building the checker.

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::config::{ColorOption, Config, OutputFormat as ConfigFormat};
use crate::engine::ComplianceChecker;
use crate::error::{ComplianceError, ConfigError};
use crate::model::Document;
use crate::store::{DocumentStore, JsonFileStore};
use crate::types::DocumentId;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_NON_COMPLIANT: i32 = 1;
pub const EXIT_ERROR: i32 = 2;
pub const EXIT_PARSE_ERROR: i32 = 3;
pub const EXIT_CONFLICT: i32 = 4;

/// A loaded configuration and the directory its relative paths resolve against
#[derive(Debug)]
pub(crate) struct Workspace {
    pub config: Config,
    pub root: PathBuf,
}

impl Workspace {
    /// Load compliance.toml from `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file does not exist or cannot be read,
    /// `ConfigError::Parse` or `ConfigError::Validation` if it is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }

        let config = Config::load(path)?;
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self { config, root })
    }

    pub fn open_store(&self) -> Result<JsonFileStore, ConfigError> {
        JsonFileStore::open(self.config.store_path(&self.root))
    }

    /// Builds a checker over `store` with the configured rulebases, oracle and options
    pub fn checker(&self, store: Arc<dyn DocumentStore>) -> Result<ComplianceChecker, ComplianceError> {
        let registry = self.config.build_registry(&self.root)?;
        Ok(ComplianceChecker::new(Arc::new(registry), store)
            .with_oracle(Arc::new(self.config.contradictions.oracle()))
            .with_options(self.config.compliance.check_options()))
    }

    /// Command-line format if given, otherwise the configured one
    pub fn format(&self, requested: Option<OutputFormat>) -> OutputFormat {
        requested.unwrap_or(match self.config.output.format {
            ConfigFormat::Human => OutputFormat::Human,
            ConfigFormat::Jsonl => OutputFormat::Jsonl,
            ConfigFormat::Json => OutputFormat::Json,
        })
    }
}

/// Resolves the effective terminal color choice
pub(crate) fn color_choice(requested: Option<ColorChoice>, configured: ColorOption) -> termcolor::ColorChoice {
    let choice = requested.unwrap_or(match configured {
        ColorOption::Auto => ColorChoice::Auto,
        ColorOption::Always => ColorChoice::Always,
        ColorOption::Never => ColorChoice::Never,
    });
    match choice {
        ColorChoice::Auto => termcolor::ColorChoice::Auto,
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
    }
}

/// Reads a document from a JSON file
pub(crate) fn read_document(path: &Path) -> Result<Document, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub(crate) fn parse_document_id(id: &str) -> Result<DocumentId, ComplianceError> {
    DocumentId::new(id).ok_or_else(|| ComplianceError::InvalidArgument(format!("'{}' is not a valid document ID", id)))
}

/// Maps an error to the process exit code
pub(crate) fn exit_code(error: &ComplianceError) -> i32 {
    match error {
        ComplianceError::Config(ConfigError::Parse(_) | ConfigError::Validation(_)) => EXIT_PARSE_ERROR,
        ComplianceError::Store(e) if e.is_conflict() => EXIT_CONFLICT,
        _ => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::types::Revision;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[compliance]
version = "1"
store = "store/documents.json"

[output]
format = "jsonl"
color = "never"
"#;

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let err = Workspace::load(&temp_dir.path().join("compliance.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().contains("compliance.toml not found"));
    }

    #[test]
    fn test_workspace_root_and_store_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("compliance.toml");
        fs::write(&path, CONFIG).unwrap();

        let workspace = Workspace::load(&path).unwrap();
        assert_eq!(workspace.root, temp_dir.path());
        assert_eq!(
            workspace.config.store_path(&workspace.root),
            temp_dir.path().join("store/documents.json")
        );
    }

    #[test]
    fn test_format_and_color_fall_back_to_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("compliance.toml");
        fs::write(&path, CONFIG).unwrap();
        let workspace = Workspace::load(&path).unwrap();

        assert_eq!(workspace.format(None), OutputFormat::Jsonl);
        assert_eq!(workspace.format(Some(OutputFormat::Json)), OutputFormat::Json);

        let color = workspace.config.output.color;
        assert_eq!(color_choice(None, color), termcolor::ColorChoice::Never);
        assert_eq!(
            color_choice(Some(ColorChoice::Always), color),
            termcolor::ColorChoice::Always
        );
    }

    #[test]
    fn test_exit_codes() {
        let conflict = ComplianceError::Store(StoreError::Conflict {
            id: DocumentId::new("d1").unwrap(),
            submitted: None,
            current: Revision::new("2-abc").unwrap(),
        });
        assert_eq!(exit_code(&conflict), EXIT_CONFLICT);

        let parse = ComplianceError::Config(ConfigError::Validation("bad".to_string()));
        assert_eq!(exit_code(&parse), EXIT_PARSE_ERROR);

        let missing = ComplianceError::Store(StoreError::NotFound(DocumentId::new("d1").unwrap()));
        assert_eq!(exit_code(&missing), EXIT_ERROR);
    }

    #[test]
    fn test_parse_document_id() {
        assert!(parse_document_id("d1").is_ok());
        assert!(matches!(
            parse_document_id("has space"),
            Err(ComplianceError::InvalidArgument(_))
        ));
    }
}
