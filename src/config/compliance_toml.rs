//! Parsing and validation for compliance.toml configuration files

use crate::engine::{CheckOptions, EvaluationStrategy};
use crate::error::{ConfigError, RuleError};
use crate::rules::{DEFAULT_NEGATION_KEY, DEFAULT_SCAN_BATCH, DeclaredOpposites, RulebaseDefinition, RulebaseRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration struct for compliance.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Store, rulebase location and evaluation settings
    pub compliance: ComplianceMeta,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Settings for the default contradiction oracle
    #[serde(default)]
    pub contradictions: ContradictionConfig,

    /// Inline rulebase definitions
    #[serde(default, rename = "rulebase")]
    pub rulebases: Vec<RulebaseDefinition>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.compliance.version != "1" {
            return Err(ConfigError::Validation(format!(
                "Unsupported configuration version '{}'. Expected '1'",
                self.compliance.version
            )));
        }

        if self.compliance.scan_batch == 0 {
            return Err(ConfigError::Validation(
                "scan_batch must be at least 1".to_string(),
            ));
        }

        if self.contradictions.negation_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "contradictions.negation_key must not be empty".to_string(),
            ));
        }

        // Compiling checks patterns, selectors and per-rulebase rule id uniqueness
        let mut seen = HashSet::new();
        for def in &self.rulebases {
            def.compile().map_err(|e| {
                ConfigError::Validation(format!("Rulebase '{}': {}", def.id, e))
            })?;
            if !seen.insert(def.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate rulebase ID '{}'",
                    def.id
                )));
            }
        }

        Ok(())
    }

    /// Path of the JSON document store, resolved against `config_dir`
    pub fn store_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.compliance.store)
    }

    /// Path of the rulebases directory, resolved against `config_dir`
    pub fn rulebases_dir(&self, config_dir: &Path) -> Option<PathBuf> {
        self.compliance
            .rulebases_dir
            .as_ref()
            .map(|dir| config_dir.join(dir))
    }

    /// Builds the registry from inline definitions followed by the rulebases directory
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if a definition fails to compile or two rulebases
    /// (inline or on disk) share an id.
    pub fn build_registry(&self, config_dir: &Path) -> Result<RulebaseRegistry, RuleError> {
        let mut registry = RulebaseRegistry::new();
        registry.load_definitions(&self.rulebases)?;
        if let Some(dir) = self.rulebases_dir(config_dir) {
            registry.load_dir(&dir)?;
        }
        Ok(registry)
    }
}

/// `[compliance]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceMeta {
    /// Configuration version (must be "1")
    pub version: String,

    /// JSON file backing the document store
    #[serde(default = "default_store")]
    pub store: PathBuf,

    /// Directory holding one rulebase per `.toml` file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rulebases_dir: Option<PathBuf>,

    /// Per-check deadline in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Documents fetched per corpus scan read
    #[serde(default = "default_scan_batch")]
    pub scan_batch: usize,

    #[serde(default)]
    pub strategy: EvaluationStrategy,
}

impl ComplianceMeta {
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            strategy: self.strategy,
            scan_batch: self.scan_batch,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

fn default_store() -> PathBuf {
    PathBuf::from("documents.json")
}

fn default_scan_batch() -> usize {
    DEFAULT_SCAN_BATCH
}

/// `[contradictions]` section
///
/// Omitting `opposites` keeps the built-in pairs; listing them replaces the
/// built-in set entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposites: Option<Vec<(String, String)>>,

    #[serde(default = "default_negation_key")]
    pub negation_key: String,
}

impl Default for ContradictionConfig {
    fn default() -> Self {
        Self {
            opposites: None,
            negation_key: default_negation_key(),
        }
    }
}

impl ContradictionConfig {
    pub fn oracle(&self) -> DeclaredOpposites {
        let base = match &self.opposites {
            None => DeclaredOpposites::default(),
            Some(pairs) => pairs
                .iter()
                .fold(DeclaredOpposites::new(), |oracle, (a, b)| {
                    oracle.with_opposites(a, b)
                }),
        };
        base.with_negation_key(self.negation_key.clone())
    }
}

fn default_negation_key() -> String {
    DEFAULT_NEGATION_KEY.to_string()
}

/// Output configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub color: ColorOption,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON Lines format
    Jsonl,
    /// Single JSON response object
    Json,
}

/// Color output options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    /// Auto-detect based on terminal capabilities
    #[default]
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Statement;
    use crate::rules::ContradictionOracle;
    use tempfile::TempDir;

    const VALID_CONFIG: &str = r#"
[compliance]
version = "1"
store = "data/documents.json"
rulebases_dir = "rulebases"
timeout_ms = 2500
scan_batch = 16
strategy = "lazy"

[output]
format = "json"
color = "never"

[contradictions]
opposites = [["allowed", "denied"]]
negation_key = "not"

[[rulebase]]
id = "R1"
description = "Policy A"

[[rulebase.rule]]
id = "no-policy-a-conflict"
kind = "corpus"
tags = ["policy:A"]

[[rulebase.rule]]
id = "needs-retention"
kind = "require"
subject = "retention"

[[rulebase]]
id = "empty"
"#;

    #[test]
    fn test_valid_config_parsing() {
        let config = Config::parse(VALID_CONFIG).unwrap();

        assert_eq!(config.compliance.version, "1");
        assert_eq!(config.compliance.store, PathBuf::from("data/documents.json"));
        assert_eq!(config.compliance.strategy, EvaluationStrategy::Lazy);
        assert_eq!(
            config.compliance.check_options(),
            CheckOptions {
                strategy: EvaluationStrategy::Lazy,
                scan_batch: 16,
                timeout: Some(Duration::from_millis(2500)),
            }
        );

        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.color, ColorOption::Never);

        assert_eq!(config.rulebases.len(), 2);
        assert_eq!(config.rulebases[0].rules.len(), 2);
        assert!(config.rulebases[1].rules.is_empty());
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::parse("[compliance]\nversion = \"1\"\n").unwrap();
        assert_eq!(config.compliance.store, PathBuf::from("documents.json"));
        assert_eq!(config.compliance.scan_batch, DEFAULT_SCAN_BATCH);
        assert_eq!(config.compliance.timeout_ms, None);
        assert_eq!(config.compliance.strategy, EvaluationStrategy::Exhaustive);
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.contradictions, ContradictionConfig::default());
        assert!(config.rulebases.is_empty());
    }

    #[test]
    fn test_invalid_version() {
        let result = Config::parse("[compliance]\nversion = \"2\"\n");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Unsupported configuration version")
        );
    }

    #[test]
    fn test_missing_version() {
        assert!(Config::parse("[compliance]\n").is_err());
    }

    #[test]
    fn test_zero_scan_batch() {
        let result = Config::parse("[compliance]\nversion = \"1\"\nscan_batch = 0\n");
        assert!(result.unwrap_err().to_string().contains("scan_batch"));
    }

    #[test]
    fn test_unknown_strategy() {
        let result = Config::parse("[compliance]\nversion = \"1\"\nstrategy = \"eager\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_rule_reported_with_rulebase() {
        let config = r#"
[compliance]
version = "1"

[[rulebase]]
id = "R1"

[[rulebase.rule]]
id = "bad"
kind = "forbid"
object = "[unclosed"
"#;
        let err = Config::parse(config).unwrap_err().to_string();
        assert!(err.contains("Rulebase 'R1'"), "{}", err);
    }

    #[test]
    fn test_duplicate_inline_rulebase() {
        let config = r#"
[compliance]
version = "1"

[[rulebase]]
id = "R1"

[[rulebase]]
id = "R1"
"#;
        let err = Config::parse(config).unwrap_err().to_string();
        assert!(err.contains("Duplicate rulebase ID 'R1'"));
    }

    #[test]
    fn test_oracle_from_config() {
        let config = Config::parse(VALID_CONFIG).unwrap();
        let oracle = config.contradictions.oracle();
        let allowed = Statement::parse_sentence("access is allowed").unwrap();
        let denied = Statement::parse_sentence("access is denied").unwrap();
        assert!(oracle.contradicts(&allowed, &denied));
        assert!(oracle.contradicts(&allowed, &allowed.clone().with_metadata("not", "true")));

        // Listing opposites replaces the built-in pairs
        let forbidden = Statement::parse_sentence("X is forbidden").unwrap();
        let required = Statement::parse_sentence("X is required").unwrap();
        assert!(!oracle.contradicts(&forbidden, &required));
        assert!(ContradictionConfig::default().oracle().contradicts(&forbidden, &required));
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let config = Config::parse(VALID_CONFIG).unwrap();
        let dir = Path::new("/etc/compliance");
        assert_eq!(
            config.store_path(dir),
            PathBuf::from("/etc/compliance/data/documents.json")
        );
        assert_eq!(
            config.rulebases_dir(dir),
            Some(PathBuf::from("/etc/compliance/rulebases"))
        );
    }

    #[test]
    fn test_build_registry_merges_inline_and_dir() {
        let temp_dir = TempDir::new().unwrap();
        let rulebases = temp_dir.path().join("rulebases");
        fs::create_dir(&rulebases).unwrap();
        fs::write(
            rulebases.join("r2.toml"),
            "id = \"R2\"\n[[rule]]\nid = \"non-empty\"\nkind = \"non-empty\"\n",
        )
        .unwrap();

        let config = Config::parse(VALID_CONFIG).unwrap();
        let registry = config.build_registry(temp_dir.path()).unwrap();
        let ids: Vec<&str> = registry.iter().map(|rb| rb.id().as_str()).collect();
        assert_eq!(ids, vec!["R1", "R2", "empty"]);
    }

    #[test]
    fn test_build_registry_rejects_id_shared_with_dir() {
        let temp_dir = TempDir::new().unwrap();
        let rulebases = temp_dir.path().join("rulebases");
        fs::create_dir(&rulebases).unwrap();
        fs::write(rulebases.join("dup.toml"), "id = \"R1\"\n").unwrap();

        let config = Config::parse(VALID_CONFIG).unwrap();
        assert!(matches!(
            config.build_registry(temp_dir.path()),
            Err(RuleError::DuplicateRulebase(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("compliance.toml");
        fs::write(&path, VALID_CONFIG).unwrap();
        assert!(Config::load(&path).is_ok());
        assert!(matches!(
            Config::load(temp_dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
