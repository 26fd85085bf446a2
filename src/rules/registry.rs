#![forbid(unsafe_code)]

//! Rulebase registry
//!
//! The RulebaseRegistry is responsible for:
//! - Compiling inline rulebase definitions from compliance.toml
//! - Loading one rulebase per `.toml` file from a rulebases directory
//! - Resolving a rulebase id to an immutable, ordered rule set

use crate::error::{CheckError, RuleError};
use crate::rules::{Rule, RulebaseDefinition};
use crate::types::RulebaseId;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// An identified, ordered set of rules
///
/// Rule order is significant: it is the order evidence is concatenated in.
#[derive(Debug, Clone)]
pub struct Rulebase {
    id: RulebaseId,
    description: String,
    rules: Vec<Rule>,
}

impl Rulebase {
    pub fn new(id: RulebaseId, description: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            id,
            description: description.into(),
            rules,
        }
    }

    pub fn id(&self) -> &RulebaseId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Registry of compiled rulebases keyed by id
///
/// Rulebases are shared as `Arc`s: a check holds the snapshot it resolved for
/// its whole run, so it never observes a partially updated rule set.
#[derive(Debug, Default)]
pub struct RulebaseRegistry {
    rulebases: BTreeMap<RulebaseId, Arc<Rulebase>>,
}

impl RulebaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a compiled rulebase
    ///
    /// # Errors
    ///
    /// Returns `RuleError::DuplicateRulebase` if the id is already registered.
    pub fn register(&mut self, rulebase: Rulebase) -> Result<(), RuleError> {
        if self.rulebases.contains_key(rulebase.id()) {
            return Err(RuleError::DuplicateRulebase(rulebase.id().clone()));
        }
        debug!(rulebase = %rulebase.id(), rules = rulebase.rules().len(), "Registered rulebase");
        self.rulebases.insert(rulebase.id().clone(), Arc::new(rulebase));
        Ok(())
    }

    /// Compiles and registers each definition in order
    pub fn load_definitions(&mut self, definitions: &[RulebaseDefinition]) -> Result<(), RuleError> {
        for def in definitions {
            self.register(def.compile()?)?;
        }
        Ok(())
    }

    /// Loads every `.toml` file in `dir` as one rulebase
    ///
    /// Files are processed in file-name order so that errors are reported
    /// deterministically. A missing directory is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if:
    /// - `dir` exists but is not a directory or cannot be read
    /// - A file cannot be parsed or compiled
    /// - Two rulebases share an id
    pub fn load_dir(&mut self, dir: &Path) -> Result<(), RuleError> {
        if !dir.exists() {
            warn!(dir = %dir.display(), "Rulebase directory does not exist");
            return Ok(());
        }

        if !dir.is_dir() {
            return Err(RuleError::InvalidDefinition(format!(
                "Path is not a directory: {}",
                dir.display()
            )));
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            RuleError::InvalidDefinition(format!(
                "Failed to read directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                RuleError::InvalidDefinition(format!(
                    "Failed to read directory entry in {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let rulebase = RulebaseDefinition::from_path(&path)
                .and_then(|def| def.compile())
                .map_err(|e| RuleError::InvalidDefinition(format!("{}: {}", path.display(), e)))?;
            self.register(rulebase)?;
        }

        Ok(())
    }

    /// Resolves a rulebase id to its rule set
    ///
    /// # Errors
    ///
    /// Returns `CheckError::RulebaseNotFound` for unknown or malformed ids.
    pub fn resolve(&self, id: &str) -> Result<Arc<Rulebase>, CheckError> {
        let not_found = || CheckError::RulebaseNotFound(id.to_string());
        let key = RulebaseId::new(id).ok_or_else(not_found)?;
        self.rulebases.get(&key).cloned().ok_or_else(not_found)
    }

    /// Iterates rulebases in id order
    pub fn iter(&self) -> impl Iterator<Item = &Rulebase> {
        self.rulebases.values().map(|rb| rb.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rulebases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rulebases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_rulebase(dir: &Path, filename: &str, id: &str) -> PathBuf {
        let content = format!(
            r#"
id = "{}"
description = "Test rulebase"

[[rule]]
id = "first"
kind = "non-empty"

[[rule]]
id = "second"
kind = "consistent"
"#,
            id
        );
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_new_registry() {
        let registry = RulebaseRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = RulebaseRegistry::new();
        assert_eq!(
            registry.resolve("R1").unwrap_err(),
            CheckError::RulebaseNotFound("R1".to_string())
        );
        assert!(matches!(
            registry.resolve(""),
            Err(CheckError::RulebaseNotFound(_))
        ));
    }

    #[test]
    fn test_register_and_resolve_keeps_order() {
        let mut registry = RulebaseRegistry::new();
        let def = RulebaseDefinition::from_toml(
            r#"
id = "R1"
[[rule]]
id = "zeta"
kind = "non-empty"
[[rule]]
id = "alpha"
kind = "consistent"
"#,
        )
        .unwrap();
        registry.load_definitions(&[def]).unwrap();

        let first = registry.resolve("R1").unwrap();
        let second = registry.resolve("R1").unwrap();
        let ids: Vec<&str> = first.rules().iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_duplicate_rulebase_rejected() {
        let mut registry = RulebaseRegistry::new();
        let def = RulebaseDefinition::from_toml(r#"id = "R1""#).unwrap();
        registry.load_definitions(std::slice::from_ref(&def)).unwrap();
        assert!(matches!(
            registry.load_definitions(&[def]),
            Err(RuleError::DuplicateRulebase(_))
        ));
    }

    #[test]
    fn test_load_dir_missing_is_ok() {
        let mut registry = RulebaseRegistry::new();
        assert!(registry.load_dir(Path::new("/nonexistent/path")).is_ok());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_dir() {
        let temp_dir = TempDir::new().unwrap();
        write_rulebase(temp_dir.path(), "b.toml", "R2");
        write_rulebase(temp_dir.path(), "a.toml", "R1");
        fs::write(temp_dir.path().join("readme.md"), "# Rulebases").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        write_rulebase(&temp_dir.path().join("nested"), "c.toml", "R3");

        let mut registry = RulebaseRegistry::new();
        registry.load_dir(temp_dir.path()).unwrap();

        assert_eq!(registry.len(), 2);
        let ids: Vec<&str> = registry.iter().map(|rb| rb.id().as_str()).collect();
        assert_eq!(ids, vec!["R1", "R2"]);
        assert_eq!(registry.resolve("R2").unwrap().rules().len(), 2);
    }

    #[test]
    fn test_load_dir_duplicate_ids() {
        let temp_dir = TempDir::new().unwrap();
        write_rulebase(temp_dir.path(), "a.toml", "R1");
        write_rulebase(temp_dir.path(), "b.toml", "R1");

        let mut registry = RulebaseRegistry::new();
        let err = registry.load_dir(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate rulebase ID"));
    }

    #[test]
    fn test_load_dir_reports_bad_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "id = \"R1\"\n[[rule]]\nid = \"x\"\nkind = \"require\"\n").unwrap();

        let mut registry = RulebaseRegistry::new();
        let err = registry.load_dir(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_load_dir_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = write_rulebase(temp_dir.path(), "a.toml", "R1");
        let mut registry = RulebaseRegistry::new();
        assert!(registry.load_dir(&file).is_err());
    }
}
