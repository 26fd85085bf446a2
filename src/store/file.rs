#![forbid(unsafe_code)]

//! Document store persisted to a JSON file

use crate::error::{ConfigError, StoreError};
use crate::model::Document;
use crate::store::{DocumentStore, InMemoryStore};
use crate::types::DocumentId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// On-disk layout of a persisted store
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    #[serde(default)]
    documents: Vec<Document>,
}

/// An `InMemoryStore` that rewrites its JSON file after every successful write
///
/// The file is written to a sibling temp file and renamed into place, so a crash
/// mid-write leaves the previous snapshot intact. Revision checks happen in the
/// in-memory layer. Writes are serialized, and a write whose snapshot cannot be
/// persisted is rolled back, so reads only ever see what reached the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str::<StoreSnapshot>(&content)?
        } else {
            StoreSnapshot::default()
        };

        let inner = InMemoryStore::with_documents(snapshot.documents).map_err(|e| {
            ConfigError::Validation(format!("Store file {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), documents = inner.len(), "Opened document store");

        Ok(Self {
            path,
            inner,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seeds a document keeping its id and persists the result
    pub fn seed(&self, doc: Document) -> Result<Document, StoreError> {
        let _guard = self.lock()?;
        let seeded = self.inner.seed(doc)?;
        self.persist_or_restore(seeded.id.as_ref(), None)?;
        Ok(seeded)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store write lock poisoned".to_string()))
    }

    /// Persists the current state; on failure puts `id` back to `previous`
    ///
    /// Must be called with the write lock held.
    fn persist_or_restore(&self, id: Option<&DocumentId>, previous: Option<Document>) -> Result<(), StoreError> {
        let Err(e) = self.persist() else {
            return Ok(());
        };
        if let Some(id) = id {
            warn!(id = %id, error = %e, "Rolling back write that could not be persisted");
            self.inner.restore(id, previous)?;
        }
        Err(e)
    }

    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = StoreSnapshot {
            documents: self.inner.documents()?,
        };
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StoreError::Unavailable(format!("Failed to encode store: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, &self.path)).map_err(|e| {
            StoreError::Unavailable(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, id: &DocumentId) -> Result<Document, StoreError> {
        self.inner.get(id)
    }

    fn put(&self, doc: &Document) -> Result<Document, StoreError> {
        let _guard = self.lock()?;
        let previous = doc.id.as_ref().and_then(|id| self.inner.get(id).ok());
        let committed = self.inner.put(doc)?;
        self.persist_or_restore(committed.id.as_ref(), previous)?;
        Ok(committed)
    }

    fn post(&self, doc: &Document) -> Result<Document, StoreError> {
        let _guard = self.lock()?;
        let created = self.inner.post(doc)?;
        self.persist_or_restore(created.id.as_ref(), None)?;
        Ok(created)
    }

    fn delete(&self, id: &DocumentId) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let previous = self.inner.get(id)?;
        self.inner.delete(id)?;
        self.persist_or_restore(Some(id), Some(previous))
    }

    fn scan(&self, after: Option<&DocumentId>, limit: usize) -> Result<Vec<Document>, StoreError> {
        self.inner.scan(after, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Statement;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path().join("documents.json")).unwrap();
        assert!(store.scan(None, 10).unwrap().is_empty());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("documents.json");

        let created = {
            let store = JsonFileStore::open(&path).unwrap();
            let created = store
                .post(&Document::new("Policy").with_statement(Statement::new("X", "is", "forbidden")))
                .unwrap();
            store.put(&created).unwrap()
        };

        let reopened = JsonFileStore::open(&path).unwrap();
        let fetched = reopened.get(created.id.as_ref().unwrap()).unwrap();
        assert_eq!(fetched, created);

        // The reloaded revision is still the one to write against
        assert!(reopened.put(&fetched).is_ok());
    }

    #[test]
    fn test_delete_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("documents.json");

        let store = JsonFileStore::open(&path).unwrap();
        let created = store.post(&Document::new("Temp")).unwrap();
        let id = created.id.unwrap();
        store.delete(&id).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get(&id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn test_open_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("documents.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_open_duplicate_ids_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("documents.json");
        fs::write(
            &path,
            r#"{"documents": [{"_id": "a", "name": "one"}, {"_id": "a", "name": "two"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    /// Replaces the store file with a non-empty directory so the rename fails
    fn block_persistence(path: &Path) {
        fs::remove_file(path).unwrap();
        fs::create_dir(path).unwrap();
        fs::write(path.join("occupied"), "").unwrap();
    }

    fn unblock_persistence(path: &Path) {
        fs::remove_dir_all(path).unwrap();
    }

    #[test]
    fn test_failed_put_is_rolled_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("documents.json");
        let store = JsonFileStore::open(&path).unwrap();
        let original = store
            .post(&Document::new("Policy").with_statement(Statement::new("X", "is", "forbidden")))
            .unwrap();
        let id = original.id.clone().unwrap();

        block_persistence(&path);
        let mut update = original.clone();
        update.name = "Renamed".to_string();
        assert!(matches!(store.put(&update), Err(StoreError::Unavailable(_))));
        assert_eq!(store.get(&id).unwrap(), original);

        // The original revision is still the one to write against
        unblock_persistence(&path);
        let committed = store.put(&update).unwrap();
        assert_eq!(committed.revision.as_ref().unwrap().generation(), Some(2));
        assert_eq!(JsonFileStore::open(&path).unwrap().get(&id).unwrap(), committed);
    }

    #[test]
    fn test_failed_post_leaves_no_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("documents.json");
        let store = JsonFileStore::open(&path).unwrap();
        let existing = store.post(&Document::new("Existing")).unwrap();

        block_persistence(&path);
        assert!(matches!(
            store.post(&Document::new("Lost")),
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.scan(None, 10).unwrap(), vec![existing]);
    }

    #[test]
    fn test_failed_delete_keeps_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("documents.json");
        let store = JsonFileStore::open(&path).unwrap();
        let created = store.post(&Document::new("Keep")).unwrap();
        let id = created.id.clone().unwrap();

        block_persistence(&path);
        assert!(matches!(store.delete(&id), Err(StoreError::Unavailable(_))));
        assert_eq!(store.get(&id).unwrap(), created);
    }
}
