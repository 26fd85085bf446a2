#![forbid(unsafe_code)]

//! Thread-safe in-memory document store

use crate::error::StoreError;
use crate::model::Document;
use crate::store::DocumentStore;
use crate::types::{DocumentId, Revision};
use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// In-memory document store with optimistic concurrency
///
/// Documents are kept in a `BTreeMap` keyed by id, so scans come out in
/// ascending id order. Ids are assigned from a counter and zero-padded, which
/// makes id order equal creation order for posted documents.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<BTreeMap<DocumentId, Document>>,
    next_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with documents, keeping their ids
    pub fn with_documents(documents: Vec<Document>) -> Result<Self, StoreError> {
        let store = Self::new();
        for doc in documents {
            store.seed(doc)?;
        }
        Ok(store)
    }

    /// Inserts a document keeping its caller-supplied id, or assigning one if absent
    ///
    /// Used for fixtures and persisted snapshots. Any supplied revision is kept so
    /// that a reloaded snapshot keeps answering with the revisions it handed out;
    /// a missing revision is issued as generation 1. Seeding an id that already
    /// exists fails with `Conflict`.
    pub fn seed(&self, mut doc: Document) -> Result<Document, StoreError> {
        let mut documents = self.write()?;

        let id = match doc.id.take() {
            Some(id) => id,
            None => self.allocate_id(&documents),
        };
        if let Some(existing) = documents.get(&id) {
            return Err(StoreError::Conflict {
                id,
                submitted: doc.revision,
                current: existing.revision.clone().unwrap_or_else(|| Revision::issue(0, 0)),
            });
        }

        doc.id = Some(id.clone());
        if doc.revision.is_none() {
            doc.revision = Some(issue_revision(1, &doc));
        }
        self.bump_counter_past(&id);
        documents.insert(id, doc.clone());
        Ok(doc)
    }

    /// Puts `id` back to a previously observed state, removing it when `previous` is `None`
    ///
    /// Used to undo a write whose persistence failed. Revision checks are
    /// bypassed, so callers must hold whatever lock serializes their writes.
    pub(crate) fn restore(&self, id: &DocumentId, previous: Option<Document>) -> Result<(), StoreError> {
        let mut documents = self.write()?;
        match previous {
            Some(doc) => documents.insert(id.clone(), doc),
            None => documents.remove(id),
        };
        Ok(())
    }

    /// Snapshot of every stored document in id order
    pub fn documents(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.read()?.values().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<DocumentId, Document>>, StoreError> {
        self.documents
            .read()
            .map_err(|_| StoreError::Unavailable("document map lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<DocumentId, Document>>, StoreError> {
        self.documents
            .write()
            .map_err(|_| StoreError::Unavailable("document map lock poisoned".to_string()))
    }

    fn allocate_id(&self, documents: &BTreeMap<DocumentId, Document>) -> DocumentId {
        loop {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(id) = DocumentId::new(format!("{:016x}", n))
                && !documents.contains_key(&id)
            {
                return id;
            }
        }
    }

    /// Keeps generated ids ahead of seeded ids that look like generated ones
    fn bump_counter_past(&self, id: &DocumentId) {
        if id.as_str().len() == 16
            && let Ok(n) = u64::from_str_radix(id.as_str(), 16)
        {
            self.next_id.fetch_max(n, Ordering::SeqCst);
        }
    }
}

/// Issues a revision for `doc` at the given generation
fn issue_revision(generation: u64, doc: &Document) -> Revision {
    let mut hasher = DefaultHasher::new();
    generation.hash(&mut hasher);
    doc.name.hash(&mut hasher);
    doc.tags.hash(&mut hasher);
    doc.statements.hash(&mut hasher);
    Revision::issue(generation, hasher.finish())
}

impl DocumentStore for InMemoryStore {
    fn get(&self, id: &DocumentId) -> Result<Document, StoreError> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn put(&self, doc: &Document) -> Result<Document, StoreError> {
        let id = doc.id.clone().ok_or(StoreError::MissingId)?;
        let mut documents = self.write()?;

        let current = documents
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let current_revision = current
            .revision
            .clone()
            .ok_or_else(|| StoreError::Unavailable(format!("stored document {} has no revision", id)))?;

        if doc.revision.as_ref() != Some(&current_revision) {
            debug!(
                id = %id,
                current = %current_revision,
                "Rejecting write based on stale revision"
            );
            return Err(StoreError::Conflict {
                id,
                submitted: doc.revision.clone(),
                current: current_revision,
            });
        }

        let generation = current_revision.generation().unwrap_or(0) + 1;
        let mut committed = doc.clone();
        committed.revision = Some(issue_revision(generation, &committed));
        documents.insert(id, committed.clone());
        Ok(committed)
    }

    fn post(&self, doc: &Document) -> Result<Document, StoreError> {
        let mut documents = self.write()?;
        let id = self.allocate_id(&documents);

        let mut created = doc.clone();
        created.id = Some(id.clone());
        created.revision = Some(issue_revision(1, &created));
        documents.insert(id, created.clone());
        Ok(created)
    }

    fn delete(&self, id: &DocumentId) -> Result<(), StoreError> {
        self.write()?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn scan(&self, after: Option<&DocumentId>, limit: usize) -> Result<Vec<Document>, StoreError> {
        let documents = self.read()?;
        let lower = match after {
            Some(id) => Bound::Excluded(id.clone()),
            None => Bound::Unbounded,
        };
        Ok(documents
            .range((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}
