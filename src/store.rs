#![forbid(unsafe_code)]

//! Revision-checked document store facade
//!
//! Every operation is a fresh call against the backing store: there is no cache,
//! so reads always observe the current revision. Revisions travel by value on
//! each call; the store holds no per-caller state.

mod file;
mod memory;
mod testdata;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use testdata::{TestData, load_testdata};

use crate::error::StoreError;
use crate::model::Document;
use crate::types::DocumentId;

/// The concurrency contract a document store must offer
///
/// Implementations must be `Send + Sync` so independent checks and rule
/// evaluations can share one store across threads.
pub trait DocumentStore: Send + Sync {
    /// Fetches the current revision of a document
    fn get(&self, id: &DocumentId) -> Result<Document, StoreError>;

    /// Replaces a document if `doc.revision` matches the current revision
    ///
    /// On success returns the committed document carrying its new revision.
    /// Fails with `Conflict` on a revision mismatch and `NotFound` if the id
    /// no longer exists.
    fn put(&self, doc: &Document) -> Result<Document, StoreError>;

    /// Creates a new document, ignoring any caller-supplied id or revision
    fn post(&self, doc: &Document) -> Result<Document, StoreError>;

    /// Deletes a document; later reads of the id fail with `NotFound`
    fn delete(&self, id: &DocumentId) -> Result<(), StoreError>;

    /// Returns up to `limit` documents with ids strictly greater than `after`, in ascending id order
    ///
    /// Corpus scans page through the store with this call, so the ordering must be
    /// stable for an unchanged store.
    fn scan(&self, after: Option<&DocumentId>, limit: usize) -> Result<Vec<Document>, StoreError>;
}

/// Posts a copy of `source_id` whose metadata comes from `template`
///
/// Statements are copied verbatim from the stored source document. Returns the
/// newly created document as committed by the store.
pub fn copy_document(
    store: &dyn DocumentStore,
    source_id: &DocumentId,
    template: Document,
) -> Result<Document, StoreError> {
    let source = store.get(source_id)?;
    store.post(&source.duplicate_into(template))
}
