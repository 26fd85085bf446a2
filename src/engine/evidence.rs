#![forbid(unsafe_code)]

//! Evidence aggregation and paging

use crate::model::Document;
use crate::types::DocumentId;
use std::collections::HashSet;
use std::ops::Range;

/// Ordered, de-duplicated evidence across a rulebase
///
/// Documents are kept in insertion order and de-duplicated by id, keeping the
/// first occurrence. An unsaved candidate (no id) counts as a single document.
#[derive(Debug, Default, Clone)]
pub struct EvidenceSet {
    seen: HashSet<Option<DocumentId>>,
    documents: Vec<Document>,
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `doc` unless a document with the same id is already present
    ///
    /// Returns true if the document was added.
    pub fn push(&mut self, doc: Document) -> bool {
        if !self.seen.insert(doc.id.clone()) {
            return false;
        }
        self.documents.push(doc);
        true
    }

    pub fn extend(&mut self, docs: impl IntoIterator<Item = Document>) {
        for doc in docs {
            self.push(doc);
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn as_slice(&self) -> &[Document] {
        &self.documents
    }

    /// Copies out the page `[offset, offset + limit)`, clamped to the set
    pub fn page(&self, offset: usize, limit: usize) -> Vec<Document> {
        self.documents[page_bounds(self.len(), offset, limit)].to_vec()
    }

    pub fn into_vec(self) -> Vec<Document> {
        self.documents
    }
}

/// Clamps `[offset, offset + limit)` to a sequence of length `len`
///
/// An offset at or past the end yields an empty range rather than an error.
pub fn page_bounds(len: usize, offset: usize, limit: usize) -> Range<usize> {
    let start = offset.min(len);
    let end = offset.saturating_add(limit).min(len);
    start..end
}
