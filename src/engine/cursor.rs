#![forbid(unsafe_code)]

//! Lazy, restartable iteration over the document corpus

use crate::engine::CancellationToken;
use crate::error::CheckError;
use crate::model::Document;
use crate::store::DocumentStore;
use crate::types::DocumentId;
use std::collections::VecDeque;
use tracing::debug;

/// Pages through a store in ascending id order, one batch per store read
///
/// Only one batch is held in memory at a time. The cursor checks its
/// cancellation token before every read and stops for good after the first
/// error, so a failed scan never issues further reads. A scan can be resumed
/// from any id with [`CorpusCursor::starting_after`].
pub struct CorpusCursor<'a> {
    store: &'a dyn DocumentStore,
    token: &'a CancellationToken,
    batch_size: usize,
    after: Option<DocumentId>,
    buffer: VecDeque<Document>,
    finished: bool,
    reads: usize,
}

impl<'a> CorpusCursor<'a> {
    pub fn new(store: &'a dyn DocumentStore, token: &'a CancellationToken, batch_size: usize) -> Self {
        Self {
            store,
            token,
            batch_size: batch_size.max(1),
            after: None,
            buffer: VecDeque::new(),
            finished: false,
            reads: 0,
        }
    }

    /// Resumes a scan after `id`
    pub fn starting_after(mut self, id: DocumentId) -> Self {
        self.after = Some(id);
        self
    }

    /// Id of the last document fetched from the store, if any
    pub fn position(&self) -> Option<&DocumentId> {
        self.after.as_ref()
    }

    /// Number of store reads issued so far
    pub fn reads(&self) -> usize {
        self.reads
    }

    fn fetch(&mut self) -> Result<(), CheckError> {
        self.token.check()?;
        let batch = self.store.scan(self.after.as_ref(), self.batch_size)?;
        self.reads += 1;
        debug!(
            after = ?self.after.as_ref().map(DocumentId::as_str),
            fetched = batch.len(),
            "Fetched corpus batch"
        );

        if batch.len() < self.batch_size {
            self.finished = true;
        }
        if let Some(last) = batch.last().and_then(|doc| doc.id.clone()) {
            self.after = Some(last);
        } else {
            self.finished = true;
        }
        self.buffer.extend(batch);
        Ok(())
    }
}

impl Iterator for CorpusCursor<'_> {
    type Item = Result<Document, CheckError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(doc) = self.buffer.pop_front() {
                return Some(Ok(doc));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.fetch() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}
