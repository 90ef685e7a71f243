use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::builder::{BuildOutcome, CancelToken, IndexBuilder};
use crate::document::{DocId, Document};
use crate::error::Result;
use crate::index::InvertedIndex;

/// Published-snapshot handle implementing the single-writer/multi-reader
/// protocol. Readers take an `Arc` snapshot and never block on builds; every
/// mutation serializes on the build lock, prepares the next index as a
/// scratch value, and publishes it with an atomic reference swap, so
/// in-flight queries keep reading the prior consistent snapshot.
pub struct IndexHandle {
    current: RwLock<Arc<InvertedIndex>>,
    build_lock: Mutex<()>,
}

impl IndexHandle {
    pub fn new(index: InvertedIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)), build_lock: Mutex::new(()) }
    }

    /// The current immutable snapshot.
    pub fn snapshot(&self) -> Arc<InvertedIndex> {
        self.current.read().clone()
    }

    fn publish(&self, next: InvertedIndex) {
        let next = Arc::new(next);
        tracing::debug!(num_docs = next.total_documents(), "published index snapshot");
        *self.current.write() = next;
    }

    /// Full rebuild: constructs a fresh index from `docs` and swaps it in.
    pub fn rebuild<'a, I>(&self, builder: &IndexBuilder, docs: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let _guard = self.build_lock.lock();
        let next = builder.build(docs)?;
        self.publish(next);
        Ok(())
    }

    /// Cancellable rebuild. Returns `false` when the build was cancelled; the
    /// published index is unchanged in that case.
    pub fn try_rebuild<'a, I>(
        &self,
        builder: &IndexBuilder,
        docs: I,
        cancel: &CancelToken,
    ) -> Result<bool>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let _guard = self.build_lock.lock();
        match builder.try_build(docs, cancel)? {
            BuildOutcome::Complete(next) => {
                self.publish(next);
                Ok(true)
            }
            BuildOutcome::Cancelled => Ok(false),
        }
    }

    /// Incremental upsert: postings for a previous version of the document
    /// are dropped, the new version is indexed, and the delta is published
    /// atomically. Visible to the next `snapshot()` call.
    pub fn add_document(&self, builder: &IndexBuilder, doc: &Document) {
        let _guard = self.build_lock.lock();
        let mut next = (*self.snapshot()).clone();
        next.remove_document(doc.id);
        builder.add_to(&mut next, doc);
        self.publish(next);
    }

    /// Incremental remove. Idempotent: returns false and publishes nothing
    /// when the document was not indexed.
    pub fn remove_document(&self, doc_id: DocId) -> bool {
        let _guard = self.build_lock.lock();
        let current = self.snapshot();
        if !current.contains_document(doc_id) {
            return false;
        }
        let mut next = (*current).clone();
        next.remove_document(doc_id);
        self.publish(next);
        true
    }
}
