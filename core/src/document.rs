use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, SearchError};

pub type DocId = u32;

/// One page of the site, as produced by the content pipeline. Immutable once
/// indexed; replacing a document means delete + insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub id: DocId,
    pub url: String,
    pub title: String,
    pub body: String,
}

/// Owns document metadata and lifecycle, keyed by id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DocumentStore {
    docs: HashMap<DocId, Document>,
    order: Vec<DocId>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.docs.contains_key(&id)
    }

    /// Upsert. Returns the replaced document, if any.
    pub fn put(&mut self, doc: Document) -> Option<Document> {
        let id = doc.id;
        let prev = self.docs.insert(id, doc);
        if prev.is_none() {
            self.order.push(id);
        }
        prev
    }

    /// Insert-only variant of [`put`](Self::put).
    pub fn insert(&mut self, doc: Document) -> Result<()> {
        if self.docs.contains_key(&doc.id) {
            return Err(SearchError::DuplicateId(doc.id));
        }
        self.put(doc);
        Ok(())
    }

    pub fn get(&self, id: DocId) -> Result<&Document> {
        self.docs.get(&id).ok_or(SearchError::NotFound(id))
    }

    /// Idempotent: removing an absent id is a no-op, not an error.
    pub fn remove(&mut self, id: DocId) -> Option<Document> {
        let removed = self.docs.remove(&id);
        if removed.is_some() {
            self.order.retain(|&d| d != id);
        }
        removed
    }

    /// Lazy, restartable iteration in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> + '_ {
        self.order.iter().filter_map(|id| self.docs.get(id))
    }
}
