use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::document::Document;
use crate::error::{Result, SearchError};
use crate::index::{Field, FieldBoosts, InvertedIndex};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub boosts: FieldBoosts,
    /// When set, building from an empty corpus is an error instead of
    /// producing an empty (but valid, queryable) index.
    pub require_documents: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { boosts: FieldBoosts::default(), require_documents: false }
    }
}

/// Cooperative cancellation signal for builds, checked between documents.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Outcome of a cancellable build. Cancellation is not an error: the scratch
/// index is discarded and any previously published index is unchanged.
#[derive(Debug)]
pub enum BuildOutcome {
    Complete(InvertedIndex),
    Cancelled,
}

/// Turns documents into an [`InvertedIndex`]: tokenizes title and body
/// separately, records per-field length statistics, and populates postings.
pub struct IndexBuilder {
    tokenizer: Tokenizer,
    config: BuildConfig,
}

impl IndexBuilder {
    pub fn new(tokenizer: Tokenizer, config: BuildConfig) -> Self {
        Self { tokenizer, config }
    }

    /// The analyzer documents were indexed with. Queries must go through the
    /// same one: a term indexed as X has to be looked up as X.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn build<'a, I>(&self, docs: I) -> Result<InvertedIndex>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut index = InvertedIndex::new(self.config.boosts);
        let mut count = 0usize;
        for doc in docs {
            self.add_to(&mut index, doc);
            count += 1;
        }
        self.finish(index, count)
    }

    /// Like [`build`](Self::build), but checks `cancel` between documents.
    pub fn try_build<'a, I>(&self, docs: I, cancel: &CancelToken) -> Result<BuildOutcome>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut index = InvertedIndex::new(self.config.boosts);
        let mut count = 0usize;
        for doc in docs {
            if cancel.is_cancelled() {
                tracing::info!(indexed = count, "build cancelled, discarding scratch index");
                return Ok(BuildOutcome::Cancelled);
            }
            self.add_to(&mut index, doc);
            count += 1;
        }
        self.finish(index, count).map(BuildOutcome::Complete)
    }

    fn finish(&self, index: InvertedIndex, count: usize) -> Result<InvertedIndex> {
        if count == 0 && self.config.require_documents {
            return Err(SearchError::EmptyCorpus);
        }
        tracing::info!(
            num_docs = index.total_documents(),
            num_terms = index.num_terms(),
            "index build complete"
        );
        Ok(index)
    }

    /// Indexes one document into `index`. The caller is responsible for
    /// removing a previous version first when replacing.
    pub fn add_to(&self, index: &mut InvertedIndex, doc: &Document) {
        index.register_document(doc.id);
        for field in Field::ALL {
            let text = match field {
                Field::Title => &doc.title,
                Field::Body => &doc.body,
            };
            let tokens = self.tokenizer.tokenize(text);
            index.record_field_length(doc.id, field, tokens.len() as u32);
            for (term, position) in tokens {
                index.add_posting(&term, doc.id, field, position);
            }
        }
    }
}
