//! In-memory inverted-index search engine for small content sites.
//!
//! Documents flow in from an external content pipeline as
//! `{id, url, title, body}` records, get tokenized per field, and land in an
//! [`InvertedIndex`] that the query engine scores with tf-idf and per-field
//! boosts. Readers always work against an immutable snapshot published by
//! [`IndexHandle`]; rebuilds and incremental updates swap in a new snapshot
//! atomically.

pub mod builder;
pub mod document;
pub mod error;
pub mod handle;
pub mod index;
pub mod persist;
pub mod search;
pub mod tokenizer;

pub use builder::{BuildConfig, BuildOutcome, CancelToken, IndexBuilder};
pub use document::{DocId, Document, DocumentStore};
pub use error::{Result, SearchError};
pub use handle::IndexHandle;
pub use index::{Field, FieldBoosts, InvertedIndex, Posting, TermId};
pub use search::{search, SearchResult};
pub use tokenizer::{Tokenizer, TokenizerConfig};
