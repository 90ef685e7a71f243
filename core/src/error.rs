use std::io;

use thiserror::Error;

use crate::document::DocId;

/// Errors surfaced by the engine. Unknown query terms are never an error and
/// neither is a cancelled build; both have defined non-exceptional outcomes.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("document {0} not found")]
    NotFound(DocId),

    /// Only raised by insert-only document store operations.
    #[error("document {0} already exists")]
    DuplicateId(DocId),

    /// Only raised when a build is configured to require documents.
    #[error("corpus is empty")]
    EmptyCorpus,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("snapshot metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
