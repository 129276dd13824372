use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

/// Errors returned by [`VectorIndex`](super::VectorIndex).
#[derive(Debug, Error)]
pub enum IndexError {
    /// The embedding model could not be loaded.
    #[error("embedder unavailable: {reason}")]
    EmbedderUnavailable { reason: String },

    /// Nothing has been indexed into the collection yet.
    #[error("no vector index for collection '{collection}'")]
    NotIndexed { collection: String },

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    VectorDb(#[from] VectorDbError),

    /// Blocking embedding task panicked or was cancelled.
    #[error("embedding task failed: {reason}")]
    TaskFailed { reason: String },
}

pub type IndexResult<T> = Result<T, IndexError>;
