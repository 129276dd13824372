use thiserror::Error;

use crate::config::ConfigError;
use crate::index::IndexError;
use crate::ingest::IngestError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    /// No vector index exists for the corpus.
    #[error("vector index unavailable for collection '{collection}'")]
    IndexUnavailable { collection: String },

    #[error("index error: {0}")]
    Index(IndexError),

    #[error("no resumes to rank")]
    NoResumes,

    #[error("ranking run timed out after {timeout_ms} ms")]
    TimedOut { timeout_ms: u64 },

    #[error("ranking run was cancelled")]
    Cancelled,

    #[error("ranking task failed: {reason}")]
    TaskFailed { reason: String },
}

impl From<IndexError> for PipelineError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::NotIndexed { collection } => PipelineError::IndexUnavailable { collection },
            other => PipelineError::Index(other),
        }
    }
}
