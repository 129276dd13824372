use thiserror::Error;

use crate::embedding::RerankerError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("reranker error: {0}")]
    Reranker(#[from] RerankerError),

    /// Blocking rerank task panicked or was cancelled.
    #[error("rerank task failed: {reason}")]
    TaskFailed { reason: String },
}
