use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to load generation model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("generation failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    /// The chat provider rejected or failed the request.
    #[error("explanation request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("generation model not available: {reason}")]
    NotAvailable { reason: String },

    #[error("invalid generation configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for GenerationError {
    fn from(err: candle_core::Error) -> Self {
        GenerationError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<EmbeddingError> for GenerationError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::NotAvailable { reason } => GenerationError::NotAvailable { reason },
            other => GenerationError::ModelLoadFailed {
                reason: other.to_string(),
            },
        }
    }
}
