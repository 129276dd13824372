use thiserror::Error;

use super::ResumeId;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid chunking: overlap {overlap} must be smaller than size {size}")]
    InvalidChunking { size: usize, overlap: usize },

    #[error("duplicate resume id {id} in one batch")]
    DuplicateResumeId { id: ResumeId },

    #[error("failed to read resume source: {reason}")]
    ReadFailed { reason: String },
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::ReadFailed {
            reason: err.to_string(),
        }
    }
}
