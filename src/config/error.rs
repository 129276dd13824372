//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting could not be parsed.
    #[error("failed to parse {name} '{value}': {source}")]
    NumberParseError {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A numeric setting must be positive.
    #[error("{name} must be greater than zero")]
    ZeroValue { name: &'static str },

    /// Chunk overlap must be strictly smaller than the chunk size.
    #[error("chunk overlap {overlap} must be smaller than chunk size {size}")]
    InvalidChunking { size: usize, overlap: usize },

    /// Unknown vector backend name.
    #[error("unknown vector backend '{value}': expected 'memory' or 'qdrant'")]
    UnknownBackend { value: String },

    /// A required string setting is empty.
    #[error("{name} must not be empty")]
    EmptyValue { name: &'static str },

    /// The embedding model is mandatory; it cannot be disabled.
    #[error("the embedding model cannot be disabled")]
    EmbedderDisabled,
}
