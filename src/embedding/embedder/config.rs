use crate::constants::{DEFAULT_EMBEDDING_MODEL, EMBED_MAX_TOKENS, STUB_EMBEDDING_DIM};
use crate::embedding::error::EmbeddingError;
use crate::embedding::source::ModelSource;

#[derive(Debug, Clone)]
/// Configuration for [`Embedder`](super::Embedder).
pub struct EmbedderConfig {
    /// Where the sentence encoder comes from.
    pub source: ModelSource,
    /// Tokens kept per input (longer inputs are truncated).
    pub max_seq_len: usize,
    /// Output dimension in stub mode.
    pub stub_dim: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_MODEL)
    }
}

impl EmbedderConfig {
    /// Env var holding the embedding model identifier.
    pub const ENV_MODEL: &'static str = "RESUMATCH_EMBEDDING_MODEL";

    pub fn new(model_id: &str) -> Self {
        Self {
            source: ModelSource::parse(model_id),
            max_seq_len: EMBED_MAX_TOKENS,
            stub_dim: STUB_EMBEDDING_DIM,
        }
    }

    /// Creates a stub config (no model files; deterministic bag-of-words vectors).
    pub fn stub() -> Self {
        Self {
            source: ModelSource::Stub,
            ..Self::new(DEFAULT_EMBEDDING_MODEL)
        }
    }

    pub fn from_env() -> Self {
        std::env::var(Self::ENV_MODEL)
            .map(|id| Self::new(&id))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.source.is_disabled() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "an embedding model is required".to_string(),
            });
        }
        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }
        if self.source.is_stub() && self.stub_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "stub_dim must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
