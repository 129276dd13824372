use crate::constants::{DEFAULT_RERANKER_MODEL, RERANK_MAX_TOKENS};
use crate::embedding::source::ModelSource;

pub const MAX_SEQ_LEN: usize = RERANK_MAX_TOKENS;

#[derive(Debug, Clone)]
pub struct RerankerConfig {
    pub source: ModelSource,

    /// Tokens kept per (query, candidate) pair.
    pub max_seq_len: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RERANKER_MODEL)
    }
}

impl RerankerConfig {
    pub const ENV_MODEL: &'static str = "RESUMATCH_RERANKER_MODEL";

    pub fn new(model_id: &str) -> Self {
        Self {
            source: ModelSource::parse(model_id),
            max_seq_len: MAX_SEQ_LEN,
        }
    }

    pub fn stub() -> Self {
        Self {
            source: ModelSource::Stub,
            max_seq_len: MAX_SEQ_LEN,
        }
    }

    pub fn disabled() -> Self {
        Self {
            source: ModelSource::Disabled,
            max_seq_len: MAX_SEQ_LEN,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_seq_len == 0 {
            return Err("max_seq_len must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn from_env() -> Self {
        std::env::var(Self::ENV_MODEL)
            .map(|id| Self::new(&id))
            .unwrap_or_default()
    }
}
