use std::fmt;

use crate::constants::{
    DEFAULT_EXPLANATION_MODEL, DEFAULT_SUMMARIZER_MODEL, DISABLED_MODEL_ID,
    EXPLANATION_MAX_TOKENS, EXPLANATION_TEMPERATURE, STUB_MODEL_ID, SUMMARY_INPUT_MAX_TOKENS,
    SUMMARY_MAX_TOKENS,
};
use crate::embedding::ModelSource;

use super::error::GenerationError;

#[derive(Debug, Clone)]
/// Configuration for [`Summarizer`](super::Summarizer).
pub struct SummarizerConfig {
    pub source: ModelSource,
    /// Generated tokens per summary.
    pub max_new_tokens: usize,
    /// Input tokens kept (after the task prefix).
    pub max_input_tokens: usize,
    /// Sampling seed; decoding is greedy so this only matters for reproducible logs.
    pub seed: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARIZER_MODEL)
    }
}

impl SummarizerConfig {
    pub const ENV_MODEL: &'static str = "RESUMATCH_SUMMARIZER_MODEL";

    pub fn new(model_id: &str) -> Self {
        Self {
            source: ModelSource::parse(model_id),
            max_new_tokens: SUMMARY_MAX_TOKENS,
            max_input_tokens: SUMMARY_INPUT_MAX_TOKENS,
            seed: 299792458,
        }
    }

    pub fn stub() -> Self {
        Self::new(STUB_MODEL_ID)
    }

    pub fn disabled() -> Self {
        Self::new(DISABLED_MODEL_ID)
    }

    pub fn from_env() -> Self {
        std::env::var(Self::ENV_MODEL)
            .map(|id| Self::new(&id))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.max_new_tokens == 0 {
            return Err(GenerationError::InvalidConfig {
                reason: "max_new_tokens must be greater than zero".to_string(),
            });
        }
        if self.max_input_tokens == 0 {
            return Err(GenerationError::InvalidConfig {
                reason: "max_input_tokens must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Which chat backend answers explanation requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainerBackend {
    Disabled,
    Stub,
    /// Model name routed by `genai` (provider inferred from the name).
    Chat(String),
}

impl ExplainerBackend {
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        if id.is_empty()
            || id.eq_ignore_ascii_case(DISABLED_MODEL_ID)
            || id.eq_ignore_ascii_case("off")
        {
            ExplainerBackend::Disabled
        } else if id.eq_ignore_ascii_case(STUB_MODEL_ID) {
            ExplainerBackend::Stub
        } else {
            ExplainerBackend::Chat(id.to_string())
        }
    }
}

impl fmt::Display for ExplainerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplainerBackend::Disabled => write!(f, "{DISABLED_MODEL_ID}"),
            ExplainerBackend::Stub => write!(f, "{STUB_MODEL_ID}"),
            ExplainerBackend::Chat(model) => write!(f, "{model}"),
        }
    }
}

#[derive(Debug, Clone)]
/// Configuration for [`LlmExplainer`](super::LlmExplainer).
pub struct ExplainerConfig {
    pub backend: ExplainerBackend,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EXPLANATION_MODEL)
    }
}

impl ExplainerConfig {
    pub const ENV_MODEL: &'static str = "RESUMATCH_EXPLANATION_MODEL";

    pub fn new(model_id: &str) -> Self {
        Self {
            backend: ExplainerBackend::parse(model_id),
            max_tokens: EXPLANATION_MAX_TOKENS,
            temperature: EXPLANATION_TEMPERATURE,
        }
    }

    pub fn stub() -> Self {
        Self::new(STUB_MODEL_ID)
    }

    pub fn disabled() -> Self {
        Self::new(DISABLED_MODEL_ID)
    }

    pub fn from_env() -> Self {
        std::env::var(Self::ENV_MODEL)
            .map(|id| Self::new(&id))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.max_tokens == 0 {
            return Err(GenerationError::InvalidConfig {
                reason: "max_tokens must be greater than zero".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GenerationError::InvalidConfig {
                reason: format!("temperature {} outside [0, 2]", self.temperature),
            });
        }
        Ok(())
    }
}
