//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RESUMATCH_*` environment variables;
//! per-run `top_k`/`top_n` overrides go through
//! [`RankOptions`](crate::pipeline::RankOptions).

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_COLLECTION, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_EXPLANATION_MODEL, DEFAULT_QDRANT_URL, DEFAULT_RERANKER_MODEL,
    DEFAULT_SUMMARIZER_MODEL, DEFAULT_TOP_K, DEFAULT_TOP_N, STUB_MODEL_ID,
};
use crate::embedding::{EmbedderConfig, ModelSource, RerankerConfig};
use crate::extract::{FieldExtractor, SkillVocabulary};
use crate::generation::{ExplainerConfig, SummarizerConfig};
use crate::ingest::{Chunker, Ingestor};

/// Where chunk vectors live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorBackend {
    /// In-process store (optionally snapshotted to disk).
    #[default]
    Memory,
    /// Remote Qdrant collection.
    Qdrant,
}

impl FromStr for VectorBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(VectorBackend::Memory),
            "qdrant" => Ok(VectorBackend::Qdrant),
            _ => Err(ConfigError::UnknownBackend {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for VectorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorBackend::Memory => write!(f, "memory"),
            VectorBackend::Qdrant => write!(f, "qdrant"),
        }
    }
}

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RESUMATCH_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Sentence embedder (hub id, local dir or `stub`). Required.
    pub embedding_model: String,
    /// Cross-encoder; `none` skips reranking.
    pub reranker_model: String,
    /// Seq2seq summarizer; `none` uses excerpts.
    pub summarizer_model: String,
    /// Chat model for explanations; `none` uses templates.
    pub explanation_model: String,

    /// Chunk window in characters. Default: `1000`.
    pub chunk_size: usize,
    /// Overlap between windows. Default: `150`.
    pub chunk_overlap: usize,

    /// Candidates kept after retrieval. Default: `50`.
    pub top_k: usize,
    /// Candidates returned. Default: `5`.
    pub top_n: usize,

    pub vector_backend: VectorBackend,
    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,
    pub collection: String,
    /// Snapshot file for the memory backend.
    pub snapshot_path: Option<PathBuf>,

    /// Skills added to the built-in vocabulary.
    pub extra_skills: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            reranker_model: DEFAULT_RERANKER_MODEL.to_string(),
            summarizer_model: DEFAULT_SUMMARIZER_MODEL.to_string(),
            explanation_model: DEFAULT_EXPLANATION_MODEL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            top_n: DEFAULT_TOP_N,
            vector_backend: VectorBackend::Memory,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            snapshot_path: None,
            extra_skills: Vec::new(),
        }
    }
}

impl Config {
    pub const ENV_EMBEDDING_MODEL: &'static str = "RESUMATCH_EMBEDDING_MODEL";
    pub const ENV_RERANKER_MODEL: &'static str = "RESUMATCH_RERANKER_MODEL";
    pub const ENV_SUMMARIZER_MODEL: &'static str = "RESUMATCH_SUMMARIZER_MODEL";
    pub const ENV_EXPLANATION_MODEL: &'static str = "RESUMATCH_EXPLANATION_MODEL";
    pub const ENV_CHUNK_SIZE: &'static str = "RESUMATCH_CHUNK_SIZE";
    pub const ENV_CHUNK_OVERLAP: &'static str = "RESUMATCH_CHUNK_OVERLAP";
    pub const ENV_TOP_K: &'static str = "RESUMATCH_TOP_K";
    pub const ENV_TOP_N: &'static str = "RESUMATCH_TOP_N";
    pub const ENV_VECTOR_BACKEND: &'static str = "RESUMATCH_VECTOR_BACKEND";
    pub const ENV_QDRANT_URL: &'static str = "RESUMATCH_QDRANT_URL";
    pub const ENV_COLLECTION: &'static str = "RESUMATCH_COLLECTION";
    pub const ENV_SNAPSHOT_PATH: &'static str = "RESUMATCH_SNAPSHOT_PATH";
    pub const ENV_EXTRA_SKILLS: &'static str = "RESUMATCH_EXTRA_SKILLS";

    /// All models in stub mode: runs without model files or network access.
    pub fn stub() -> Self {
        Self {
            embedding_model: STUB_MODEL_ID.to_string(),
            reranker_model: STUB_MODEL_ID.to_string(),
            summarizer_model: STUB_MODEL_ID.to_string(),
            explanation_model: STUB_MODEL_ID.to_string(),
            ..Self::default()
        }
    }

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            reranker_model: Self::parse_string_from_env(
                Self::ENV_RERANKER_MODEL,
                defaults.reranker_model,
            ),
            summarizer_model: Self::parse_string_from_env(
                Self::ENV_SUMMARIZER_MODEL,
                defaults.summarizer_model,
            ),
            explanation_model: Self::parse_string_from_env(
                Self::ENV_EXPLANATION_MODEL,
                defaults.explanation_model,
            ),
            chunk_size: Self::parse_usize_from_env(Self::ENV_CHUNK_SIZE, defaults.chunk_size)?,
            chunk_overlap: Self::parse_usize_from_env(
                Self::ENV_CHUNK_OVERLAP,
                defaults.chunk_overlap,
            )?,
            top_k: Self::parse_usize_from_env(Self::ENV_TOP_K, defaults.top_k)?,
            top_n: Self::parse_usize_from_env(Self::ENV_TOP_N, defaults.top_n)?,
            vector_backend: match env::var(Self::ENV_VECTOR_BACKEND) {
                Ok(value) => value.parse()?,
                Err(_) => defaults.vector_backend,
            },
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection),
            snapshot_path: Self::parse_optional_path_from_env(Self::ENV_SNAPSHOT_PATH),
            extra_skills: Self::parse_list_from_env(Self::ENV_EXTRA_SKILLS),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks numeric bounds and required settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (Self::ENV_CHUNK_SIZE, self.chunk_size),
            (Self::ENV_TOP_K, self.top_k),
            (Self::ENV_TOP_N, self.top_n),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroValue { name });
            }
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidChunking {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }

        if ModelSource::parse(&self.embedding_model).is_disabled() {
            return Err(ConfigError::EmbedderDisabled);
        }

        if self.collection.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_COLLECTION,
            });
        }
        if self.vector_backend == VectorBackend::Qdrant && self.qdrant_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_QDRANT_URL,
            });
        }

        Ok(())
    }

    pub fn embedder_config(&self) -> EmbedderConfig {
        EmbedderConfig::new(&self.embedding_model)
    }

    pub fn reranker_config(&self) -> RerankerConfig {
        RerankerConfig::new(&self.reranker_model)
    }

    pub fn summarizer_config(&self) -> SummarizerConfig {
        SummarizerConfig::new(&self.summarizer_model)
    }

    pub fn explainer_config(&self) -> ExplainerConfig {
        ExplainerConfig::new(&self.explanation_model)
    }

    pub fn vocabulary(&self) -> SkillVocabulary {
        SkillVocabulary::builtin().with_extra(self.extra_skills.iter().map(String::as_str))
    }

    /// Extractor + chunker built from these settings.
    pub fn ingestor(&self) -> Result<Ingestor, ConfigError> {
        let chunker = Chunker::new(self.chunk_size, self.chunk_overlap).map_err(|_| {
            ConfigError::InvalidChunking {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            }
        })?;
        Ok(Ingestor::new(FieldExtractor::new(self.vocabulary()), chunker))
    }

    fn parse_usize_from_env(name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::NumberParseError {
                    name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_list_from_env(var_name: &str) -> Vec<String> {
        env::var(var_name)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
