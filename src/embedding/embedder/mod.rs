//! Sentence embedder (BERT-family encoder + tokenizer).
//!
//! Use [`EmbedderConfig::stub`] for tests without model files: the stub hashes content
//! words into a fixed number of buckets, so texts sharing vocabulary land close together.

/// Embedder configuration.
pub mod config;


pub use config::EmbedderConfig;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::bert::BertEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::source::ModelSource;
use crate::embedding::utils::{content_terms, l2_normalize, load_tokenizer_with_truncation};
use crate::hashing::hash_to_u64;

const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

enum EmbedderBackend {
    Model {
        model: BertEncoder,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Produces L2-normalized sentence embeddings.
pub struct Embedder {
    backend: EmbedderBackend,
    config: EmbedderConfig,
    dim: usize,
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("source", &self.config.source)
            .field("dim", &self.dim)
            .finish()
    }
}

impl Embedder {
    /// Loads the embedder described by `config` (downloads hub models on first use).
    pub fn load(config: EmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.source.is_stub() {
            warn!("Embedder running in STUB mode (testing only)");
            let dim = config.stub_dim;
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
                dim,
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for embedder");

        let model_dir = config.source.resolve_dir(MODEL_FILES)?;
        let model =
            BertEncoder::load(&model_dir, &device).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            })?;
        let tokenizer = load_tokenizer_with_truncation(&model_dir, config.max_seq_len).map_err(
            |e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            },
        )?;

        let dim = model.hidden_size();
        info!(
            model = %config.source,
            dim,
            max_seq_len = config.max_seq_len,
            "Embedder loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
            dim,
        })
    }

    /// Shorthand for `Embedder::load(EmbedderConfig::stub())`.
    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(EmbedderConfig::stub())
    }

    /// Embeds a single text.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EmbedderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.embed_with_model(text, model, tokenizer, device),
            EmbedderBackend::Stub => Ok(self.embed_stub(text)),
        }
    }

    /// Embeds a batch of texts (output order matches input order).
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        // Sequential: batching would need padding-aware pooling.
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn embed_with_model(
        &self,
        text: &str,
        model: &BertEncoder,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        if encoding.get_ids().is_empty() {
            return Ok(vec![0.0; self.dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Generating embedding"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let pooled = model
            .forward(&input_ids, &type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Encoder forward pass failed: {}", e),
            })?;

        let mut embedding = pooled.squeeze(0)?.to_vec1::<f32>()?;
        l2_normalize(&mut embedding);
        Ok(embedding)
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dim];
        for term in content_terms(text) {
            let h = hash_to_u64(term.as_bytes());
            let bucket = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }
        l2_normalize(&mut embedding);
        embedding
    }

    /// Output vector dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    pub fn source(&self) -> &ModelSource {
        &self.config.source
    }
}
