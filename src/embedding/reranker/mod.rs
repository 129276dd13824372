//! Cross-encoder reranker.
//!
//! [`Reranker::score`] returns the raw relevance logit for a (query, candidate) pair;
//! normalization into (0, 1) happens in [`crate::scoring`].

pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use config::{MAX_SEQ_LEN, RerankerConfig};
pub use error::RerankerError;

use candle_core::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::bert::BertClassifier;
use crate::embedding::device::select_device;
use crate::embedding::source::ModelSource;
use crate::embedding::utils::{content_term_set, load_tokenizer_with_truncation};

const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

enum RerankerBackend {
    Model {
        model: BertClassifier,
        tokenizer: Tokenizer,
        device: candle_core::Device,
    },
    Stub,
}

pub struct Reranker {
    backend: RerankerBackend,
    config: RerankerConfig,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("source", &self.config.source)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        match &config.source {
            ModelSource::Disabled => Err(RerankerError::NotAvailable {
                reason: "no reranker model configured".to_string(),
            }),
            ModelSource::Stub => {
                warn!("Reranker running in STUB mode (lexical overlap scores)");
                Ok(Self {
                    backend: RerankerBackend::Stub,
                    config,
                })
            }
            source => {
                let device = select_device()?;
                debug!(?device, "Selected compute device for reranker");

                let model_dir = source.resolve_dir(MODEL_FILES)?;
                info!(model_dir = %model_dir.display(), "Loading reranker model");

                let model = BertClassifier::load(&model_dir, &device).map_err(|e| {
                    RerankerError::ModelLoadFailed {
                        reason: format!("Failed to load BERT model: {}", e),
                    }
                })?;

                let tokenizer = load_tokenizer_with_truncation(&model_dir, config.max_seq_len)
                    .map_err(|e| RerankerError::ModelLoadFailed {
                        reason: format!("Failed to load tokenizer: {}", e),
                    })?;

                info!(model = %config.source, "Reranker model loaded successfully");

                Ok(Self {
                    backend: RerankerBackend::Model {
                        model,
                        tokenizer,
                        device,
                    },
                    config,
                })
            }
        }
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    /// Raw relevance logit for one pair (higher is more relevant).
    pub fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        debug!(
            query_len = query.len(),
            candidate_len = candidate.len(),
            "Scoring query-candidate pair"
        );

        let (model, tokenizer, device) = match &self.backend {
            RerankerBackend::Model {
                model,
                tokenizer,
                device,
            } => (model, tokenizer, device),
            RerankerBackend::Stub => return Ok(lexical_logit(query, candidate)),
        };

        let tokens =
            tokenizer
                .encode((query, candidate), true)
                .map_err(|e| RerankerError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let token_ids = Tensor::new(tokens.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(tokens.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), device)?.unsqueeze(0)?;

        let logits = model
            .forward(&token_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| RerankerError::InferenceFailed {
                reason: e.to_string(),
            })?;

        logits
            .flatten_all()?
            .to_vec1::<f32>()?
            .first()
            .copied()
            .ok_or_else(|| RerankerError::InferenceFailed {
                reason: "model returned no logits".to_string(),
            })
    }

    /// Scores every candidate and returns `(index, logit)` pairs, best first.
    pub fn rerank(
        &self,
        query: &str,
        candidates: &[&str],
    ) -> Result<Vec<(usize, f32)>, RerankerError> {
        debug!(
            query_len = query.len(),
            num_candidates = candidates.len(),
            "Reranking candidates"
        );

        let mut scored: Vec<(usize, f32)> = candidates
            .iter()
            .enumerate()
            .map(|(idx, candidate)| Ok((idx, self.score(query, candidate)?)))
            .collect::<Result<Vec<_>, RerankerError>>()?;

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        debug!(
            top_score = scored.first().map(|(_, s)| *s),
            "Reranking complete"
        );

        Ok(scored)
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.backend, RerankerBackend::Model { .. })
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }
}

/// Stub relevance: term recall and Jaccard overlap, spread onto a logit scale.
fn lexical_logit(query: &str, candidate: &str) -> f32 {
    let query_terms = content_term_set(query);
    let candidate_terms = content_term_set(candidate);

    if query_terms.is_empty() {
        return -4.0;
    }

    let matches = query_terms.intersection(&candidate_terms).count();
    let recall = matches as f32 / query_terms.len() as f32;
    let union = query_terms.union(&candidate_terms).count();
    let jaccard = if union > 0 {
        matches as f32 / union as f32
    } else {
        0.0
    };

    let base_score = 0.6 * recall + 0.4 * jaccard;
    8.0 * (base_score - 0.5)
}
