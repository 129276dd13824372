use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::t5::{self, T5ForConditionalGeneration};
use parking_lot::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::constants::{SUMMARY_INPUT_CHARS, truncate_chars};
use crate::embedding::device::select_device;
use crate::embedding::utils::load_tokenizer_with_truncation;

use super::Summarize;
use super::config::SummarizerConfig;
use super::error::GenerationError;

const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];
const TASK_PREFIX: &str = "summarize: ";
const STUB_SENTENCES: usize = 2;

struct T5Model {
    model: T5ForConditionalGeneration,
    config: t5::Config,
}

enum SummarizerBackend {
    Model {
        // T5 decoding mutates the kv cache.
        model: Mutex<T5Model>,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Abstractive resume synopsis (T5-family seq2seq, greedy decoding).
pub struct Summarizer {
    backend: SummarizerBackend,
    config: SummarizerConfig,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field(
                "backend",
                &match &self.backend {
                    SummarizerBackend::Model { device, .. } => format!("Model({:?})", device),
                    SummarizerBackend::Stub => "Stub".to_string(),
                },
            )
            .field("source", &self.config.source)
            .finish()
    }
}

impl Summarizer {
    pub fn load(config: SummarizerConfig) -> Result<Self, GenerationError> {
        config.validate()?;

        if config.source.is_disabled() {
            return Err(GenerationError::NotAvailable {
                reason: "no summarizer model configured".to_string(),
            });
        }

        if config.source.is_stub() {
            warn!("Summarizer running in STUB mode (testing only)");
            return Ok(Self {
                backend: SummarizerBackend::Stub,
                config,
            });
        }

        let device = select_device().map_err(|e| GenerationError::ModelLoadFailed {
            reason: e.to_string(),
        })?;
        let model_dir = config.source.resolve_dir(MODEL_FILES)?;
        let model = load_t5(&model_dir, &device)?;
        let tokenizer = load_tokenizer_with_truncation(&model_dir, config.max_input_tokens)
            .map_err(|e| GenerationError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            })?;

        info!(model = %config.source, ?device, "Summarizer loaded");

        Ok(Self {
            backend: SummarizerBackend::Model {
                model: Mutex::new(model),
                tokenizer,
                device,
            },
            config,
        })
    }

    pub fn stub() -> Result<Self, GenerationError> {
        Self::load(SummarizerConfig::stub())
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, SummarizerBackend::Stub)
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    fn generate(
        &self,
        text: &str,
        model: &Mutex<T5Model>,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<String, GenerationError> {
        let prompt = format!("{TASK_PREFIX}{text}");
        let encoding =
            tokenizer
                .encode(prompt, true)
                .map_err(|e| GenerationError::TokenizationFailed {
                    reason: e.to_string(),
                })?;
        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;

        let mut guard = model.lock();
        let T5Model { model, config } = &mut *guard;
        model.clear_kv_cache();

        let encoder_output = model.encode(&input_ids)?;
        let start_token = config
            .decoder_start_token_id
            .unwrap_or(config.pad_token_id) as u32;
        let mut output_ids: Vec<u32> = vec![start_token];
        let mut logits_processor = LogitsProcessor::new(self.config.seed, None, None);

        for step in 0..self.config.max_new_tokens {
            let decoder_ids = match output_ids.last() {
                Some(&last) if step > 0 && config.use_cache => {
                    Tensor::new(&[last], device)?.unsqueeze(0)?
                }
                _ => Tensor::new(output_ids.as_slice(), device)?.unsqueeze(0)?,
            };
            let logits = model.decode(&decoder_ids, &encoder_output)?.squeeze(0)?;
            let next = logits_processor.sample(&logits)?;
            if next as usize == config.eos_token_id {
                break;
            }
            output_ids.push(next);
        }
        model.clear_kv_cache();
        drop(guard);

        let summary = tokenizer
            .decode(&output_ids[1..], true)
            .map_err(|e| GenerationError::TokenizationFailed {
                reason: e.to_string(),
            })?;

        debug!(
            input_tokens = encoding.get_ids().len(),
            output_tokens = output_ids.len() - 1,
            "Summary generated"
        );
        Ok(summary.trim().to_string())
    }
}

impl Summarize for Summarizer {
    fn summarize(&self, text: &str) -> Result<String, GenerationError> {
        let input = truncate_chars(text.trim(), SUMMARY_INPUT_CHARS);
        if input.is_empty() {
            return Err(GenerationError::InferenceFailed {
                reason: "nothing to summarize".to_string(),
            });
        }

        let summary = match &self.backend {
            SummarizerBackend::Model {
                model,
                tokenizer,
                device,
            } => self.generate(input, model, tokenizer, device)?,
            SummarizerBackend::Stub => lead_sentences(input, STUB_SENTENCES),
        };

        if summary.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(summary)
    }
}

fn load_t5(model_dir: &Path, device: &Device) -> Result<T5Model, GenerationError> {
    let config_content = std::fs::read_to_string(model_dir.join("config.json")).map_err(|e| {
        GenerationError::ModelLoadFailed {
            reason: format!("Failed to read config: {}", e),
        }
    })?;
    let config: t5::Config =
        serde_json::from_str(&config_content).map_err(|e| GenerationError::ModelLoadFailed {
            reason: format!("Failed to parse config: {}", e),
        })?;

    let weights_path = model_dir.join("model.safetensors");
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };
    let model =
        T5ForConditionalGeneration::load(vb, &config).map_err(|e| GenerationError::ModelLoadFailed {
            reason: format!("Failed to load T5: {}", e),
        })?;

    Ok(T5Model { model, config })
}

/// First `n` sentences with whitespace collapsed.
fn lead_sentences(text: &str, n: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut end = flat.len();
    let mut seen = 0;
    for (idx, ch) in flat.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            seen += 1;
            if seen == n {
                end = idx + ch.len_utf8();
                break;
            }
        }
    }
    flat[..end].trim().to_string()
}
