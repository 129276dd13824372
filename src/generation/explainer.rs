use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::{debug, info, instrument, warn};

use crate::embedding::utils::content_term_set;

use super::config::{ExplainerBackend, ExplainerConfig};
use super::error::GenerationError;
use super::prompts::{SYSTEM_PROMPT, explanation_prompt, trim_reply};
use super::{Explain, ExplanationRequest};

const STUB_TERM_LIMIT: usize = 5;

/// Match explanations from a chat model.
pub struct LlmExplainer {
    client: Client,
    config: ExplainerConfig,
}

impl std::fmt::Debug for LlmExplainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmExplainer")
            .field("backend", &self.config.backend)
            .finish()
    }
}

impl LlmExplainer {
    pub fn new(config: ExplainerConfig) -> Result<Self, GenerationError> {
        config.validate()?;

        match &config.backend {
            ExplainerBackend::Disabled => {
                return Err(GenerationError::NotAvailable {
                    reason: "no explanation model configured".to_string(),
                });
            }
            ExplainerBackend::Stub => warn!("Explainer running in STUB mode (testing only)"),
            ExplainerBackend::Chat(model) => info!(model = %model, "Explainer configured"),
        }

        Ok(Self {
            client: Client::default(),
            config,
        })
    }

    pub fn stub() -> Result<Self, GenerationError> {
        Self::new(ExplainerConfig::stub())
    }

    pub fn config(&self) -> &ExplainerConfig {
        &self.config
    }

    async fn chat(&self, model: &str, request: &ExplanationRequest) -> Result<String, GenerationError> {
        let chat_req = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(explanation_prompt(request)),
        ]);
        let options = ChatOptions::default()
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);

        let response = self
            .client
            .exec_chat(model, chat_req, Some(&options))
            .await
            .map_err(|e| GenerationError::RequestFailed {
                reason: e.to_string(),
            })?;

        Ok(response.first_text().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl Explain for LlmExplainer {
    #[instrument(skip_all, fields(resume_id = request.resume_id, rank = request.rank))]
    async fn explain(&self, request: &ExplanationRequest) -> Result<String, GenerationError> {
        let reply = match &self.config.backend {
            ExplainerBackend::Chat(model) => self.chat(model, request).await?,
            ExplainerBackend::Stub => stub_explanation(request),
            ExplainerBackend::Disabled => {
                return Err(GenerationError::NotAvailable {
                    reason: "no explanation model configured".to_string(),
                });
            }
        };

        let explanation = trim_reply(&reply).ok_or(GenerationError::EmptyResponse)?;
        debug!(chars = explanation.chars().count(), "Explanation generated");
        Ok(explanation)
    }
}

/// Deterministic explanation from terms shared by requirements and resume.
fn stub_explanation(request: &ExplanationRequest) -> String {
    let resume_terms = content_term_set(&request.resume_excerpt);
    let mut shared: Vec<String> = content_term_set(&request.job_requirements)
        .into_iter()
        .filter(|term| resume_terms.contains(term))
        .collect();
    shared.sort();
    shared.truncate(STUB_TERM_LIMIT);

    if shared.is_empty() {
        format!(
            "{} shows little direct overlap with the stated requirements.",
            request.candidate_name
        )
    } else {
        format!(
            "{} matches the role on {}.",
            request.candidate_name,
            shared.join(", ")
        )
    }
}
