//! Synopsis and explanation generation for the final shortlist.
//!
//! Both stages sit behind small traits ([`Summarize`], [`Explain`]) so the pipeline can
//! swap in stubs, and both have deterministic fallbacks in [`fallback`].

pub mod config;
pub mod error;
pub mod explainer;
pub mod fallback;
pub mod prompts;
pub mod summarizer;

#[cfg(test)]
mod tests;

pub use config::{ExplainerBackend, ExplainerConfig, SummarizerConfig};
pub use error::GenerationError;
pub use explainer::LlmExplainer;
pub use fallback::{excerpt_summary, template_explanation};
pub use summarizer::Summarizer;

use async_trait::async_trait;

use crate::constants::{EXPLANATION_EXCERPT_CHARS, EXPLANATION_REQUIREMENTS_CHARS, truncate_chars};
use crate::ingest::ResumeId;

/// Produces a short synopsis of a resume. Called from blocking context.
pub trait Summarize: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String, GenerationError>;
}

/// Explains why a candidate matches the job.
#[async_trait]
pub trait Explain: Send + Sync {
    async fn explain(&self, request: &ExplanationRequest) -> Result<String, GenerationError>;
}

/// Inputs for one explanation, already bounded to prompt size.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationRequest {
    pub resume_id: ResumeId,
    pub rank: usize,
    pub match_percentage: f32,
    pub candidate_name: String,
    pub job_requirements: String,
    pub resume_excerpt: String,
    pub skills: Vec<String>,
}

impl ExplanationRequest {
    pub fn new(
        resume_id: ResumeId,
        rank: usize,
        match_percentage: f32,
        candidate_name: &str,
        job_requirements: &str,
        resume_text: &str,
        skills: &[String],
    ) -> Self {
        Self {
            resume_id,
            rank,
            match_percentage,
            candidate_name: candidate_name.to_string(),
            job_requirements: truncate_chars(job_requirements.trim(), EXPLANATION_REQUIREMENTS_CHARS)
                .to_string(),
            resume_excerpt: truncate_chars(resume_text.trim(), EXPLANATION_EXCERPT_CHARS).to_string(),
            skills: skills.to_vec(),
        }
    }
}
