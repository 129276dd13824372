use serde::{Deserialize, Serialize};

use crate::constants::{RERANK_TEXT_CHARS, truncate_chars};
use crate::ingest::ResumeId;

/// Shortlisted resume waiting for a cross-encoder score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringCandidate {
    pub resume_id: ResumeId,
    pub embedding_score: f32,
    /// Resume text, bounded to the reranker's input slice.
    pub text: String,
}

impl ScoringCandidate {
    pub fn new(resume_id: ResumeId, embedding_score: f32, text: &str) -> Self {
        Self {
            resume_id,
            embedding_score,
            text: truncate_chars(text, RERANK_TEXT_CHARS).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Candidate annotated with its cross-encoder score.
pub struct RerankedCandidate {
    pub resume_id: ResumeId,
    /// Score from the retrieval stage.
    pub embedding_score: f32,
    /// Raw cross-encoder logit.
    pub logit: f32,
    /// `sigmoid(logit)`, in (0, 1).
    pub rerank_score: f32,
}
