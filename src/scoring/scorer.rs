use std::sync::Arc;

use tracing::{debug, instrument};

use crate::embedding::{Reranker, RerankerConfig};

use super::error::ScoringError;
use super::types::{RerankedCandidate, ScoringCandidate};

/// Logistic function, kept strictly inside (0, 1).
pub fn sigmoid(x: f32) -> f32 {
    let p = 1.0 / (1.0 + (-x).exp());
    p.clamp(f32::EPSILON, 1.0 - f32::EPSILON)
}

pub struct CrossEncoderScorer {
    reranker: Reranker,
}

impl std::fmt::Debug for CrossEncoderScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoderScorer")
            .field("reranker", &self.reranker)
            .finish()
    }
}

impl CrossEncoderScorer {
    pub fn new(config: RerankerConfig) -> Result<Self, ScoringError> {
        let reranker = Reranker::load(config)?;
        Ok(Self { reranker })
    }

    pub fn stub() -> Result<Self, ScoringError> {
        Ok(Self {
            reranker: Reranker::stub()?,
        })
    }

    pub fn from_reranker(reranker: Reranker) -> Self {
        Self { reranker }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.reranker.is_model_loaded()
    }

    pub fn reranker(&self) -> &Reranker {
        &self.reranker
    }

    /// Relevance probability for one pair.
    pub fn score(&self, query: &str, candidate_text: &str) -> Result<f32, ScoringError> {
        Ok(sigmoid(self.reranker.score(query, candidate_text)?))
    }

    /// Scores every candidate and sorts by rerank score, best first. Ties keep the
    /// incoming (embedding) order.
    pub fn rerank(
        &self,
        query: &str,
        candidates: Vec<ScoringCandidate>,
    ) -> Result<Vec<RerankedCandidate>, ScoringError> {
        debug!(
            query_len = query.len(),
            num_candidates = candidates.len(),
            "Starting cross-encoder rerank"
        );

        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        let ranked = self.reranker.rerank(query, &texts)?;

        let scored: Vec<RerankedCandidate> = ranked
            .into_iter()
            .map(|(idx, logit)| {
                let candidate = &candidates[idx];
                RerankedCandidate {
                    resume_id: candidate.resume_id,
                    embedding_score: candidate.embedding_score,
                    logit,
                    rerank_score: sigmoid(logit),
                }
            })
            .collect();

        debug!(
            top_score = scored.first().map(|c| c.rerank_score),
            "Rerank complete"
        );
        Ok(scored)
    }

    /// [`rerank`](Self::rerank) on the blocking pool.
    #[instrument(skip_all, fields(num_candidates = candidates.len()))]
    pub async fn rerank_blocking(
        self: &Arc<Self>,
        query: String,
        candidates: Vec<ScoringCandidate>,
    ) -> Result<Vec<RerankedCandidate>, ScoringError> {
        let this = Arc::clone(self);
        tokio::task::spawn_blocking(move || this.rerank(&query, candidates))
            .await
            .map_err(|e| ScoringError::TaskFailed {
                reason: e.to_string(),
            })?
    }
}
