//! Semantic retrieval: chunk hits aggregated into one score per eligible resume.

pub mod matching;

#[cfg(test)]
mod tests;

pub use matching::{ContentMatcher, normalize_text};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::constants::{CHUNK_FETCH_MULTIPLIER, TOP_CHUNKS_PER_RESUME, UNMATCHED_EMBEDDING_SCORE};
use crate::index::{ChunkHit, IndexResult, VectorIndex};
use crate::ingest::{ResumeDocument, ResumeId};
use crate::vectordb::VectorDbClient;

/// Embedding-stage result for one resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedCandidate {
    pub resume_id: ResumeId,
    /// Mean of the best chunk similarities, in [0, 1].
    pub score: f32,
    /// `false` when no chunk hit resolved to this resume.
    pub matched: bool,
    pub chunk_hits: usize,
}

pub struct Retriever<C> {
    index: Arc<VectorIndex<C>>,
}

impl<C: VectorDbClient> Retriever<C> {
    pub fn new(index: Arc<VectorIndex<C>>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<VectorIndex<C>> {
        &self.index
    }

    /// Scores every eligible resume against `query`, best first. The list is not
    /// truncated; `top_k` only sizes the chunk fetch.
    #[instrument(skip(self, query, eligible), fields(eligible = eligible.len(), top_k))]
    pub async fn retrieve(
        &self,
        query: &str,
        eligible: &[ResumeDocument],
        top_k: usize,
    ) -> IndexResult<Vec<RetrievedCandidate>> {
        if eligible.is_empty() {
            return Ok(Vec::new());
        }

        let fetch = top_k.max(eligible.len()) * CHUNK_FETCH_MULTIPLIER;
        let hits = self.index.search(query, fetch).await?;
        let candidates = aggregate(&hits, eligible);

        let unmatched = candidates.iter().filter(|c| !c.matched).count();
        if unmatched > 0 {
            warn!(
                unmatched,
                eligible = eligible.len(),
                "Resumes without aligned chunks get the default embedding score"
            );
        }
        debug!(hits = hits.len(), candidates = candidates.len(), "Retrieval complete");
        Ok(candidates)
    }
}

/// Groups chunk hits by eligible resume. Hits carrying a resume id resolve by id; hits
/// without one go through [`ContentMatcher`]. Hits for other resumes are ignored.
pub fn aggregate(hits: &[ChunkHit], eligible: &[ResumeDocument]) -> Vec<RetrievedCandidate> {
    let eligible_ids: HashSet<ResumeId> = eligible.iter().map(|doc| doc.id).collect();
    let mut matcher: Option<ContentMatcher> = None;
    let mut similarities: HashMap<ResumeId, Vec<f32>> = HashMap::new();

    for hit in hits {
        let resolved = match hit.resume_id() {
            Some(id) => eligible_ids.contains(&id).then_some(id),
            None => matcher
                .get_or_insert_with(|| ContentMatcher::new(eligible))
                .resolve(hit.text()),
        };
        if let Some(id) = resolved {
            similarities
                .entry(id)
                .or_default()
                .push(hit.similarity.clamp(0.0, 1.0));
        }
    }

    let mut seen = HashSet::with_capacity(eligible.len());
    let mut candidates: Vec<RetrievedCandidate> = eligible
        .iter()
        .filter(|doc| seen.insert(doc.id))
        .map(|doc| match similarities.get_mut(&doc.id) {
            Some(scores) => {
                let chunk_hits = scores.len();
                RetrievedCandidate {
                    resume_id: doc.id,
                    score: top_mean(scores, TOP_CHUNKS_PER_RESUME),
                    matched: true,
                    chunk_hits,
                }
            }
            None => RetrievedCandidate {
                resume_id: doc.id,
                score: UNMATCHED_EMBEDDING_SCORE,
                matched: false,
                chunk_hits: 0,
            },
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.matched.cmp(&a.matched))
    });
    candidates
}

fn top_mean(scores: &mut [f32], n: usize) -> f32 {
    scores.sort_by(|a, b| b.total_cmp(a));
    let top = &scores[..scores.len().min(n)];
    if top.is_empty() {
        return UNMATCHED_EMBEDDING_SCORE;
    }
    top.iter().sum::<f32>() / top.len() as f32
}
