//! End-to-end ranking: ingest, index, retrieve, rerank, summarize, explain.
//!
//! A [`RankingPipeline`] is built once per process and shared by `Arc`. Its models load
//! lazily on first use; optional stages whose model is unavailable degrade to
//! deterministic fallbacks and report it in [`PipelineDiagnostics`]. Only a missing
//! index or an unusable embedder fails a run.

pub mod error;
pub mod job;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::PipelineError;
pub use job::RankingJob;
pub use types::{
    CandidateScore, JobQuery, PipelineDiagnostics, PipelineStage, RankOptions, RankingResult,
    RankingStatus, StageStatus, StageTiming,
};

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::{Config, ConfigError};
use crate::embedding::{Embedder, LazyModel};
use crate::generation::{
    Explain, ExplanationRequest, LlmExplainer, Summarize, Summarizer, excerpt_summary,
    template_explanation,
};
use crate::index::VectorIndex;
use crate::ingest::{Chunker, Ingestor, ResumeDocument, ResumeId, ResumeRecord};
use crate::retrieval::{RetrievedCandidate, Retriever};
use crate::scoring::{CrossEncoderScorer, ScoringCandidate};
use crate::vectordb::VectorDbClient;

/// Shortlisted candidate between the rerank and generation stages.
struct Finalist<'a> {
    doc: &'a ResumeDocument,
    embedding_score: f32,
    rerank_score: Option<f32>,
}

impl Finalist<'_> {
    fn match_percentage(&self) -> f32 {
        let score = self.rerank_score.unwrap_or(self.embedding_score);
        ((score * 1000.0).round() / 10.0).clamp(0.0, 100.0)
    }
}

struct StageClock {
    started: Instant,
    last: Instant,
    timings: Vec<StageTiming>,
}

impl StageClock {
    fn start() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last: now,
            timings: Vec::new(),
        }
    }

    fn mark(&mut self, stage: PipelineStage) {
        let now = Instant::now();
        self.timings.push(StageTiming {
            stage,
            elapsed_ms: now.duration_since(self.last).as_millis() as u64,
        });
        self.last = now;
    }

    fn total_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

pub struct RankingPipeline<C> {
    config: Config,
    ingestor: Ingestor,
    index: Arc<VectorIndex<C>>,
    retriever: Retriever<C>,
    scorer: Arc<LazyModel<CrossEncoderScorer>>,
    summarizer: Arc<LazyModel<dyn Summarize>>,
    explainer: Arc<LazyModel<dyn Explain>>,
}

impl<C> std::fmt::Debug for RankingPipeline<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingPipeline")
            .field("collection", &self.config.collection)
            .field("scorer", &self.scorer)
            .field("summarizer", &self.summarizer)
            .field("explainer", &self.explainer)
            .finish()
    }
}

impl<C: VectorDbClient> RankingPipeline<C> {
    /// Builds the pipeline over `client`. Models are not loaded until first use.
    pub fn new(config: Config, client: Arc<C>) -> Result<Self, PipelineError> {
        config.validate()?;
        let ingestor = config.ingestor()?;

        let embedder_config = config.embedder_config();
        let embedder: Arc<LazyModel<Embedder>> = Arc::new(LazyModel::new("embedder", move || {
            Embedder::load(embedder_config).map(Arc::new)
        }));

        let reranker_config = config.reranker_config();
        let scorer = if reranker_config.source.is_disabled() {
            LazyModel::unavailable("reranker", "no reranker model configured")
        } else {
            LazyModel::new("reranker", move || {
                CrossEncoderScorer::new(reranker_config).map(Arc::new)
            })
        };

        let summarizer_config = config.summarizer_config();
        let summarizer: LazyModel<dyn Summarize> = LazyModel::new("summarizer", move || {
            Summarizer::load(summarizer_config).map(|s| Arc::new(s) as Arc<dyn Summarize>)
        });

        let explainer_config = config.explainer_config();
        let explainer: LazyModel<dyn Explain> = LazyModel::new("explainer", move || {
            LlmExplainer::new(explainer_config).map(|e| Arc::new(e) as Arc<dyn Explain>)
        });

        let index = Arc::new(VectorIndex::new(client, embedder, config.collection.clone()));
        info!(
            collection = %config.collection,
            embedding_model = %config.embedding_model,
            reranker_model = %config.reranker_model,
            top_k = config.top_k,
            top_n = config.top_n,
            "Ranking pipeline ready"
        );

        Ok(Self {
            retriever: Retriever::new(Arc::clone(&index)),
            config,
            ingestor,
            index,
            scorer: Arc::new(scorer),
            summarizer: Arc::new(summarizer),
            explainer: Arc::new(explainer),
        })
    }

    pub fn with_scorer(mut self, scorer: LazyModel<CrossEncoderScorer>) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    pub fn with_summarizer(mut self, summarizer: LazyModel<dyn Summarize>) -> Self {
        self.summarizer = Arc::new(summarizer);
        self
    }

    pub fn with_explainer(mut self, explainer: LazyModel<dyn Explain>) -> Self {
        self.explainer = Arc::new(explainer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &Arc<VectorIndex<C>> {
        &self.index
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    /// Ingestor for one run: the configured one unless `options` changes chunking.
    fn run_ingestor(&self, options: &RankOptions) -> Result<Cow<'_, Ingestor>, PipelineError> {
        options.validate()?;
        let (size, overlap) = (self.config.chunk_size, self.config.chunk_overlap);
        if !options.overrides_chunking(size, overlap) {
            return Ok(Cow::Borrowed(&self.ingestor));
        }

        let size = options.chunk_size.unwrap_or(size);
        let overlap = options.chunk_overlap.unwrap_or(overlap);
        let chunker = Chunker::new(size, overlap)
            .map_err(|_| ConfigError::InvalidChunking { size, overlap })?;
        debug!(size, overlap, "Using per-run chunking");
        Ok(Cow::Owned(self.ingestor.with_chunker(chunker)))
    }

    /// Write path: extracts fields, chunks and merges new chunks into the index.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn ingest_and_index(
        &self,
        records: &[ResumeRecord],
        options: RankOptions,
    ) -> Result<Vec<ResumeDocument>, PipelineError> {
        let documents = self.run_ingestor(&options)?.ingest_all(records)?;
        debug!(stage = %PipelineStage::Ingested, documents = documents.len(), "Stage complete");

        let written = self.index.index(&documents).await?;
        debug!(stage = %PipelineStage::Indexed, chunks = written, "Stage complete");
        Ok(documents)
    }

    /// Ingests, indexes and ranks `records` against `query`.
    pub async fn rank(
        &self,
        query: &str,
        records: &[ResumeRecord],
        options: RankOptions,
    ) -> Result<RankingResult, PipelineError> {
        let documents = self.ingest_and_index(records, options).await?;
        self.rank_documents(query, query, &documents, options).await
    }

    /// Like [`rank`](Self::rank), querying with [`JobQuery::to_query_string`] and
    /// explaining against the job's requirements.
    pub async fn rank_job(
        &self,
        job: &JobQuery,
        records: &[ResumeRecord],
        options: RankOptions,
    ) -> Result<RankingResult, PipelineError> {
        let documents = self.ingest_and_index(records, options).await?;
        self.rank_documents(&job.to_query_string(), &job.requirements_text(), &documents, options)
            .await
    }

    /// Ranks already-indexed documents.
    pub async fn rank_documents(
        &self,
        query: &str,
        requirements: &str,
        eligible: &[ResumeDocument],
        options: RankOptions,
    ) -> Result<RankingResult, PipelineError> {
        self.run(Uuid::new_v4(), query, requirements, eligible, options)
            .await
    }

    #[instrument(skip(self, query, requirements, eligible), fields(eligible = eligible.len()))]
    async fn run(
        &self,
        run_id: Uuid,
        query: &str,
        requirements: &str,
        eligible: &[ResumeDocument],
        options: RankOptions,
    ) -> Result<RankingResult, PipelineError> {
        options.validate()?;
        if eligible.is_empty() {
            return Err(PipelineError::NoResumes);
        }

        let mut clock = StageClock::start();
        let (top_k, top_n) = options.resolve(self.config.top_k, self.config.top_n, eligible.len());
        let docs: HashMap<ResumeId, &ResumeDocument> =
            eligible.iter().map(|doc| (doc.id, doc)).collect();

        let mut retrieved = self.retriever.retrieve(query, eligible, top_k).await?;
        let unmatched = retrieved.iter().filter(|c| !c.matched).count();
        retrieved.truncate(top_k);
        clock.mark(PipelineStage::Retrieved);
        info!(stage = %PipelineStage::Retrieved, top_k, retrieved = retrieved.len(), unmatched, "Stage complete");

        let (shortlist, reranker) = self.rerank_stage(query, &retrieved, &docs).await;
        let finalists: Vec<Finalist<'_>> = shortlist
            .into_iter()
            .take(top_n)
            .filter_map(|(resume_id, embedding_score, rerank_score)| {
                docs.get(&resume_id).map(|&doc| Finalist {
                    doc,
                    embedding_score,
                    rerank_score,
                })
            })
            .collect();
        clock.mark(PipelineStage::Reranked);
        info!(stage = %PipelineStage::Reranked, finalists = finalists.len(), "Stage complete");

        let (summaries, summarizer, summary_fallbacks) = self.summary_stage(&finalists).await;
        clock.mark(PipelineStage::Summarized);

        let (explanations, explainer, explanation_fallbacks) =
            self.explanation_stage(requirements, &finalists).await;
        clock.mark(PipelineStage::Explained);

        let ranked: Vec<CandidateScore> = finalists
            .iter()
            .zip(summaries)
            .zip(explanations)
            .enumerate()
            .map(|(i, ((finalist, summary), explanation))| CandidateScore {
                resume_id: finalist.doc.id,
                candidate_name: finalist.doc.candidate_name().to_string(),
                embedding_score: finalist.embedding_score,
                rerank_score: finalist.rerank_score,
                match_percentage: finalist.match_percentage(),
                skills: finalist.doc.skills().to_vec(),
                summary,
                explanation,
                rank: i + 1,
            })
            .collect();
        clock.mark(PipelineStage::Complete);

        let diagnostics = PipelineDiagnostics {
            run_id,
            top_k,
            top_n,
            eligible: eligible.len(),
            retrieved: retrieved.len(),
            finalists: ranked.len(),
            unmatched,
            reranker,
            summarizer,
            explainer,
            item_fallbacks: summary_fallbacks + explanation_fallbacks,
            elapsed_ms: clock.total_ms(),
            stages: clock.timings,
        };

        info!(
            stage = %PipelineStage::Complete,
            ranked = ranked.len(),
            elapsed_ms = diagnostics.elapsed_ms,
            "Ranking run complete"
        );
        Ok(RankingResult {
            ranked,
            diagnostics,
        })
    }

    /// Returns `(resume_id, embedding_score, rerank_score)` in final order.
    async fn rerank_stage(
        &self,
        query: &str,
        retrieved: &[RetrievedCandidate],
        docs: &HashMap<ResumeId, &ResumeDocument>,
    ) -> (Vec<(ResumeId, f32, Option<f32>)>, StageStatus) {
        let embedding_order = || {
            retrieved
                .iter()
                .map(|c| (c.resume_id, c.score, None))
                .collect::<Vec<_>>()
        };

        let Some(scorer) = self.scorer.load().await else {
            let reason = self
                .scorer
                .unavailable_reason()
                .unwrap_or_else(|| "reranker not loaded".to_string());
            warn!(reason = %reason, "Reranker unavailable, keeping embedding order");
            return (embedding_order(), StageStatus::Skipped { reason });
        };

        let candidates: Vec<ScoringCandidate> = retrieved
            .iter()
            .filter_map(|c| {
                docs.get(&c.resume_id)
                    .map(|doc| ScoringCandidate::new(c.resume_id, c.score, &doc.text))
            })
            .collect();

        match scorer.rerank_blocking(query.to_string(), candidates).await {
            Ok(reranked) => (
                reranked
                    .into_iter()
                    .map(|r| (r.resume_id, r.embedding_score, Some(r.rerank_score)))
                    .collect(),
                StageStatus::Active,
            ),
            Err(e) => {
                warn!(error = %e, "Rerank failed, keeping embedding order");
                (
                    embedding_order(),
                    StageStatus::Degraded {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    /// One summary per finalist, plus the stage status and the fallback count.
    async fn summary_stage(&self, finalists: &[Finalist<'_>]) -> (Vec<String>, StageStatus, usize) {
        let excerpts = || -> Vec<String> {
            finalists
                .iter()
                .map(|f| excerpt_summary(&f.doc.text))
                .collect()
        };
        if finalists.is_empty() {
            return (Vec::new(), StageStatus::Active, 0);
        }

        let Some(summarizer) = self.summarizer.load().await else {
            let reason = self
                .summarizer
                .unavailable_reason()
                .unwrap_or_else(|| "summarizer not loaded".to_string());
            warn!(reason = %reason, "Summarizer unavailable, using excerpts");
            return (excerpts(), StageStatus::Skipped { reason }, 0);
        };

        let texts: Vec<String> = finalists.iter().map(|f| f.doc.text.clone()).collect();
        let outcomes = tokio::task::spawn_blocking(move || {
            texts
                .iter()
                .map(|text| summarizer.summarize(text))
                .collect::<Vec<_>>()
        })
        .await;

        let outcomes = match outcomes {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!(error = %e, "Summary task failed, using excerpts");
                return (
                    excerpts(),
                    StageStatus::Degraded {
                        reason: e.to_string(),
                    },
                    finalists.len(),
                );
            }
        };

        let mut fallbacks = 0;
        let mut last_error = None;
        let summaries: Vec<String> = finalists
            .iter()
            .zip(outcomes)
            .map(|(finalist, outcome)| match outcome {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(resume_id = finalist.doc.id, error = %e, "Summary failed, using excerpt");
                    fallbacks += 1;
                    last_error = Some(e.to_string());
                    excerpt_summary(&finalist.doc.text)
                }
            })
            .collect();

        (summaries, item_status(last_error, fallbacks), fallbacks)
    }

    /// One explanation per finalist, plus the stage status and the fallback count.
    async fn explanation_stage(
        &self,
        requirements: &str,
        finalists: &[Finalist<'_>],
    ) -> (Vec<String>, StageStatus, usize) {
        let templates = || -> Vec<String> {
            finalists
                .iter()
                .enumerate()
                .map(|(i, f)| template_explanation(i + 1, f.match_percentage(), f.doc.skills()))
                .collect()
        };
        if finalists.is_empty() {
            return (Vec::new(), StageStatus::Active, 0);
        }

        let Some(explainer) = self.explainer.load().await else {
            let reason = self
                .explainer
                .unavailable_reason()
                .unwrap_or_else(|| "explainer not loaded".to_string());
            warn!(reason = %reason, "Explainer unavailable, using templates");
            return (templates(), StageStatus::Skipped { reason }, 0);
        };

        let requests: Vec<ExplanationRequest> = finalists
            .iter()
            .enumerate()
            .map(|(i, f)| {
                ExplanationRequest::new(
                    f.doc.id,
                    i + 1,
                    f.match_percentage(),
                    f.doc.candidate_name(),
                    requirements,
                    &f.doc.text,
                    f.doc.skills(),
                )
            })
            .collect();
        let outcomes = join_all(requests.iter().map(|req| explainer.explain(req))).await;

        let mut fallbacks = 0;
        let mut last_error = None;
        let explanations: Vec<String> = requests
            .iter()
            .zip(outcomes)
            .zip(finalists)
            .map(|((req, outcome), finalist)| match outcome {
                Ok(explanation) => explanation,
                Err(e) => {
                    warn!(resume_id = req.resume_id, error = %e, "Explanation failed, using template");
                    fallbacks += 1;
                    last_error = Some(e.to_string());
                    template_explanation(req.rank, req.match_percentage, finalist.doc.skills())
                }
            })
            .collect();

        (explanations, item_status(last_error, fallbacks), fallbacks)
    }
}

impl<C: VectorDbClient + 'static> RankingPipeline<C> {
    /// Starts a run on a tokio task and returns its handle immediately.
    pub fn spawn(
        self: &Arc<Self>,
        query: String,
        records: Vec<ResumeRecord>,
        options: RankOptions,
    ) -> RankingJob {
        self.spawn_run(query.clone(), query, records, options)
    }

    /// Background variant of [`rank_job`](Self::rank_job).
    pub fn spawn_job(
        self: &Arc<Self>,
        job: &JobQuery,
        records: Vec<ResumeRecord>,
        options: RankOptions,
    ) -> RankingJob {
        self.spawn_run(job.to_query_string(), job.requirements_text(), records, options)
    }

    fn spawn_run(
        self: &Arc<Self>,
        query: String,
        requirements: String,
        records: Vec<ResumeRecord>,
        options: RankOptions,
    ) -> RankingJob {
        let run_id = Uuid::new_v4();
        let status = Arc::new(RwLock::new(RankingStatus::Analyzing));
        let pipeline = Arc::clone(self);
        let task_status = Arc::clone(&status);

        let handle = tokio::spawn(async move {
            let outcome: Result<RankingResult, PipelineError> = async {
                let documents = pipeline.ingest_and_index(&records, options).await?;
                pipeline
                    .run(run_id, &query, &requirements, &documents, options)
                    .await
            }
            .await;
            job::record_outcome(&task_status, &outcome);
            outcome
        });

        info!(run_id = %run_id, "Ranking run started");
        RankingJob::new(run_id, status, handle)
    }
}

fn item_status(last_error: Option<String>, fallbacks: usize) -> StageStatus {
    match last_error {
        None => StageStatus::Active,
        Some(reason) => StageStatus::Degraded {
            reason: format!("{fallbacks} item(s) fell back: {reason}"),
        },
    }
}
