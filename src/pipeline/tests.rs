use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use super::*;
use crate::generation::GenerationError;
use crate::vectordb::MemoryVectorDb;

struct FailingSummarizer;

impl Summarize for FailingSummarizer {
    fn summarize(&self, _text: &str) -> Result<String, GenerationError> {
        Err(GenerationError::InferenceFailed {
            reason: "decoder exploded".to_string(),
        })
    }
}

struct FailingExplainer;

#[async_trait]
impl Explain for FailingExplainer {
    async fn explain(&self, _request: &ExplanationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::EmptyResponse)
    }
}

/// Never finishes, so runs using it can only be cancelled or time out.
struct StalledExplainer;

#[async_trait]
impl Explain for StalledExplainer {
    async fn explain(&self, _request: &ExplanationRequest) -> Result<String, GenerationError> {
        std::future::pending::<()>().await;
        Ok(String::new())
    }
}

fn stub_pipeline() -> RankingPipeline<MemoryVectorDb> {
    RankingPipeline::new(Config::stub(), Arc::new(MemoryVectorDb::new())).unwrap()
}

fn records() -> Vec<ResumeRecord> {
    vec![
        ResumeRecord::new(
            1,
            "Jane Doe\njane@example.com\nSenior Python developer. Django, PostgreSQL and AWS for 8 years.",
        ),
        ResumeRecord::new(
            2,
            "John Smith\nRegistered nurse with pediatric patient care experience.",
        ),
        ResumeRecord::new(
            3,
            "Alex Kim\nBackend engineer. Python, Docker and Kubernetes on AWS.",
        ),
        ResumeRecord::new(
            4,
            "Maria Garcia\nAccountant. Bookkeeping, payroll and tax filings.",
        ),
    ]
}

const QUERY: &str = "Python backend developer with Django and AWS";

#[test]
fn test_rank_options_resolve_clamps() {
    assert_eq!(RankOptions::default().resolve(50, 5, 60), (50, 5));
    assert_eq!(RankOptions::default().resolve(50, 5, 3), (3, 3));
    assert_eq!(RankOptions::new(10, 20).resolve(50, 5, 100), (10, 10));
    assert_eq!(
        RankOptions {
            top_n: Some(2),
            ..RankOptions::default()
        }
        .resolve(50, 5, 8),
        (8, 2)
    );
}

#[test]
fn test_job_query_string() {
    let job = JobQuery::new("Backend Engineer", "Build APIs.")
        .with_requirements(["Python", "AWS"]);
    assert_eq!(
        job.to_query_string(),
        "Backend Engineer\nBuild APIs.\nRequirements:\nPython\nAWS"
    );
    assert_eq!(job.requirements_text(), "Python\nAWS");

    let bare = JobQuery::new("Nurse", "Care for patients.");
    assert_eq!(bare.to_query_string(), "Nurse\nCare for patients.\nRequirements:");
    assert_eq!(bare.requirements_text(), "Care for patients.");
}

#[test]
fn test_match_percentage_rounds_and_clamps() {
    let doc = Ingestor::default().ingest(&ResumeRecord::new(1, "text"));
    let finalist = |embedding_score, rerank_score| Finalist {
        doc: &doc,
        embedding_score,
        rerank_score,
    };

    assert_eq!(finalist(0.2, Some(0.73456)).match_percentage(), 73.5);
    assert_eq!(finalist(0.4, None).match_percentage(), 40.0);
    assert_eq!(finalist(1.2, None).match_percentage(), 100.0);
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = Config {
        top_k: 0,
        ..Config::stub()
    };
    let err = RankingPipeline::new(config, Arc::new(MemoryVectorDb::new())).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[tokio::test]
async fn test_rank_produces_ordered_shortlist() {
    let pipeline = stub_pipeline();
    let result = pipeline
        .rank(QUERY, &records(), RankOptions::new(4, 2))
        .await
        .unwrap();

    assert_eq!(result.ranked.len(), 2);
    let ranks: Vec<usize> = result.ranked.iter().map(|c| c.rank).collect();
    assert_eq!(ranks, vec![1, 2]);
    assert!(result.ranked[0].match_percentage >= result.ranked[1].match_percentage);

    for candidate in &result.ranked {
        assert!(candidate.rerank_score.is_some());
        assert!(!candidate.summary.is_empty());
        assert!(!candidate.explanation.is_empty());
        assert!((0.0..=100.0).contains(&candidate.match_percentage));
    }

    let diagnostics = &result.diagnostics;
    assert_eq!(diagnostics.eligible, 4);
    assert_eq!(diagnostics.top_k, 4);
    assert_eq!(diagnostics.top_n, 2);
    assert_eq!(diagnostics.finalists, 2);
    assert_eq!(diagnostics.reranker, StageStatus::Active);
    assert_eq!(diagnostics.summarizer, StageStatus::Active);
    assert_eq!(diagnostics.explainer, StageStatus::Active);
    assert_eq!(diagnostics.item_fallbacks, 0);
}

#[tokio::test]
async fn test_rank_places_relevant_resume_above_unrelated() {
    let pipeline = stub_pipeline();
    let result = pipeline
        .rank(QUERY, &records(), RankOptions::new(4, 4))
        .await
        .unwrap();

    let position = |id: ResumeId| result.ranked.iter().position(|c| c.resume_id == id).unwrap();
    assert!(position(1) < position(4));
    assert!(position(1) < position(2));
}

#[tokio::test]
async fn test_rank_clamps_cutoffs_to_eligible() {
    let pipeline = stub_pipeline();
    let result = pipeline
        .rank(QUERY, &records(), RankOptions::new(50, 10))
        .await
        .unwrap();

    assert_eq!(result.diagnostics.top_k, 4);
    assert_eq!(result.diagnostics.top_n, 4);
    assert_eq!(result.ranked.len(), 4);
}

#[tokio::test]
async fn test_rank_without_resumes_fails() {
    let pipeline = stub_pipeline();
    let err = pipeline.rank(QUERY, &[], RankOptions::default()).await.unwrap_err();
    assert!(matches!(err, PipelineError::NoResumes));
}

#[tokio::test]
async fn test_rank_documents_without_index_fails() {
    let pipeline = stub_pipeline();
    let documents = pipeline.ingestor().ingest_all(&records()).unwrap();

    let err = pipeline
        .rank_documents(QUERY, QUERY, &documents, RankOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::IndexUnavailable { .. }));
}

#[tokio::test]
async fn test_duplicate_ids_fail_ingestion() {
    let pipeline = stub_pipeline();
    let records = vec![ResumeRecord::new(7, "Rust"), ResumeRecord::new(7, "Go")];

    let err = pipeline.rank(QUERY, &records, RankOptions::default()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Ingest(_)));
}

#[tokio::test]
async fn test_missing_reranker_keeps_embedding_order() {
    let pipeline = stub_pipeline().with_scorer(LazyModel::unavailable("reranker", "disabled"));
    let result = pipeline
        .rank(QUERY, &records(), RankOptions::new(4, 4))
        .await
        .unwrap();

    assert!(matches!(
        result.diagnostics.reranker,
        StageStatus::Skipped { .. }
    ));
    let scores: Vec<f32> = result.ranked.iter().map(|c| c.embedding_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
    for candidate in &result.ranked {
        assert_eq!(candidate.rerank_score, None);
    }
}

#[tokio::test]
async fn test_failing_generation_falls_back_per_item() {
    let pipeline = stub_pipeline()
        .with_summarizer(LazyModel::ready(
            "summarizer",
            Arc::new(FailingSummarizer) as Arc<dyn Summarize>,
        ))
        .with_explainer(LazyModel::ready(
            "explainer",
            Arc::new(FailingExplainer) as Arc<dyn Explain>,
        ));

    let result = pipeline
        .rank(QUERY, &records(), RankOptions::new(4, 3))
        .await
        .unwrap();

    assert_eq!(result.ranked.len(), 3);
    assert_eq!(result.diagnostics.item_fallbacks, 6);
    assert!(matches!(
        result.diagnostics.summarizer,
        StageStatus::Degraded { .. }
    ));
    assert!(matches!(
        result.diagnostics.explainer,
        StageStatus::Degraded { .. }
    ));

    let top = &result.ranked[0];
    assert!(top.explanation.starts_with("Ranked #1 with a "));
    assert!(!top.summary.is_empty());
}

#[tokio::test]
async fn test_unavailable_generation_is_skipped() {
    let pipeline = stub_pipeline()
        .with_summarizer(LazyModel::unavailable("summarizer", "off"))
        .with_explainer(LazyModel::unavailable("explainer", "off"));

    let result = pipeline
        .rank(QUERY, &records(), RankOptions::new(4, 2))
        .await
        .unwrap();

    assert_eq!(
        result.diagnostics.summarizer,
        StageStatus::Skipped {
            reason: "off".to_string()
        }
    );
    assert!(matches!(
        result.diagnostics.explainer,
        StageStatus::Skipped { .. }
    ));
    assert_eq!(result.diagnostics.item_fallbacks, 0);
    assert_eq!(
        result.ranked[1].explanation.split_whitespace().next(),
        Some("Ranked")
    );
}

#[tokio::test]
async fn test_rank_job_uses_requirements() {
    let pipeline = stub_pipeline();
    let job = JobQuery::new("Backend Engineer", "Build web services.")
        .with_requirements(["Python", "Django", "AWS"]);

    let result = pipeline
        .rank_job(&job, &records(), RankOptions::new(4, 1))
        .await
        .unwrap();
    assert_eq!(result.ranked.len(), 1);
    assert_eq!(result.ranked[0].rank, 1);
}

#[tokio::test]
async fn test_spawned_run_completes() {
    let pipeline = Arc::new(stub_pipeline());
    let job = pipeline.spawn(QUERY.to_string(), records(), RankOptions::new(4, 2));
    let run_id = job.run_id();

    let status = Arc::clone(&job.status);
    let result = job.wait().await.unwrap();

    assert_eq!(result.diagnostics.run_id, run_id);
    assert_eq!(result.ranked.len(), 2);
    assert_eq!(*status.read(), RankingStatus::Complete);
}

#[tokio::test]
async fn test_spawned_run_reports_failure() {
    let pipeline = Arc::new(stub_pipeline());
    let job = pipeline.spawn(QUERY.to_string(), Vec::new(), RankOptions::default());

    let status = Arc::clone(&job.status);
    assert!(matches!(job.wait().await, Err(PipelineError::NoResumes)));
    assert!(matches!(*status.read(), RankingStatus::Failed { .. }));
}

#[tokio::test]
async fn test_cancelled_run_publishes_no_result() {
    let pipeline = Arc::new(stub_pipeline().with_explainer(LazyModel::ready(
        "explainer",
        Arc::new(StalledExplainer) as Arc<dyn Explain>,
    )));
    let job = pipeline.spawn(QUERY.to_string(), records(), RankOptions::default());

    job.cancel();
    assert_eq!(job.status(), RankingStatus::Cancelled);
    assert!(matches!(job.wait().await, Err(PipelineError::Cancelled)));
}

#[tokio::test]
async fn test_run_times_out() {
    let pipeline = Arc::new(stub_pipeline().with_explainer(LazyModel::ready(
        "explainer",
        Arc::new(StalledExplainer) as Arc<dyn Explain>,
    )));
    let job = pipeline.spawn(QUERY.to_string(), records(), RankOptions::default());
    let status = Arc::clone(&job.status);

    let err = job
        .wait_with_timeout(Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::TimedOut { timeout_ms: 200 }));
    assert_eq!(*status.read(), RankingStatus::TimedOut);
}

#[tokio::test]
async fn test_zero_cutoff_overrides_are_rejected() {
    let pipeline = stub_pipeline();

    for options in [RankOptions::new(5, 0), RankOptions::new(0, 5)] {
        let err = pipeline.rank(QUERY, &records(), options).await.unwrap_err();
        assert!(
            matches!(err, PipelineError::Config(ConfigError::ZeroValue { .. })),
            "{options:?} gave {err:?}"
        );
    }
}

#[tokio::test]
async fn test_invalid_chunking_override_is_rejected() {
    let pipeline = stub_pipeline();

    let err = pipeline
        .rank(QUERY, &records(), RankOptions::default().with_chunking(100, 100))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Config(ConfigError::InvalidChunking {
            size: 100,
            overlap: 100
        })
    ));

    let err = pipeline
        .rank(QUERY, &records(), RankOptions::default().with_chunking(0, 0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Config(ConfigError::ZeroValue { .. })
    ));
}

#[tokio::test]
async fn test_chunking_override_applies_to_one_run() {
    let pipeline = stub_pipeline();
    let text = format!(
        "Jane Doe\n{}",
        "Python and Django developer shipping services on AWS. ".repeat(12)
    );
    let records = vec![ResumeRecord::new(1, text.clone())];
    let fine_chunks = Chunker::new(200, 20).unwrap().chunk(&text).len();
    assert!(fine_chunks > 1);

    pipeline
        .rank(QUERY, &records, RankOptions::default())
        .await
        .unwrap();
    assert_eq!(pipeline.index().len().await.unwrap(), 1);

    let options = RankOptions::default().with_chunking(200, 20);
    let documents = pipeline.ingest_and_index(&records, options).await.unwrap();
    assert_eq!(documents[0].chunks.len(), fine_chunks);
    assert_eq!(pipeline.index().len().await.unwrap(), fine_chunks as u64);

    pipeline
        .rank(QUERY, &records, RankOptions::default())
        .await
        .unwrap();
    assert_eq!(pipeline.index().len().await.unwrap(), 1);
    assert_eq!(pipeline.ingestor().chunker().size(), 1000);
}

#[tokio::test]
async fn test_cancel_after_finish_keeps_outcome() {
    let pipeline = Arc::new(stub_pipeline());
    let job = pipeline.spawn(QUERY.to_string(), records(), RankOptions::new(4, 2));

    while !job.is_finished() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    job.cancel();

    assert_eq!(job.status(), RankingStatus::Complete);
    let result = job.wait().await.unwrap();
    assert_eq!(result.ranked.len(), 2);
}
