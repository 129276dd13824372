//! Resumatch library crate (used by the CLI binary and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by pipeline stage:
//!
//! ## Ingestion
//! - [`FieldExtractor`], [`ExtractedFields`] - Heuristic resume field parsing
//! - [`Chunker`], [`ResumeDocument`], [`ResumeRecord`] - Documents and text windows
//!
//! ## Retrieval
//! - [`Embedder`], [`EmbedderConfig`] - Sentence embeddings
//! - [`VectorIndex`] - Incremental chunk index over a [`VectorDbClient`]
//! - [`Retriever`], [`RetrievedCandidate`] - Chunk-to-resume aggregation
//!
//! ## Precision & Generation
//! - [`Reranker`], [`CrossEncoderScorer`] - Cross-encoder reranking
//! - [`Summarizer`], [`LlmExplainer`] - Synopsis and explanation models
//!
//! ## Orchestration
//! - [`RankingPipeline`], [`RankingResult`], [`CandidateScore`] - End-to-end ranking
//! - [`Config`], [`RankOptions`] - Defaults, env overrides and per-run overrides
//!
//! Every model-backed component supports a deterministic `stub` mode so the whole
//! pipeline runs without model files or network access.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod extract;
pub mod generation;
pub mod hashing;
pub mod index;
pub mod ingest;
pub mod pipeline;
pub mod retrieval;
pub mod scoring;
pub mod vectordb;

pub use config::{Config, ConfigError, VectorBackend};
pub use embedding::{
    Embedder, EmbedderConfig, EmbeddingError, LazyModel, ModelSource, Reranker, RerankerConfig,
    RerankerError,
};
pub use extract::{Contact, DegreeLevel, Education, ExtractedFields, FieldExtractor, SkillVocabulary};
pub use generation::{
    Explain, ExplainerConfig, ExplanationRequest, GenerationError, LlmExplainer, Summarize,
    Summarizer, SummarizerConfig,
};
pub use hashing::{chunk_point_id, hash_to_u64};
pub use index::{ChunkHit, IndexError, IndexResult, VectorIndex};
pub use ingest::{ChunkSpan, Chunker, IngestError, ResumeDocument, ResumeId, ResumeRecord, TextChunk};
pub use pipeline::{
    CandidateScore, JobQuery, PipelineDiagnostics, PipelineError, PipelineStage, RankOptions,
    RankingJob, RankingPipeline, RankingResult, RankingStatus, StageStatus,
};
pub use retrieval::{RetrievedCandidate, Retriever};
pub use scoring::{CrossEncoderScorer, RerankedCandidate, ScoringError, sigmoid};
pub use vectordb::{
    ChunkMetadata, ChunkPoint, MemoryVectorDb, QdrantClient, SearchHit, VectorDbClient,
    VectorDbError,
};
