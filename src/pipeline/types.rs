use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, ConfigError};
use crate::ingest::ResumeId;

/// Job posting used to build the retrieval query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobQuery {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl JobQuery {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            requirements: Vec::new(),
        }
    }

    pub fn with_requirements<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements = requirements.into_iter().map(Into::into).collect();
        self
    }

    /// `"{title}\n{description}\nRequirements:\n{req}\n{req}..."`.
    pub fn to_query_string(&self) -> String {
        let mut query = format!("{}\n{}\nRequirements:", self.title, self.description);
        for requirement in &self.requirements {
            query.push('\n');
            query.push_str(requirement);
        }
        query
    }

    /// Text the explainer compares candidates against.
    pub fn requirements_text(&self) -> String {
        if self.requirements.is_empty() {
            self.description.clone()
        } else {
            self.requirements.join("\n")
        }
    }
}

/// Per-run overrides of the configured cut-offs and chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RankOptions {
    pub top_k: Option<usize>,
    pub top_n: Option<usize>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub chunk_overlap: Option<usize>,
}

impl RankOptions {
    pub fn new(top_k: usize, top_n: usize) -> Self {
        Self {
            top_k: Some(top_k),
            top_n: Some(top_n),
            ..Self::default()
        }
    }

    pub fn with_chunking(mut self, size: usize, overlap: usize) -> Self {
        self.chunk_size = Some(size);
        self.chunk_overlap = Some(overlap);
        self
    }

    /// Rejects overrides the configuration itself would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let overrides = [
            (Config::ENV_TOP_K, self.top_k),
            (Config::ENV_TOP_N, self.top_n),
            (Config::ENV_CHUNK_SIZE, self.chunk_size),
        ];
        for (name, value) in overrides {
            if value == Some(0) {
                return Err(ConfigError::ZeroValue { name });
            }
        }
        Ok(())
    }

    /// Whether this run chunks differently from `(size, overlap)`.
    pub fn overrides_chunking(&self, size: usize, overlap: usize) -> bool {
        self.chunk_size.is_some_and(|s| s != size)
            || self.chunk_overlap.is_some_and(|o| o != overlap)
    }

    /// Effective `(K, N)` for `eligible` resumes: `K = min(top_k, eligible)`,
    /// `N = min(top_n, K)`.
    pub fn resolve(&self, default_k: usize, default_n: usize, eligible: usize) -> (usize, usize) {
        let k = self.top_k.unwrap_or(default_k).min(eligible);
        let n = self.top_n.unwrap_or(default_n).min(k);
        (k, n)
    }
}

/// Stages in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Ingested,
    Indexed,
    Retrieved,
    Reranked,
    Summarized,
    Explained,
    Complete,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Ingested => "ingested",
            PipelineStage::Indexed => "indexed",
            PipelineStage::Retrieved => "retrieved",
            PipelineStage::Reranked => "reranked",
            PipelineStage::Summarized => "summarized",
            PipelineStage::Explained => "explained",
            PipelineStage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// How an optional stage ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Active,
    /// Ran, but fell back for some or all items.
    Degraded { reason: String },
    /// Not run; fallbacks used throughout.
    Skipped { reason: String },
}

impl StageStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, StageStatus::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub elapsed_ms: u64,
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub resume_id: ResumeId,
    pub candidate_name: String,
    /// Retrieval score in [0, 1].
    pub embedding_score: f32,
    /// Cross-encoder score in (0, 1); absent when reranking did not run.
    pub rerank_score: Option<f32>,
    /// 0-100, from the rerank score (or embedding score without reranking).
    pub match_percentage: f32,
    pub skills: Vec<String>,
    pub summary: String,
    pub explanation: String,
    /// 1-based.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    pub run_id: Uuid,
    /// Effective K after clamping to the eligible count.
    pub top_k: usize,
    /// Effective N after clamping to K.
    pub top_n: usize,
    pub eligible: usize,
    pub retrieved: usize,
    pub finalists: usize,
    /// Eligible resumes no chunk hit resolved to.
    pub unmatched: usize,
    pub reranker: StageStatus,
    pub summarizer: StageStatus,
    pub explainer: StageStatus,
    /// Summaries and explanations replaced by fallback text.
    pub item_fallbacks: usize,
    pub stages: Vec<StageTiming>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub ranked: Vec<CandidateScore>,
    pub diagnostics: PipelineDiagnostics,
}

/// Observable state of a background run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RankingStatus {
    Analyzing,
    Complete,
    Failed { reason: String },
    Cancelled,
    TimedOut,
}

impl RankingStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RankingStatus::Analyzing)
    }
}
