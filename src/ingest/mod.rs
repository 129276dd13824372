//! Resume ingestion: records in, chunked and field-extracted documents out.

pub mod chunker;
pub mod error;


pub use chunker::{ChunkSpan, Chunker};
pub use error::IngestError;

use std::collections::HashSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::UNKNOWN_CANDIDATE_NAME;
use crate::extract::{ExtractedFields, FieldExtractor};

pub type ResumeId = u64;

/// Raw resume as handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub resume_id: ResumeId,
    pub text: String,
    /// Skills already known for this resume; extraction is skipped when present.
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

impl ResumeRecord {
    pub fn new(resume_id: ResumeId, text: impl Into<String>) -> Self {
        Self {
            resume_id,
            text: text.into(),
            skills: None,
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }
}

/// A chunk owned by one resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub resume_id: ResumeId,
    pub index: usize,
    pub chars: Range<usize>,
    pub text: String,
}

/// Ingested resume: text, chunks and extracted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub id: ResumeId,
    pub text: String,
    pub chunks: Vec<TextChunk>,
    pub fields: ExtractedFields,
}

impl ResumeDocument {
    pub fn skills(&self) -> &[String] {
        &self.fields.skills
    }

    /// Extracted candidate name, or `"Unknown"`.
    pub fn candidate_name(&self) -> &str {
        self.fields
            .contact
            .name
            .as_deref()
            .unwrap_or(UNKNOWN_CANDIDATE_NAME)
    }
}

/// Turns records into documents with one extractor and one chunker.
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    extractor: FieldExtractor,
    chunker: Chunker,
}

impl Ingestor {
    pub fn new(extractor: FieldExtractor, chunker: Chunker) -> Self {
        Self { extractor, chunker }
    }

    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Same extractor, different windows.
    pub fn with_chunker(&self, chunker: Chunker) -> Self {
        Self {
            extractor: self.extractor.clone(),
            chunker,
        }
    }

    pub fn ingest(&self, record: &ResumeRecord) -> ResumeDocument {
        let mut fields = self.extractor.extract(&record.text);
        if let Some(skills) = &record.skills {
            fields.skills = normalize_skills(skills);
        }

        let chunks: Vec<TextChunk> = self
            .chunker
            .chunk(&record.text)
            .into_iter()
            .map(|span| TextChunk {
                resume_id: record.resume_id,
                index: span.index,
                chars: span.chars,
                text: span.text,
            })
            .collect();

        debug!(
            resume_id = record.resume_id,
            chunks = chunks.len(),
            skills = fields.skills.len(),
            "Ingested resume"
        );

        ResumeDocument {
            id: record.resume_id,
            text: record.text.clone(),
            chunks,
            fields,
        }
    }

    /// Ingests a batch; resume ids must be unique within it.
    pub fn ingest_all(&self, records: &[ResumeRecord]) -> Result<Vec<ResumeDocument>, IngestError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.resume_id) {
                return Err(IngestError::DuplicateResumeId {
                    id: record.resume_id,
                });
            }
        }

        let documents: Vec<ResumeDocument> = records.iter().map(|r| self.ingest(r)).collect();
        info!(
            resumes = documents.len(),
            chunks = documents.iter().map(|d| d.chunks.len()).sum::<usize>(),
            "Ingestion complete"
        );
        Ok(documents)
    }
}

fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}
