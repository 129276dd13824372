use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{ScoredPoint, Value};
use serde::{Deserialize, Serialize};

use crate::ingest::ResumeId;

/// Payload carried by every indexed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Owning resume. Absent only for chunks written before ids were stored.
    pub resume_id: Option<ResumeId>,
    pub candidate_name: Option<String>,
    pub chunk_index: usize,
    pub text: String,
}

impl ChunkMetadata {
    pub fn to_payload(&self) -> HashMap<String, Value> {
        let mut payload: HashMap<String, Value> = HashMap::new();
        if let Some(resume_id) = self.resume_id {
            payload.insert("resume_id".to_string(), (resume_id as i64).into());
        }
        if let Some(name) = &self.candidate_name {
            payload.insert("candidate_name".to_string(), name.clone().into());
        }
        payload.insert("chunk_index".to_string(), (self.chunk_index as i64).into());
        payload.insert("text".to_string(), self.text.clone().into());
        payload
    }

    pub fn from_payload(payload: &HashMap<String, Value>) -> Self {
        Self {
            resume_id: payload
                .get("resume_id")
                .and_then(|v| v.as_integer())
                .map(|i| i as ResumeId),
            candidate_name: payload
                .get("candidate_name")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            chunk_index: payload
                .get("chunk_index")
                .and_then(|v| v.as_integer())
                .map(|i| i as usize)
                .unwrap_or(0),
            text: payload
                .get("text")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChunkPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl ChunkPoint {
    pub fn new(id: u64, vector: Vec<f32>, metadata: ChunkMetadata) -> Self {
        Self {
            id,
            vector,
            metadata,
        }
    }
}

/// A chunk returned by similarity search (cosine score, higher is closer).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    pub score: f32,
    pub metadata: ChunkMetadata,
}

impl SearchHit {
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let id = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(n)) => n,
            _ => return None,
        };

        Some(SearchHit {
            id,
            score: point.score,
            metadata: ChunkMetadata::from_payload(&point.payload),
        })
    }
}
