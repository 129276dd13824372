//! Incremental chunk index: embeds chunks and merges them into a vector collection.
//!
//! Writers are serialized by an async mutex; searches go straight to the backend and
//! see whatever the last completed merge left behind.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::{IndexError, IndexResult};

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::embedding::{Embedder, LazyModel};
use crate::hashing::{chunk_point_id, hash_to_u64};
use crate::ingest::{ResumeDocument, ResumeId};
use crate::vectordb::{ChunkMetadata, ChunkPoint, SearchHit, VectorDbClient, WriteConsistency};

/// A chunk returned by [`VectorIndex::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkHit {
    pub point_id: u64,
    /// Cosine similarity to the query.
    pub similarity: f32,
    pub metadata: ChunkMetadata,
}

impl ChunkHit {
    pub fn resume_id(&self) -> Option<ResumeId> {
        self.metadata.resume_id
    }

    pub fn text(&self) -> &str {
        &self.metadata.text
    }
}

impl From<SearchHit> for ChunkHit {
    fn from(hit: SearchHit) -> Self {
        Self {
            point_id: hit.id,
            similarity: hit.score,
            metadata: hit.metadata,
        }
    }
}

struct PendingChunk {
    point_id: u64,
    content_hash: u64,
    metadata: ChunkMetadata,
}

/// What this process has merged so far.
#[derive(Default)]
struct WrittenChunks {
    /// point id -> hash of the chunk text last written under it.
    hashes: HashMap<u64, u64>,
    /// resume id -> point ids of its current chunks.
    by_resume: HashMap<ResumeId, Vec<u64>>,
}

pub struct VectorIndex<C> {
    client: Arc<C>,
    embedder: Arc<LazyModel<Embedder>>,
    collection: String,
    write_lock: tokio::sync::Mutex<()>,
    written: Mutex<WrittenChunks>,
}

impl<C: VectorDbClient> VectorIndex<C> {
    pub fn new(
        client: Arc<C>,
        embedder: Arc<LazyModel<Embedder>>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            client,
            embedder,
            collection: collection.into(),
            write_lock: tokio::sync::Mutex::new(()),
            written: Mutex::new(WrittenChunks::default()),
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn embedder(&self) -> &Arc<LazyModel<Embedder>> {
        &self.embedder
    }

    async fn load_embedder(&self) -> IndexResult<Arc<Embedder>> {
        self.embedder
            .load()
            .await
            .ok_or_else(|| IndexError::EmbedderUnavailable {
                reason: self
                    .embedder
                    .unavailable_reason()
                    .unwrap_or_else(|| "not loaded".to_string()),
            })
    }

    /// Embeds and upserts the chunks of `documents` not already written with the same
    /// text, and drops chunks a resume no longer has (e.g. after re-chunking). Returns
    /// the number of chunks written.
    #[instrument(skip(self, documents), fields(collection = %self.collection, documents = documents.len()))]
    pub async fn index(&self, documents: &[ResumeDocument]) -> IndexResult<usize> {
        let _guard = self.write_lock.lock().await;

        let (pending, stale, current) = {
            let written = self.written.lock();
            let mut pending = Vec::new();
            let mut stale = Vec::new();
            let mut current = Vec::with_capacity(documents.len());

            for doc in documents {
                let ids: Vec<u64> = doc
                    .chunks
                    .iter()
                    .map(|chunk| chunk_point_id(doc.id, chunk.index))
                    .collect();

                for (chunk, &point_id) in doc.chunks.iter().zip(&ids) {
                    let content_hash = hash_to_u64(chunk.text.as_bytes());
                    if written.hashes.get(&point_id) == Some(&content_hash) {
                        continue;
                    }
                    pending.push(PendingChunk {
                        point_id,
                        content_hash,
                        metadata: ChunkMetadata {
                            resume_id: Some(doc.id),
                            candidate_name: doc.fields.contact.name.clone(),
                            chunk_index: chunk.index,
                            text: chunk.text.clone(),
                        },
                    });
                }

                if let Some(previous) = written.by_resume.get(&doc.id) {
                    stale.extend(previous.iter().filter(|id| !ids.contains(id)).copied());
                }
                current.push((doc.id, ids));
            }
            (pending, stale, current)
        };

        if pending.is_empty() && stale.is_empty() {
            debug!("All chunks already indexed");
            return Ok(0);
        }

        let count = pending.len();
        let mut hashes = Vec::with_capacity(count);
        if !pending.is_empty() {
            let embedder = self.load_embedder().await?;
            let dim = embedder.dim();
            let texts: Vec<String> = pending.iter().map(|p| p.metadata.text.clone()).collect();
            let vectors = tokio::task::spawn_blocking(move || {
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                embedder.embed_batch(&refs)
            })
            .await
            .map_err(|e| IndexError::TaskFailed {
                reason: e.to_string(),
            })??;

            self.client
                .ensure_collection(&self.collection, dim as u64)
                .await?;

            hashes.extend(pending.iter().map(|p| (p.point_id, p.content_hash)));
            let points: Vec<ChunkPoint> = pending
                .into_iter()
                .zip(vectors)
                .map(|(p, vector)| ChunkPoint::new(p.point_id, vector, p.metadata))
                .collect();

            self.client
                .upsert_points(&self.collection, points, WriteConsistency::Strong)
                .await?;
        }

        if !stale.is_empty() {
            self.client
                .delete_points(&self.collection, stale.clone(), WriteConsistency::Strong)
                .await?;
        }

        let mut written = self.written.lock();
        for id in &stale {
            written.hashes.remove(id);
        }
        written.hashes.extend(hashes);
        written.by_resume.extend(current);

        info!(chunks = count, removed = stale.len(), "Merged chunks into index");
        Ok(count)
    }

    /// Stored chunk count (0 when the collection does not exist).
    pub async fn len(&self) -> IndexResult<u64> {
        Ok(self
            .client
            .point_count(&self.collection)
            .await?
            .unwrap_or(0))
    }

    pub async fn is_empty(&self) -> IndexResult<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn embed_query(&self, query: &str) -> IndexResult<Vec<f32>> {
        let embedder = self.load_embedder().await?;
        let query = query.to_string();
        tokio::task::spawn_blocking(move || embedder.embed(&query))
            .await
            .map_err(|e| IndexError::TaskFailed {
                reason: e.to_string(),
            })?
            .map_err(IndexError::from)
    }

    /// Top `k` chunks by similarity to `query`, most similar first.
    #[instrument(skip(self, query), fields(collection = %self.collection, query_len = query.len(), k))]
    pub async fn search(&self, query: &str, k: usize) -> IndexResult<Vec<ChunkHit>> {
        if self.is_empty().await? {
            return Err(IndexError::NotIndexed {
                collection: self.collection.clone(),
            });
        }

        let vector = self.embed_query(query).await?;
        let hits = self
            .client
            .search(&self.collection, vector, k as u64)
            .await?;

        debug!(hits = hits.len(), "Index search complete");
        Ok(hits.into_iter().map(ChunkHit::from).collect())
    }
}
