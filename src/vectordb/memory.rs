//! In-process vector store with optional JSON snapshots.

use std::collections::HashMap;
use std::path::Path;

use half::f16;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::client::VectorDbClient;
use super::error::VectorDbError;
use super::model::{ChunkMetadata, ChunkPoint, SearchHit};
use super::WriteConsistency;

const SNAPSHOT_VERSION: u32 = 1;

/// Brute-force cosine store. Vectors are kept as `f16`.
#[derive(Default)]
pub struct MemoryVectorDb {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

#[derive(Default, Clone)]
struct MemoryCollection {
    vector_size: u64,
    points: HashMap<u64, StoredPoint>,
}

#[derive(Clone)]
struct StoredPoint {
    vector: Vec<f16>,
    metadata: ChunkMetadata,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    collections: Vec<CollectionSnapshot>,
}

#[derive(Serialize, Deserialize)]
struct CollectionSnapshot {
    name: String,
    vector_size: u64,
    points: Vec<PointSnapshot>,
}

#[derive(Serialize, Deserialize)]
struct PointSnapshot {
    id: u64,
    vector: Vec<f32>,
    metadata: ChunkMetadata,
}

impl MemoryVectorDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point count without going through the async trait.
    pub fn len(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.points.len())
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Writes every collection to `path` (temp file, then rename).
    pub fn save_snapshot(&self, path: &Path) -> Result<(), VectorDbError> {
        let snapshot = {
            let collections = self.collections.read();
            let mut entries: Vec<CollectionSnapshot> = collections
                .iter()
                .map(|(name, coll)| {
                    let mut points: Vec<PointSnapshot> = coll
                        .points
                        .iter()
                        .map(|(&id, p)| PointSnapshot {
                            id,
                            vector: f16_to_f32_vec(&p.vector),
                            metadata: p.metadata.clone(),
                        })
                        .collect();
                    points.sort_by_key(|p| p.id);
                    CollectionSnapshot {
                        name: name.clone(),
                        vector_size: coll.vector_size,
                        points,
                    }
                })
                .collect();
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Snapshot {
                version: SNAPSHOT_VERSION,
                collections: entries,
            }
        };

        let snapshot_err = |message: String| VectorDbError::SnapshotFailed {
            path: path.to_path_buf(),
            message,
        };

        let bytes = serde_json::to_vec(&snapshot).map_err(|e| snapshot_err(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes).map_err(|e| snapshot_err(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| snapshot_err(e.to_string()))?;

        info!(
            path = %path.display(),
            collections = snapshot.collections.len(),
            "Vector snapshot saved"
        );
        Ok(())
    }

    pub fn load_snapshot(path: &Path) -> Result<Self, VectorDbError> {
        let snapshot_err = |message: String| VectorDbError::SnapshotFailed {
            path: path.to_path_buf(),
            message,
        };

        let bytes = std::fs::read(path).map_err(|e| snapshot_err(e.to_string()))?;
        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|e| snapshot_err(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(snapshot_err(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut collections = HashMap::with_capacity(snapshot.collections.len());
        for coll in snapshot.collections {
            let mut points = HashMap::with_capacity(coll.points.len());
            for point in coll.points {
                if point.vector.len() as u64 != coll.vector_size {
                    return Err(VectorDbError::InvalidDimension {
                        expected: coll.vector_size as usize,
                        actual: point.vector.len(),
                    });
                }
                points.insert(
                    point.id,
                    StoredPoint {
                        vector: f32_to_f16_vec(&point.vector),
                        metadata: point.metadata,
                    },
                );
            }
            collections.insert(
                coll.name,
                MemoryCollection {
                    vector_size: coll.vector_size,
                    points,
                },
            );
        }

        info!(path = %path.display(), collections = collections.len(), "Vector snapshot loaded");
        Ok(Self {
            collections: RwLock::new(collections),
        })
    }

    /// Loads `path` if it exists, otherwise starts empty.
    pub fn open_or_empty(path: &Path) -> Result<Self, VectorDbError> {
        if path.exists() {
            Self::load_snapshot(path)
        } else {
            debug!(path = %path.display(), "No vector snapshot yet, starting empty");
            Ok(Self::new())
        }
    }
}

impl VectorDbClient for MemoryVectorDb {
    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write();
        let coll = collections
            .entry(name.to_string())
            .or_insert(MemoryCollection {
                vector_size,
                points: HashMap::new(),
            });

        if coll.vector_size != vector_size {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.vector_size as usize,
                actual: vector_size as usize,
            });
        }
        Ok(())
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<ChunkPoint>,
        _consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write();
        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        // Validate the whole batch before touching the collection.
        if let Some(bad) = points
            .iter()
            .find(|p| p.vector.len() as u64 != coll.vector_size)
        {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.vector_size as usize,
                actual: bad.vector.len(),
            });
        }

        for point in points {
            coll.points.insert(
                point.id,
                StoredPoint {
                    vector: f32_to_f16_vec(&point.vector),
                    metadata: point.metadata,
                },
            );
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchHit>, VectorDbError> {
        let collections = self.collections.read();
        let coll = collections
            .get(collection)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: collection.to_string(),
            })?;

        if query.len() as u64 != coll.vector_size {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.vector_size as usize,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(u64, f32)> = coll
            .points
            .iter()
            .map(|(&id, p)| (id, cosine_similarity_f16_f32(&p.vector, &query)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit as usize);

        Ok(scored
            .into_iter()
            .filter_map(|(id, score)| {
                coll.points.get(&id).map(|p| SearchHit {
                    id,
                    score,
                    metadata: p.metadata.clone(),
                })
            })
            .collect())
    }

    async fn delete_points(
        &self,
        collection: &str,
        ids: Vec<u64>,
        _consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write();
        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for id in ids {
            coll.points.remove(&id);
        }
        Ok(())
    }

    async fn point_count(&self, collection: &str) -> Result<Option<u64>, VectorDbError> {
        Ok(self.len(collection).map(|n| n as u64))
    }
}

#[inline]
pub fn cosine_similarity_f16_f32(a: &[f16], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0f32;
    let mut norm_a_sq = 0.0f32;
    let mut norm_b_sq = 0.0f32;

    for (av_f16, &bv) in a.iter().zip(b.iter()) {
        let av = av_f16.to_f32();
        dot_product += av * bv;
        norm_a_sq += av * av;
        norm_b_sq += bv * bv;
    }

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

pub fn f32_to_f16_vec(values: &[f32]) -> Vec<f16> {
    values.iter().map(|&v| f16::from_f32(v)).collect()
}

pub fn f16_to_f32_vec(values: &[f16]) -> Vec<f32> {
    values.iter().map(|v| v.to_f32()).collect()
}
