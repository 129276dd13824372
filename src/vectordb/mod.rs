//! Chunk vector storage: Qdrant or an in-process store.

pub mod client;
pub mod error;
pub mod memory;
pub mod model;

#[cfg(test)]
mod tests;

pub use client::{QdrantClient, VectorDbClient};
pub use error::VectorDbError;
pub use memory::{MemoryVectorDb, cosine_similarity_f16_f32};
pub use model::{ChunkMetadata, ChunkPoint, SearchHit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConsistency {
    /// Wait for the operation to be fully indexed and searchable.
    /// Maps to `wait=true`.
    Strong,
    /// Return immediately after the server acknowledges receipt.
    /// Maps to `wait=false`.
    Eventual,
}

impl From<WriteConsistency> for bool {
    fn from(c: WriteConsistency) -> bool {
        matches!(c, WriteConsistency::Strong)
    }
}
