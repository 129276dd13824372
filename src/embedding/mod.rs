//! Embedding + model utilities.
//!
//! - [`embedder`] produces sentence embeddings for the vector index.
//! - [`reranker`] provides cross-encoder scoring used by [`crate::scoring`].
//! - [`lazy`] wraps any model in a load-once capability with a durable failure state.

/// BERT wrappers shared by the embedder and the reranker.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Sentence embedder.
pub mod embedder;
mod error;
/// Load-once model capability.
pub mod lazy;
/// Cross-encoder reranker.
pub mod reranker;
/// Model identifier resolution (local dir, hub repo, stub, disabled).
pub mod source;
/// Tokenizer loading, pooling and text helpers.
pub mod utils;

pub use embedder::{Embedder, EmbedderConfig};
pub use error::EmbeddingError;
pub use lazy::LazyModel;
pub use reranker::{Reranker, RerankerConfig, RerankerError};
pub use source::ModelSource;
