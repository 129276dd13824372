//! Precision reranking of the shortlist with a cross-encoder.
//!
//! Raw logits from [`Reranker`](crate::embedding::Reranker) are squashed with
//! [`sigmoid`] so every rerank score lands in (0, 1).

pub mod error;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
pub use scorer::{CrossEncoderScorer, sigmoid};
pub use types::{RerankedCandidate, ScoringCandidate};
