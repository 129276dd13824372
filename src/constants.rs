//! Cross-cutting, shared constants.
//!
//! Pipeline-wide defaults live here so that the config layer, the stages and the tests
//! agree on one value. Derive secondary values from primary ones to avoid drift.

/// Default sentence-embedding model identifier.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
/// Default cross-encoder identifier.
pub const DEFAULT_RERANKER_MODEL: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";
/// Default seq2seq summarizer identifier.
pub const DEFAULT_SUMMARIZER_MODEL: &str = "t5-small";
/// Default chat model for explanations (resolved by `genai`).
pub const DEFAULT_EXPLANATION_MODEL: &str = "gpt-4o-mini";

/// Model identifier that selects the deterministic in-process backend.
pub const STUB_MODEL_ID: &str = "stub";
/// Model identifier that disables an optional stage.
pub const DISABLED_MODEL_ID: &str = "none";

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;
/// Windows may end early on whitespace found within this trailing fraction.
pub const CHUNK_BOUNDARY_FRACTION: f32 = 0.2;

pub const DEFAULT_TOP_K: usize = 50;
pub const DEFAULT_TOP_N: usize = 5;

/// Chunk hits fetched per requested resume.
pub const CHUNK_FETCH_MULTIPLIER: usize = 5;
/// Best chunks averaged into a resume-level score.
pub const TOP_CHUNKS_PER_RESUME: usize = 3;
/// Score given to eligible resumes with no aligned chunk.
pub const UNMATCHED_EMBEDDING_SCORE: f32 = 0.0;
/// Leading characters compared by the legacy content matcher.
pub const CONTENT_MATCH_PREFIX_CHARS: usize = 100;

pub const RERANK_TEXT_CHARS: usize = 2000;
pub const RERANK_MAX_TOKENS: usize = 512;

/// Token limit applied to embedder input (MiniLM position budget).
pub const EMBED_MAX_TOKENS: usize = 256;
/// Dimension of the stub embedder (matches MiniLM).
pub const STUB_EMBEDDING_DIM: usize = 384;

pub const SUMMARY_INPUT_CHARS: usize = 2000;
pub const SUMMARY_MAX_TOKENS: usize = 150;
pub const SUMMARY_INPUT_MAX_TOKENS: usize = 512;
pub const EXCERPT_CHARS: usize = 300;

pub const EXPLANATION_REQUIREMENTS_CHARS: usize = 500;
pub const EXPLANATION_EXCERPT_CHARS: usize = 1000;
pub const EXPLANATION_REPLY_CHARS: usize = 300;
pub const EXPLANATION_MAX_TOKENS: u32 = 1024;
pub const EXPLANATION_TEMPERATURE: f64 = 0.1;
/// Skills named by the fallback explanation template.
pub const TEMPLATE_SKILL_LIMIT: usize = 5;

pub const MAX_SKILLS: usize = 20;
pub const NAME_SCAN_LINES: usize = 8;
pub const NAME_CONFIDENCE_THRESHOLD: f32 = 20.0;
/// Longest plausible experience span in years (exclusive).
pub const MAX_EXPERIENCE_YEARS: i32 = 60;

pub const UNKNOWN_CANDIDATE_NAME: &str = "Unknown";

pub const DEFAULT_COLLECTION: &str = "resumatch_chunks";
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Truncates `text` to at most `max_chars` characters (never splits a code point).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
