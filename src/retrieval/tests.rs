use super::*;

use crate::embedding::{Embedder, LazyModel};
use crate::ingest::{Ingestor, ResumeRecord};
use crate::vectordb::{ChunkMetadata, MemoryVectorDb};

fn doc(id: ResumeId, text: &str) -> ResumeDocument {
    Ingestor::default().ingest(&ResumeRecord::new(id, text))
}

fn hit(resume_id: Option<ResumeId>, text: &str, similarity: f32) -> ChunkHit {
    ChunkHit {
        point_id: 0,
        similarity,
        metadata: ChunkMetadata {
            resume_id,
            candidate_name: None,
            chunk_index: 0,
            text: text.to_string(),
        },
    }
}

#[test]
fn test_normalize_text() {
    assert_eq!(normalize_text("  Senior\n\tRust   Engineer "), "senior rust engineer");
    assert_eq!(normalize_text(""), "");
}

#[test]
fn test_content_matcher_prefix_and_containment() {
    let eligible = vec![
        doc(1, "Jane Doe\nPython developer at Acme"),
        doc(2, "John Smith\nNurse"),
    ];
    let matcher = ContentMatcher::new(&eligible);

    assert_eq!(matcher.resolve("python   DEVELOPER at acme"), Some(1));
    assert_eq!(matcher.resolve("John Smith Nurse and more text"), Some(2));
    assert_eq!(matcher.resolve("unrelated text"), None);
    assert_eq!(matcher.resolve("   "), None);
}

#[test]
fn test_content_matcher_ambiguous_is_unresolved() {
    let eligible = vec![doc(1, "shared intro text, one"), doc(2, "shared intro text, two")];
    assert_eq!(ContentMatcher::new(&eligible).resolve("shared intro"), None);
}

#[test]
fn test_aggregate_mean_of_top_three() {
    let eligible = vec![doc(1, "a"), doc(2, "b")];
    let hits = vec![
        hit(Some(1), "x", 0.9),
        hit(Some(1), "x", 0.8),
        hit(Some(1), "x", 0.7),
        hit(Some(1), "x", 0.1),
        hit(Some(2), "y", 0.5),
    ];

    let candidates = aggregate(&hits, &eligible);
    assert_eq!(candidates[0].resume_id, 1);
    assert!((candidates[0].score - 0.8).abs() < 1e-6);
    assert_eq!(candidates[0].chunk_hits, 4);
    assert!((candidates[1].score - 0.5).abs() < 1e-6);
}

#[test]
fn test_aggregate_clamps_similarity() {
    let eligible = vec![doc(1, "a")];
    let candidates = aggregate(&[hit(Some(1), "x", -0.4), hit(Some(1), "x", 1.2)], &eligible);
    assert!((candidates[0].score - 0.5).abs() < 1e-6);
}

#[test]
fn test_aggregate_covers_every_eligible_resume() {
    let eligible: Vec<ResumeDocument> = (1..=10).map(|id| doc(id, "text")).collect();
    let hits: Vec<ChunkHit> = (1..=7).map(|id| hit(Some(id), "t", 0.1 * id as f32)).collect();

    let candidates = aggregate(&hits, &eligible);
    assert_eq!(candidates.len(), 10);

    let (matched, unmatched): (Vec<_>, Vec<_>) = candidates.iter().partition(|c| c.matched);
    assert_eq!(matched.len(), 7);
    assert!(unmatched.iter().all(|c| c.score == UNMATCHED_EMBEDDING_SCORE));
    assert!(candidates[..7].iter().all(|c| c.matched));
}

#[test]
fn test_matched_wins_score_ties() {
    let eligible = vec![doc(1, "a"), doc(2, "b")];
    let candidates = aggregate(&[hit(Some(2), "x", 0.0)], &eligible);
    assert_eq!(candidates[0].resume_id, 2);
    assert!(candidates[0].matched);
    assert!(!candidates[1].matched);
}

#[test]
fn test_hits_for_ineligible_resumes_are_ignored() {
    let eligible = vec![doc(1, "only this one")];
    let candidates = aggregate(&[hit(Some(99), "only this one", 0.9)], &eligible);
    assert_eq!(candidates.len(), 1);
    assert!(!candidates[0].matched);
}

#[test]
fn test_legacy_hits_resolve_by_content() {
    let eligible = vec![doc(1, "Jane Doe Rust engineer"), doc(2, "John Smith nurse")];
    let candidates = aggregate(&[hit(None, "john smith nurse", 0.6)], &eligible);
    assert_eq!(candidates[0].resume_id, 2);
    assert!(candidates[0].matched);
}

#[tokio::test]
async fn test_retrieve_against_index() {
    let embedder = Arc::new(LazyModel::ready(
        "embedder",
        Arc::new(Embedder::stub().unwrap()),
    ));
    let index = Arc::new(VectorIndex::new(
        Arc::new(MemoryVectorDb::new()),
        embedder,
        "retrieval_test",
    ));
    let eligible = vec![
        doc(1, "Python Django AWS backend engineer"),
        doc(2, "Pediatric nurse with patient care background"),
        doc(3, "Python data scientist, pandas and numpy"),
    ];
    index.index(&eligible).await.unwrap();

    let retriever = Retriever::new(Arc::clone(&index));
    let candidates = retriever
        .retrieve("python django aws", &eligible, 2)
        .await
        .unwrap();

    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].resume_id, 1);
    assert!(candidates.iter().all(|c| (0.0..=1.0).contains(&c.score)));
}

#[tokio::test]
async fn test_retrieve_empty_eligible() {
    let index = Arc::new(VectorIndex::new(
        Arc::new(MemoryVectorDb::new()),
        Arc::new(LazyModel::unavailable("embedder", "unused")),
        "retrieval_test",
    ));
    let candidates = Retriever::new(index).retrieve("q", &[], 5).await.unwrap();
    assert!(candidates.is_empty());
}
