use std::collections::HashMap;

use half::f16;
use qdrant_client::qdrant::Value;

use super::client::VectorDbClient;
use super::error::VectorDbError;
use super::memory::{MemoryVectorDb, cosine_similarity_f16_f32, f32_to_f16_vec};
use super::model::{ChunkMetadata, ChunkPoint};
use super::WriteConsistency;

const TEST_COLLECTION: &str = "test_collection";
const TEST_VECTOR_SIZE: u64 = 4;

fn metadata(resume_id: u64, chunk_index: usize) -> ChunkMetadata {
    ChunkMetadata {
        resume_id: Some(resume_id),
        candidate_name: Some(format!("Candidate {resume_id}")),
        chunk_index,
        text: format!("chunk {chunk_index} of resume {resume_id}"),
    }
}

fn point(id: u64, vector: [f32; 4]) -> ChunkPoint {
    ChunkPoint::new(id, vector.to_vec(), metadata(id, 0))
}

async fn seeded() -> MemoryVectorDb {
    let db = MemoryVectorDb::new();
    db.ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();
    db.upsert_points(
        TEST_COLLECTION,
        vec![
            point(1, [1.0, 0.0, 0.0, 0.0]),
            point(2, [0.0, 1.0, 0.0, 0.0]),
            point(3, [0.7, 0.7, 0.0, 0.0]),
        ],
        WriteConsistency::Strong,
    )
    .await
    .unwrap();
    db
}

#[test]
fn test_write_consistency_maps_to_wait() {
    assert!(bool::from(WriteConsistency::Strong));
    assert!(!bool::from(WriteConsistency::Eventual));
}

#[test]
fn test_payload_conversion_preserves_metadata() {
    let meta = metadata(42, 3);
    assert_eq!(ChunkMetadata::from_payload(&meta.to_payload()), meta);
}

#[test]
fn test_payload_without_resume_id() {
    let mut payload: HashMap<String, Value> = HashMap::new();
    payload.insert("text".to_string(), "legacy chunk".to_string().into());

    let meta = ChunkMetadata::from_payload(&payload);
    assert_eq!(meta.resume_id, None);
    assert_eq!(meta.candidate_name, None);
    assert_eq!(meta.chunk_index, 0);
    assert_eq!(meta.text, "legacy chunk");
}

#[test]
fn test_cosine_similarity_f16_f32() {
    let a = f32_to_f16_vec(&[1.0, 0.0]);
    assert!((cosine_similarity_f16_f32(&a, &[1.0, 0.0]) - 1.0).abs() < 1e-3);
    assert!(cosine_similarity_f16_f32(&a, &[0.0, 1.0]).abs() < 1e-3);
    assert_eq!(cosine_similarity_f16_f32(&a, &[1.0]), 0.0);
    assert_eq!(cosine_similarity_f16_f32(&[f16::ZERO, f16::ZERO], &[1.0, 0.0]), 0.0);
}

#[tokio::test]
async fn test_ensure_collection_idempotent() {
    let db = MemoryVectorDb::new();
    db.ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();
    db.ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();

    assert_eq!(db.len(TEST_COLLECTION), Some(0));
    assert_eq!(db.point_count(TEST_COLLECTION).await.unwrap(), Some(0));
}

#[tokio::test]
async fn test_ensure_collection_rejects_other_dimension() {
    let db = MemoryVectorDb::new();
    db.ensure_collection(TEST_COLLECTION, 4).await.unwrap();

    let err = db.ensure_collection(TEST_COLLECTION, 8).await.unwrap_err();
    assert!(matches!(
        err,
        VectorDbError::InvalidDimension {
            expected: 4,
            actual: 8
        }
    ));
}

#[tokio::test]
async fn test_point_count_missing_collection() {
    let db = MemoryVectorDb::new();
    assert_eq!(db.point_count("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_upsert_overwrites_same_id() {
    let db = seeded().await;
    db.upsert_points(
        TEST_COLLECTION,
        vec![point(1, [0.0, 0.0, 1.0, 0.0])],
        WriteConsistency::Strong,
    )
    .await
    .unwrap();

    assert_eq!(db.len(TEST_COLLECTION), Some(3));
    let hits = db
        .search(TEST_COLLECTION, vec![0.0, 0.0, 1.0, 0.0], 1)
        .await
        .unwrap();
    assert_eq!(hits[0].id, 1);
}

#[tokio::test]
async fn test_upsert_wrong_dimension_is_atomic() {
    let db = seeded().await;
    let err = db
        .upsert_points(
            TEST_COLLECTION,
            vec![
                point(10, [1.0, 1.0, 1.0, 1.0]),
                ChunkPoint::new(11, vec![1.0, 2.0], metadata(11, 0)),
            ],
            WriteConsistency::Strong,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, VectorDbError::InvalidDimension { .. }));
    assert_eq!(db.len(TEST_COLLECTION), Some(3));
}

#[tokio::test]
async fn test_upsert_missing_collection() {
    let db = MemoryVectorDb::new();
    let err = db
        .upsert_points("nope", vec![point(1, [1.0; 4])], WriteConsistency::Eventual)
        .await
        .unwrap_err();
    assert!(matches!(err, VectorDbError::CollectionNotFound { .. }));
}

#[tokio::test]
async fn test_search_orders_by_similarity() {
    let db = seeded().await;
    let hits = db
        .search(TEST_COLLECTION, vec![1.0, 0.1, 0.0, 0.0], 10)
        .await
        .unwrap();

    let ids: Vec<u64> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![1, 3, 2]);
    assert_eq!(hits[0].metadata.resume_id, Some(1));
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_search_respects_limit() {
    let db = seeded().await;
    let hits = db
        .search(TEST_COLLECTION, vec![1.0, 1.0, 0.0, 0.0], 2)
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, 3);
}

#[tokio::test]
async fn test_search_limit_carries_metadata_of_top_hits() {
    let db = seeded().await;
    db.upsert_points(
        TEST_COLLECTION,
        vec![point(5, [1.0, 0.0, 0.0, 0.0]), point(4, [1.0, 0.0, 0.0, 0.0])],
        WriteConsistency::Strong,
    )
    .await
    .unwrap();

    let hits = db
        .search(TEST_COLLECTION, vec![1.0, 0.0, 0.0, 0.0], 3)
        .await
        .unwrap();

    let ids: Vec<u64> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![1, 4, 5]);
    for hit in &hits {
        assert_eq!(hit.metadata, metadata(hit.id, 0));
    }
}

#[tokio::test]
async fn test_delete_points_removes_only_named_ids() {
    let db = seeded().await;
    db.delete_points(TEST_COLLECTION, vec![2, 99], WriteConsistency::Strong)
        .await
        .unwrap();

    assert_eq!(db.len(TEST_COLLECTION), Some(2));
    let hits = db
        .search(TEST_COLLECTION, vec![0.0, 1.0, 0.0, 0.0], 10)
        .await
        .unwrap();
    assert!(hits.iter().all(|h| h.id != 2));
}

#[tokio::test]
async fn test_delete_points_missing_collection() {
    let db = MemoryVectorDb::new();
    let err = db
        .delete_points("missing", vec![1], WriteConsistency::Strong)
        .await
        .unwrap_err();
    assert!(matches!(err, VectorDbError::CollectionNotFound { .. }));
}

#[tokio::test]
async fn test_search_wrong_query_dimension() {
    let db = seeded().await;
    let err = db
        .search(TEST_COLLECTION, vec![1.0, 0.0], 2)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VectorDbError::InvalidDimension {
            expected: 4,
            actual: 2
        }
    ));
}

#[tokio::test]
async fn test_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vectors.json");

    let db = seeded().await;
    db.save_snapshot(&path).unwrap();

    let restored = MemoryVectorDb::load_snapshot(&path).unwrap();
    assert_eq!(restored.collection_names(), vec![TEST_COLLECTION.to_string()]);
    assert_eq!(restored.len(TEST_COLLECTION), Some(3));

    let hits = restored
        .search(TEST_COLLECTION, vec![0.0, 1.0, 0.0, 0.0], 1)
        .await
        .unwrap();
    assert_eq!(hits[0].id, 2);
    assert_eq!(hits[0].metadata, metadata(2, 0));
}

#[test]
fn test_open_or_empty_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = MemoryVectorDb::open_or_empty(&dir.path().join("absent.json")).unwrap();
    assert!(db.collection_names().is_empty());
}

#[test]
fn test_load_snapshot_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, b"not json").unwrap();

    assert!(matches!(
        MemoryVectorDb::load_snapshot(&path),
        Err(VectorDbError::SnapshotFailed { .. })
    ));
}
