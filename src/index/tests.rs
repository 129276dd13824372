use std::collections::HashSet;

use super::*;

use crate::embedding::Embedder;
use crate::extract::FieldExtractor;
use crate::ingest::{Chunker, Ingestor, ResumeRecord};
use crate::vectordb::MemoryVectorDb;

fn stub_index() -> VectorIndex<MemoryVectorDb> {
    let embedder = Arc::new(LazyModel::ready(
        "embedder",
        Arc::new(Embedder::stub().unwrap()),
    ));
    VectorIndex::new(Arc::new(MemoryVectorDb::new()), embedder, "test_chunks")
}

fn documents() -> Vec<ResumeDocument> {
    Ingestor::default()
        .ingest_all(&[
            ResumeRecord::new(1, "Jane Doe\nPython Django developer with AWS experience"),
            ResumeRecord::new(2, "John Smith\nRegistered nurse, patient care, pediatrics"),
        ])
        .unwrap()
}

#[tokio::test]
async fn test_index_writes_every_chunk() {
    let index = stub_index();
    let written = index.index(&documents()).await.unwrap();

    assert_eq!(written, 2);
    assert_eq!(index.len().await.unwrap(), 2);
}

#[tokio::test]
async fn test_reindex_same_documents_is_noop() {
    let index = stub_index();
    let docs = documents();
    index.index(&docs).await.unwrap();

    assert_eq!(index.index(&docs).await.unwrap(), 0);
    assert_eq!(index.len().await.unwrap(), 2);
}

#[tokio::test]
async fn test_incremental_merge_adds_only_new_chunks() {
    let index = stub_index();
    index.index(&documents()).await.unwrap();

    let more = Ingestor::default()
        .ingest_all(&[ResumeRecord::new(3, "Kubernetes and Terraform engineer")])
        .unwrap();
    assert_eq!(index.index(&more).await.unwrap(), 1);
    assert_eq!(index.len().await.unwrap(), 3);
}

#[tokio::test]
async fn test_changed_text_is_rewritten() {
    let index = stub_index();
    index.index(&documents()).await.unwrap();

    let changed = Ingestor::default()
        .ingest_all(&[ResumeRecord::new(1, "Jane Doe\nNow a Rust engineer")])
        .unwrap();
    assert_eq!(index.index(&changed).await.unwrap(), 1);
    assert_eq!(index.len().await.unwrap(), 2);
}

#[tokio::test]
async fn test_search_empty_index_is_not_indexed() {
    let index = stub_index();
    let err = index.search("python", 5).await.unwrap_err();
    assert!(matches!(err, IndexError::NotIndexed { .. }));
}

#[tokio::test]
async fn test_search_returns_metadata() {
    let index = stub_index();
    index.index(&documents()).await.unwrap();

    let hits = index.search("python django aws", 5).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].resume_id(), Some(1));
    assert_eq!(hits[0].metadata.candidate_name.as_deref(), Some("Jane Doe"));
    assert!(hits[0].text().contains("Django"));
    assert!(hits[0].similarity > hits[1].similarity);
}

#[tokio::test]
async fn test_unavailable_embedder() {
    let index = VectorIndex::new(
        Arc::new(MemoryVectorDb::new()),
        Arc::new(LazyModel::unavailable("embedder", "no weights")),
        "test_chunks",
    );

    let err = index.index(&documents()).await.unwrap_err();
    match err {
        IndexError::EmbedderUnavailable { reason } => assert_eq!(reason, "no weights"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rechunked_resume_drops_stale_chunks() {
    let index = stub_index();
    let text = "Python Django AWS engineer. ".repeat(20);
    let record = [ResumeRecord::new(9, text)];

    let fine = Ingestor::new(FieldExtractor::default(), Chunker::new(100, 10).unwrap())
        .ingest_all(&record)
        .unwrap();
    let fine_chunks = fine[0].chunks.len();
    assert!(fine_chunks > 1);
    assert_eq!(index.index(&fine).await.unwrap(), fine_chunks);
    assert_eq!(index.len().await.unwrap(), fine_chunks as u64);

    let coarse = Ingestor::default().ingest_all(&record).unwrap();
    assert_eq!(coarse[0].chunks.len(), 1);
    index.index(&coarse).await.unwrap();
    assert_eq!(index.len().await.unwrap(), 1);

    let hits = index.search("python", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].metadata.chunk_index, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_merges_and_searches() {
    let index = Arc::new(stub_index());
    let batches: Vec<Vec<ResumeDocument>> = (0..4u64)
        .map(|batch| {
            let records: Vec<ResumeRecord> = (0..5u64)
                .map(|i| {
                    let id = batch * 100 + i;
                    ResumeRecord::new(id, format!("Resume {id}: Python, Rust and AWS engineer"))
                })
                .collect();
            Ingestor::default().ingest_all(&records).unwrap()
        })
        .collect();
    let total_chunks: usize = batches
        .iter()
        .flat_map(|docs| docs.iter().map(|d| d.chunks.len()))
        .sum();
    let known_ids: HashSet<ResumeId> = batches.iter().flatten().map(|d| d.id).collect();

    let writers: Vec<_> = batches
        .into_iter()
        .map(|docs| {
            let index = Arc::clone(&index);
            tokio::spawn(async move { index.index(&docs).await })
        })
        .collect();
    let readers: Vec<_> = (0..8)
        .map(|_| {
            let index = Arc::clone(&index);
            tokio::spawn(async move { index.search("python aws engineer", 50).await })
        })
        .collect();

    let mut written = 0;
    for writer in writers {
        written += writer.await.unwrap().unwrap();
    }
    for reader in readers {
        match reader.await.unwrap() {
            Ok(hits) => {
                for hit in hits {
                    let id = hit.resume_id().unwrap();
                    assert!(known_ids.contains(&id), "hit for unknown resume {id}");
                }
            }
            Err(IndexError::NotIndexed { .. }) => {}
            Err(other) => panic!("search failed during merge: {other:?}"),
        }
    }

    assert_eq!(written, total_chunks);
    assert_eq!(index.len().await.unwrap(), total_chunks as u64);
    let hits = index.search("python aws engineer", 100).await.unwrap();
    assert_eq!(hits.len(), total_chunks);
}
