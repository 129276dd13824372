use super::*;

#[test]
fn test_reranker_config_default_uses_hub_model() {
    let config = RerankerConfig::default();
    assert_eq!(
        config.source,
        ModelSource::Hub(crate::constants::DEFAULT_RERANKER_MODEL.to_string())
    );
    assert_eq!(config.max_seq_len, MAX_SEQ_LEN);
}

#[test]
fn test_reranker_config_zero_seq_len_rejected() {
    let config = RerankerConfig {
        max_seq_len: 0,
        ..RerankerConfig::stub()
    };
    let err = Reranker::load(config).unwrap_err();
    assert!(matches!(err, RerankerError::InvalidConfig { .. }));
}

#[test]
fn test_disabled_reranker_is_not_available() {
    let err = Reranker::load(RerankerConfig::disabled()).unwrap_err();
    assert!(matches!(err, RerankerError::NotAvailable { .. }));
}

#[test]
fn test_local_dir_without_weights_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), "{}").unwrap();
    let config = RerankerConfig::new(&dir.path().to_string_lossy());

    let err = Reranker::load(config).unwrap_err();
    assert!(matches!(err, RerankerError::ModelLoadFailed { .. }));
}

#[test]
fn test_stub_reranker_prefers_overlapping_candidate() {
    let reranker = Reranker::stub().unwrap();
    assert!(!reranker.is_model_loaded());

    let query = "python django aws backend";
    let good = reranker
        .score(query, "Backend engineer: Python, Django and AWS")
        .unwrap();
    let bad = reranker
        .score(query, "Pastry chef with French cuisine training")
        .unwrap();

    assert!(good > bad);
    assert!(good > 0.0);
    assert!(bad < 0.0);
}

#[test]
fn test_stub_reranker_rerank_orders_best_first() {
    let reranker = Reranker::stub().unwrap();
    let candidates = [
        "retail associate",
        "rust systems engineer tokio",
        "rust developer",
    ];

    let ranked = reranker
        .rerank("rust systems engineer tokio", &candidates)
        .unwrap();

    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].0, 1);
    assert_eq!(ranked[2].0, 0);
}

#[test]
fn test_stub_reranker_empty_query() {
    let reranker = Reranker::stub().unwrap();
    assert_eq!(reranker.score("", "anything").unwrap(), -4.0);
}
