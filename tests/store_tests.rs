//! Contract tests for the JSON-persisted vector store: dimension checks,
//! search ordering, clear semantics, collection isolation, and restart
//! determinism.

mod common;

use common::chunk;
use study_rag::{JsonVectorStore, RagError, VectorStore};

fn open_store(dir: &tempfile::TempDir) -> JsonVectorStore {
    JsonVectorStore::open(dir.path()).unwrap()
}

#[tokio::test]
async fn wrong_dimension_insert_fails_and_leaves_collection_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.create_collection("docs", 3).await.unwrap();

    let batch = vec![chunk("good", vec![1.0, 0.0, 0.0]), chunk("bad", vec![1.0, 0.0])];
    let err = store.insert("docs", &batch).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2 }));

    // Atomicity: the valid chunk in the same batch was not stored either.
    assert_eq!(store.count("docs").await.unwrap(), 0);
}

#[tokio::test]
async fn search_with_k_zero_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.create_collection("docs", 2).await.unwrap();

    let err = store.search("docs", &[1.0, 0.0], 0).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidArgument(_)));
}

#[tokio::test]
async fn search_with_k_beyond_count_returns_every_record_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.create_collection("docs", 2).await.unwrap();
    store
        .insert(
            "docs",
            &[
                chunk("a", vec![1.0, 0.0]),
                chunk("b", vec![0.0, 1.0]),
                chunk("c", vec![0.7, 0.7]),
            ],
        )
        .await
        .unwrap();

    let results = store.search("docs", &[1.0, 0.0], 10).await.unwrap();
    assert_eq!(results.len(), 3);

    let mut ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b", "c"]);

    for window in results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
}

#[tokio::test]
async fn equal_scores_break_ties_by_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.create_collection("docs", 2).await.unwrap();
    // Identical embeddings, so every score ties; earlier insert must win.
    store
        .insert(
            "docs",
            &[
                chunk("first", vec![0.6, 0.8]),
                chunk("second", vec![0.6, 0.8]),
                chunk("third", vec![0.6, 0.8]),
            ],
        )
        .await
        .unwrap();

    let results = store.search("docs", &[0.6, 0.8], 2).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.id, "first");
    assert_eq!(results[1].chunk.id, "second");
}

#[tokio::test]
async fn clear_empties_only_the_named_collection() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.create_collection("biology", 2).await.unwrap();
    store.create_collection("physics", 2).await.unwrap();
    store.insert("biology", &[chunk("b1", vec![1.0, 0.0])]).await.unwrap();
    store.insert("physics", &[chunk("p1", vec![0.0, 1.0])]).await.unwrap();

    store.clear("biology").await.unwrap();

    assert_eq!(store.count("biology").await.unwrap(), 0);
    assert_eq!(store.count("physics").await.unwrap(), 1);

    // Searching a cleared collection is an empty result, never an error.
    let results = store.search("biology", &[1.0, 0.0], 4).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn unknown_collection_searches_empty_and_counts_zero() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    assert_eq!(store.count("nope").await.unwrap(), 0);
    assert!(store.search("nope", &[1.0], 4).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_collection_is_idempotent_but_rejects_dimension_change() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.create_collection("docs", 8).await.unwrap();
    store.create_collection("docs", 8).await.unwrap();
    let err = store.create_collection("docs", 16).await.unwrap_err();
    assert!(matches!(err, RagError::VectorStore { .. }));
}

#[tokio::test]
async fn persisted_store_reloads_with_identical_search_results() {
    let dir = tempfile::tempdir().unwrap();

    let before = {
        let store = open_store(&dir);
        store.create_collection("docs", 3).await.unwrap();
        store
            .insert(
                "docs",
                &[
                    chunk("x", vec![0.9, 0.1, 0.3]),
                    chunk("y", vec![0.2, 0.8, 0.1]),
                    chunk("z", vec![0.4, 0.4, 0.4]),
                ],
            )
            .await
            .unwrap();
        store.persist().await.unwrap();
        store.search("docs", &[0.5, 0.5, 0.5], 3).await.unwrap()
    };

    // Fresh process: reopen from the same directory.
    let store = open_store(&dir);
    assert_eq!(store.count("docs").await.unwrap(), 3);
    let after = store.search("docs", &[0.5, 0.5, 0.5], 3).await.unwrap();

    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.chunk, a.chunk);
        // Bit-identical ranking, not just approximately equal.
        assert_eq!(b.score.to_bits(), a.score.to_bits());
    }
}

#[tokio::test]
async fn delete_collection_removes_durable_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store.create_collection("docs", 2).await.unwrap();
    store.insert("docs", &[chunk("a", vec![1.0, 0.0])]).await.unwrap();
    store.persist().await.unwrap();
    assert!(dir.path().join("docs.json").exists());

    store.delete_collection("docs").await.unwrap();
    assert!(!dir.path().join("docs.json").exists());

    // A reopened store no longer sees the collection.
    let reopened = open_store(&dir);
    assert_eq!(reopened.count("docs").await.unwrap(), 0);
}
