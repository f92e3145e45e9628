//! End-to-end scenarios for the knowledge base surface: ingest → query with
//! sentinel answers, partial-failure isolation, and grounded generation.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{EchoGenerator, KeywordEmbedder, POISON};
use study_rag::{
    DocumentKind, FixedSizeChunker, JsonVectorStore, KnowledgeBase, NO_DOCUMENTS_ANSWER,
    NO_RELEVANT_CONTEXT_ANSWER, RagConfig, RagError, RagPipeline, document_from_text,
};

// Segments sized to exactly one chunk each (24 chars, no overlap).
const LIGHT: &str = "light light light light ";
const CELL: &str = "cell cell cell cell xyz ";
const WATER: &str = "water water water water ";

fn build_pipeline(dir: &tempfile::TempDir, threshold: f32) -> Arc<RagPipeline> {
    let config = RagConfig::builder()
        .chunk_size(24)
        .chunk_overlap(0)
        .top_k(4)
        .similarity_threshold(threshold)
        .build()
        .unwrap();
    Arc::new(
        RagPipeline::builder()
            .config(config)
            .embedding_provider(Arc::new(KeywordEmbedder))
            .vector_store(Arc::new(JsonVectorStore::open(dir.path()).unwrap()))
            .chunker(Arc::new(FixedSizeChunker::new(24, 0)))
            .build()
            .unwrap(),
    )
}

fn build_kb(dir: &tempfile::TempDir, threshold: f32) -> KnowledgeBase {
    KnowledgeBase::new(build_pipeline(dir, threshold), Arc::new(EchoGenerator), "study_materials")
}

#[tokio::test]
async fn empty_collection_answers_with_no_documents_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let kb = build_kb(&dir, 0.0);
    let answer = kb.query("anything", 4).await.unwrap();
    assert_eq!(answer, NO_DOCUMENTS_ANSWER);
}

#[tokio::test]
async fn irrelevant_question_answers_with_no_context_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let kb = build_kb(&dir, 0.25);
    assert!(kb.add_text(format!("{LIGHT}{CELL}{WATER}"), HashMap::new()).await);

    // "energy" matches no stored chunk, so every score falls below the
    // threshold.
    let answer = kb.query("energy", 4).await.unwrap();
    assert_eq!(answer, NO_RELEVANT_CONTEXT_ANSWER);
}

#[tokio::test]
async fn three_chunks_with_k_two_returns_the_two_most_similar() {
    let dir = tempfile::tempdir().unwrap();
    let kb = build_kb(&dir, 0.0);
    assert!(kb.add_text(format!("{LIGHT}{CELL}{WATER}"), HashMap::new()).await);
    assert_eq!(kb.document_count().await, 3);

    let scored = kb.query_with_scores("light", 2).await;
    assert_eq!(scored.len(), 2);
    // The light chunk is a perfect match; the tie at zero goes to the
    // earlier-inserted cell chunk.
    assert_eq!(scored[0].0, LIGHT);
    assert!((scored[0].1 - 1.0).abs() < 1e-6);
    assert_eq!(scored[1].0, CELL);
    assert!(scored[0].1 >= scored[1].1);
}

#[tokio::test]
async fn grounded_answer_hands_ranked_context_to_the_generator() {
    let dir = tempfile::tempdir().unwrap();
    let kb = build_kb(&dir, 0.25);
    assert!(kb.add_text(format!("{LIGHT}{CELL}{WATER}"), HashMap::new()).await);

    let answer = kb.query("light", 4).await.unwrap();
    assert!(answer.starts_with("Q: light\n"));
    assert!(answer.contains(LIGHT));
    // Below-threshold chunks stay out of the context block.
    assert!(!answer.contains(CELL));
}

#[tokio::test]
async fn embedding_failure_is_isolated_to_the_failing_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(&dir, 0.0);

    let poisoned = format!("{LIGHT}{POISON} cell cell aaaa {WATER}");
    let document = document_from_text(poisoned, HashMap::new());
    let report = pipeline.ingest("study_materials", &document).await.unwrap();

    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].chunk_id.ends_with("_1"));
    assert!(!report.is_complete());

    // The surviving chunks were stored and are searchable.
    assert_eq!(pipeline.vector_store().count("study_materials").await.unwrap(), 2);
}

#[tokio::test]
async fn add_text_reports_partial_ingestion_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let kb = build_kb(&dir, 0.0);
    let poisoned = format!("{LIGHT}{POISON} cell cell aaaa ");
    assert!(!kb.add_text(poisoned, HashMap::new()).await);
    // The clean chunk still made it in.
    assert_eq!(kb.document_count().await, 1);
}

#[tokio::test]
async fn add_document_ingests_a_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let docs = tempfile::tempdir().unwrap();
    let path = docs.path().join("notes.txt");
    std::fs::write(&path, format!("{LIGHT}{WATER}")).unwrap();

    let kb = build_kb(&dir, 0.0);
    assert!(kb.add_document(&path, DocumentKind::Text).await);
    assert_eq!(kb.document_count().await, 2);
}

#[tokio::test]
async fn clear_resets_the_collection_to_the_no_documents_answer() {
    let dir = tempfile::tempdir().unwrap();
    let kb = build_kb(&dir, 0.0);
    assert!(kb.add_text(LIGHT, HashMap::new()).await);
    assert_eq!(kb.document_count().await, 1);

    assert!(kb.clear().await);
    assert_eq!(kb.document_count().await, 0);
    let answer = kb.query("light", 4).await.unwrap();
    assert_eq!(answer, NO_DOCUMENTS_ANSWER);
}

#[tokio::test]
async fn query_with_zero_k_is_an_error_not_a_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let kb = build_kb(&dir, 0.0);
    assert!(kb.add_text(LIGHT, HashMap::new()).await);

    let err = kb.query("light", 0).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidArgument(_)));
}

#[tokio::test]
async fn ingest_batch_merges_reports_across_documents() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build_pipeline(&dir, 0.0);

    let documents = vec![
        document_from_text(LIGHT, HashMap::new()),
        document_from_text(WATER, HashMap::new()),
    ];
    let report = pipeline.ingest_batch("study_materials", &documents).await.unwrap();
    assert_eq!(report.succeeded.len(), 2);
    assert!(report.is_complete());
}
