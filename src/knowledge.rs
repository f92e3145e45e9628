//! Outer entry points for document-grounded study sessions.
//!
//! [`KnowledgeBase`] owns one named collection and wraps the pipeline with
//! the calling convention the surrounding application expects: ingestion
//! entry points return a plain success flag with failures logged, and
//! [`query`](KnowledgeBase::query) answers with fixed sentinel strings for
//! the two legitimate empty outcomes (no documents, no relevant context)
//! while real service faults surface as errors.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::document::Document;
use crate::error::Result;
use crate::generation::Generator;
use crate::loader::{self, DocumentKind};
use crate::pipeline::{Grounding, RagPipeline};

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Answer returned when the collection holds no documents at all.
pub const NO_DOCUMENTS_ANSWER: &str =
    "No documents have been uploaded yet. Please upload study materials first.";

/// Answer returned when retrieval finds nothing relevant to the question.
pub const NO_RELEVANT_CONTEXT_ANSWER: &str = "I couldn't find relevant information in your \
     uploaded documents. Please try rephrasing your question or upload more materials.";

/// A named collection of study materials with grounded question answering.
pub struct KnowledgeBase {
    pipeline: Arc<RagPipeline>,
    generator: Arc<dyn Generator>,
    collection: String,
}

impl KnowledgeBase {
    /// Create a knowledge base over the given collection name.
    pub fn new(
        pipeline: Arc<RagPipeline>,
        generator: Arc<dyn Generator>,
        collection: impl Into<String>,
    ) -> Self {
        Self { pipeline, generator, collection: collection.into() }
    }

    /// The collection name this knowledge base owns.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Add a document from a file. Returns `true` when every chunk was
    /// stored; failures are logged, never raised.
    pub async fn add_document(&self, path: impl AsRef<Path>, kind: DocumentKind) -> bool {
        let document = match kind {
            DocumentKind::Text => loader::load_text(path),
            #[cfg(feature = "pdf")]
            DocumentKind::Pdf => loader::load_pdf(path),
            #[cfg(not(feature = "pdf"))]
            DocumentKind::Pdf => {
                error!("cannot load PDF: crate built without the 'pdf' feature");
                return false;
            }
        };
        let document = match document {
            Ok(doc) => doc,
            Err(e) => {
                error!(error = %e, "failed to load document");
                return false;
            }
        };
        self.ingest_logged(&document).await
    }

    /// Add raw text content directly. Returns `true` when every chunk was
    /// stored.
    pub async fn add_text(&self, text: impl Into<String>, metadata: HashMap<String, String>) -> bool {
        let document = loader::document_from_text(text, metadata);
        self.ingest_logged(&document).await
    }

    async fn ingest_logged(&self, document: &Document) -> bool {
        match self.pipeline.ingest(&self.collection, document).await {
            Ok(report) if report.is_complete() => true,
            Ok(report) => {
                warn!(
                    document.id = %document.id,
                    stored = report.succeeded.len(),
                    failed = report.failed.len(),
                    "document partially ingested"
                );
                false
            }
            Err(e) => {
                error!(document.id = %document.id, error = %e, "ingestion failed");
                false
            }
        }
    }

    /// Answer a question from the uploaded documents, retrieving the `k`
    /// most relevant chunks as context.
    ///
    /// The two legitimate empty outcomes map to fixed sentinel answers:
    /// [`NO_DOCUMENTS_ANSWER`] when the collection is empty and
    /// [`NO_RELEVANT_CONTEXT_ANSWER`] when nothing relevant is found.
    ///
    /// # Errors
    ///
    /// Embedding, search, or generation faults surface as the underlying
    /// [`RagError`](crate::RagError) so callers can tell "no results" apart
    /// from "service unreachable".
    pub async fn query(&self, question: &str, k: usize) -> Result<String> {
        if self.pipeline.vector_store().count(&self.collection).await? == 0 {
            info!(collection = %self.collection, "query against empty collection");
            return Ok(NO_DOCUMENTS_ANSWER.to_string());
        }

        match self.pipeline.retrieve(&self.collection, question, k).await? {
            Grounding::Empty => Ok(NO_RELEVANT_CONTEXT_ANSWER.to_string()),
            Grounding::Relevant { context, results } => {
                info!(
                    collection = %self.collection,
                    chunks = results.len(),
                    "generating grounded answer"
                );
                self.generator.generate(question, &context).await
            }
        }
    }

    /// Answer with the default `k` of [`DEFAULT_TOP_K`].
    pub async fn ask(&self, question: &str) -> Result<String> {
        self.query(question, DEFAULT_TOP_K).await
    }

    /// Retrieve the `k` most relevant chunk texts with their similarity
    /// scores. Returns an empty list on any failure (logged).
    pub async fn query_with_scores(&self, question: &str, k: usize) -> Vec<(String, f32)> {
        match self.pipeline.retrieve(&self.collection, question, k).await {
            Ok(Grounding::Relevant { results, .. }) => {
                results.into_iter().map(|r| (r.chunk.text, r.score)).collect()
            }
            Ok(Grounding::Empty) => Vec::new(),
            Err(e) => {
                error!(error = %e, "scored query failed");
                Vec::new()
            }
        }
    }

    /// Number of chunks stored in the collection (0 on failure, logged).
    pub async fn document_count(&self) -> usize {
        match self.pipeline.vector_store().count(&self.collection).await {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, "count failed");
                0
            }
        }
    }

    /// Remove every stored chunk from this collection, leaving other
    /// collections untouched. Returns `true` on success.
    pub async fn clear(&self) -> bool {
        let store = self.pipeline.vector_store();
        let result = async {
            store.clear(&self.collection).await?;
            store.persist().await
        }
        .await;
        match result {
            Ok(()) => {
                info!(collection = %self.collection, "cleared knowledge base");
                true
            }
            Err(e) => {
                error!(error = %e, "failed to clear knowledge base");
                false
            }
        }
    }
}
