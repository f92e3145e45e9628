//! Retrieval pipeline orchestrator.
//!
//! [`RagPipeline`] composes an [`EmbeddingProvider`], a [`VectorStore`], and
//! a [`Chunker`] into the two core workflows:
//!
//! - **ingest**: chunk → embed (bounded retry per chunk) → insert → persist
//! - **retrieve**: embed question → search → assemble a context block
//!
//! Per-chunk embedding failures during ingestion are isolated: the failing
//! chunk is reported in the [`IngestReport`] and the rest of the batch
//! continues. An empty retrieval is a legitimate [`Grounding::Empty`]
//! outcome, not an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Outcome of ingesting one document or batch: which chunks made it into
/// the collection and which failed to embed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// IDs of chunks that were embedded and stored.
    pub succeeded: Vec<String>,
    /// Chunks that could not be embedded after the configured attempts.
    pub failed: Vec<ChunkFailure>,
}

/// A chunk that failed to embed, with the final error text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkFailure {
    /// ID of the failing chunk.
    pub chunk_id: String,
    /// Description of the last embedding failure.
    pub error: String,
}

impl IngestReport {
    /// True when every chunk was stored.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn merge(&mut self, other: IngestReport) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
    }
}

/// Result of grounding a question against a collection.
///
/// `Empty` means no stored chunk cleared the similarity threshold. It is a
/// legitimate outcome ("cannot ground an answer"), distinct from a failing
/// embedding or storage backend, which surface as [`RagError`]s.
#[derive(Debug, Clone)]
pub enum Grounding {
    /// Relevant chunks were found.
    Relevant {
        /// Chunk texts in rank order, separated by a blank line.
        context: String,
        /// The ranked results, for citation purposes.
        results: Vec<SearchResult>,
    },
    /// No relevant context exists for the question.
    Empty,
}

impl Grounding {
    /// True when no relevant context was found.
    pub fn is_empty(&self) -> bool {
        matches!(self, Grounding::Empty)
    }
}

/// The retrieval pipeline orchestrator.
///
/// Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Create a named collection sized to the embedding provider's
    /// dimensionality. No-op if it already exists.
    pub async fn create_collection(&self, name: &str) -> Result<()> {
        self.vector_store.create_collection(name, self.embedding_provider.dimensions()).await
    }

    /// Delete a named collection and its durable state.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        self.vector_store.delete_collection(name).await
    }

    /// Embed one chunk with a bounded number of attempts.
    async fn embed_with_retry(&self, text: &str) -> Result<Vec<f32>> {
        let mut last_err = RagError::Pipeline("embedding was never attempted".to_string());
        for attempt in 1..=self.config.max_embed_attempts {
            match self.embedding_provider.embed(text).await {
                Ok(vector) => return Ok(vector),
                Err(e) => {
                    warn!(attempt, max = self.config.max_embed_attempts, error = %e,
                        "embedding attempt failed");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    /// Ingest a single document: chunk → embed → insert → persist.
    ///
    /// Embedding failures are isolated per chunk; every chunk that embeds
    /// successfully is stored even when siblings fail. The report lists
    /// both groups.
    ///
    /// # Errors
    ///
    /// Returns an error only when the vector store itself fails (insert or
    /// persist); embedding failures are reported, not raised.
    pub async fn ingest(&self, collection: &str, document: &Document) -> Result<IngestReport> {
        self.create_collection(collection).await?;

        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(IngestReport::default());
        }

        let mut report = IngestReport::default();
        let mut embedded = Vec::with_capacity(chunks.len());
        for mut chunk in chunks {
            match self.embed_with_retry(&chunk.text).await {
                Ok(vector) => {
                    chunk.embedding = vector;
                    report.succeeded.push(chunk.id.clone());
                    embedded.push(chunk);
                }
                Err(e) => {
                    error!(chunk.id = %chunk.id, error = %e, "chunk failed to embed");
                    report.failed.push(ChunkFailure { chunk_id: chunk.id, error: e.to_string() });
                }
            }
        }

        if !embedded.is_empty() {
            self.vector_store.insert(collection, &embedded).await?;
        }
        self.vector_store.persist().await?;

        info!(
            document.id = %document.id,
            stored = report.succeeded.len(),
            failed = report.failed.len(),
            "ingested document"
        );
        Ok(report)
    }

    /// Ingest multiple documents, aggregating their reports.
    pub async fn ingest_batch(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        for document in documents {
            report.merge(self.ingest(collection, document).await?);
        }
        Ok(report)
    }

    /// Ground a question against a collection: embed → search → assemble.
    ///
    /// Returns [`Grounding::Relevant`] with the context block and the ranked
    /// results, or [`Grounding::Empty`] when nothing clears the configured
    /// similarity threshold.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if `k == 0`, or the underlying
    /// error when the embedding provider or vector store fails.
    pub async fn retrieve(&self, collection: &str, question: &str, k: usize) -> Result<Grounding> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be greater than zero".to_string()));
        }

        let query_embedding = self.embedding_provider.embed(question).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            e
        })?;

        let results = self.vector_store.search(collection, &query_embedding, k).await?;

        let threshold = self.config.similarity_threshold;
        let results: Vec<SearchResult> =
            results.into_iter().filter(|r| r.score >= threshold).collect();

        if results.is_empty() {
            info!(collection, "no relevant context for question");
            return Ok(Grounding::Empty);
        }

        let context =
            results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");
        info!(collection, result_count = results.len(), "grounded question");
        Ok(Grounding::Relevant { context, results })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields are required. Call [`build()`](RagPipelineBuilder::build) to
/// validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;

        Ok(RagPipeline { config, embedding_provider, vector_store, chunker })
    }
}
