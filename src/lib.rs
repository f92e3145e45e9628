//! # study-rag
//!
//! Document-grounded retrieval for study assistants: split uploaded
//! materials into overlapping chunks, embed them through a hosted provider,
//! store the vectors in a persistent named collection, and ground tutoring
//! answers in the most similar chunks.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use study_rag::{
//!     DocumentKind, FixedSizeChunker, JsonVectorStore, KnowledgeBase, RagConfig, RagPipeline,
//! };
//! use study_rag::openai::{OpenAIEmbeddingProvider, OpenAIGenerator};
//!
//! let config = RagConfig::default();
//! let pipeline = Arc::new(
//!     RagPipeline::builder()
//!         .config(config.clone())
//!         .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!         .vector_store(Arc::new(JsonVectorStore::open("./collections")?))
//!         .chunker(Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)))
//!         .build()?,
//! );
//! let kb = KnowledgeBase::new(pipeline, Arc::new(OpenAIGenerator::from_env()?), "study_materials");
//!
//! kb.add_document("notes.pdf", DocumentKind::Pdf).await;
//! let answer = kb.ask("What is photosynthesis?").await?;
//! ```
//!
//! ## Features
//!
//! - `openai` — hosted embedding and generation providers over `reqwest`
//! - `pdf` — PDF text extraction for [`DocumentKind::Pdf`]

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod knowledge;
pub mod loader;
pub mod pipeline;
pub mod store;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::Generator;
pub use knowledge::{
    DEFAULT_TOP_K, KnowledgeBase, NO_DOCUMENTS_ANSWER, NO_RELEVANT_CONTEXT_ANSWER,
};
pub use loader::{DocumentKind, document_from_text, load_text};
pub use pipeline::{ChunkFailure, Grounding, IngestReport, RagPipeline, RagPipelineBuilder};
pub use store::JsonVectorStore;
pub use vectorstore::VectorStore;

#[cfg(feature = "pdf")]
pub use loader::load_pdf;
