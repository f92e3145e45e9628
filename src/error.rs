//! Error types for the `study-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
///
/// "No relevant context" is deliberately not an error: it is the
/// [`Grounding::Empty`](crate::pipeline::Grounding) outcome, so callers can
/// distinguish an empty result from an unreachable service.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding backend was unreachable or rejected the request.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation backend was unreachable or rejected the request.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector's length did not match the collection's fixed dimension.
    #[error("Dimension mismatch: collection expects {expected}, vector has {actual}")]
    DimensionMismatch {
        /// The dimension the collection was created with.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },

    /// A caller-supplied argument was malformed (zero `k`, empty path, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A document could not be loaded or its text extracted.
    #[error("Document load error: {0}")]
    Load(String),

    /// An error occurred during document chunking.
    #[error("Chunking error: {0}")]
    Chunking(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// A filesystem error while persisting or reloading a collection.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A serialization error while persisting or reloading a collection.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
