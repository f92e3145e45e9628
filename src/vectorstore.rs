//! Vector store trait for storing and searching embedded chunks.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for embedded chunks with similarity search.
///
/// Implementations manage named, mutually isolated collections of
/// [`Chunk`]s: operations on one collection never affect another. A
/// collection accumulates records across ingestions until explicitly
/// cleared or deleted.
///
/// # Example
///
/// ```rust,ignore
/// use study_rag::{VectorStore, JsonVectorStore};
///
/// let store = JsonVectorStore::open("./collections")?;
/// store.create_collection("study_materials", 1536).await?;
/// store.insert("study_materials", &chunks).await?;
/// let results = store.search("study_materials", &query_embedding, 4).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection with a fixed vector dimension.
    /// No-op if the collection already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and its durable state, if any.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Append chunks to a collection in order. Chunks must have embeddings
    /// of the collection's dimension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch)
    /// if any chunk's embedding has the wrong length; in that case the
    /// collection is left unchanged.
    async fn insert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `k` most similar chunks to the given embedding.
    ///
    /// Results are ordered by descending similarity; ties are broken by
    /// insertion order (earlier record wins). A `k` larger than the record
    /// count returns every record; an unknown or empty collection returns
    /// an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`](crate::RagError::InvalidArgument)
    /// if `k == 0`.
    async fn search(&self, collection: &str, embedding: &[f32], k: usize)
    -> Result<Vec<SearchResult>>;

    /// Return the number of records in a collection (0 if unknown).
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Remove every record from a collection, leaving other collections
    /// untouched. The collection itself survives with a count of zero.
    async fn clear(&self, collection: &str) -> Result<()>;

    /// Flush all pending changes to durable storage.
    async fn persist(&self) -> Result<()>;
}
