//! Generation collaborator seam.
//!
//! Turning a context block plus a question into prose is delegated to an
//! external language-model call behind the [`Generator`] trait. The
//! retrieval core never fabricates an answer: when grounding fails, the
//! generator is not called at all.

use async_trait::async_trait;

use crate::error::Result;

/// A collaborator that produces a grounded answer from retrieved context.
///
/// Implementations wrap a hosted language model. The contract is that the
/// answer must be based on `context`; prompt construction is the
/// implementation's concern.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer to `question` grounded in `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`](crate::RagError::Generation) when
    /// the backend is unreachable or rejects the request.
    async fn generate(&self, question: &str, context: &str) -> Result<String>;
}
