//! Shared test doubles: a deterministic keyword embedder and an echoing
//! generator.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use study_rag::{Chunk, EmbeddingProvider, Generator, RagError, Result};

/// Dimension of the test embedding space.
pub const DIM: usize = 4;

/// One axis per keyword; embeddings count keyword occurrences.
const KEYWORDS: [&str; 4] = ["cell", "energy", "light", "water"];

/// Marker that makes [`KeywordEmbedder`] fail, for failure-isolation tests.
pub const POISON: &str = "!!fail!!";

/// A deterministic embedder mapping text onto keyword-count vectors.
pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains(POISON) {
            return Err(RagError::Embedding {
                provider: "test".to_string(),
                message: "poisoned input".to_string(),
            });
        }
        let lower = text.to_lowercase();
        Ok(KEYWORDS.iter().map(|kw| lower.matches(kw).count() as f32).collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// A generator that echoes its inputs, so tests can assert the context it
/// was handed.
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, question: &str, context: &str) -> Result<String> {
        Ok(format!("Q: {question}\n{context}"))
    }
}

/// Build a chunk with the given id and embedding.
pub fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: format!("text of {id}"),
        embedding,
        metadata: HashMap::new(),
        document_id: "doc_1".to_string(),
    }
}
