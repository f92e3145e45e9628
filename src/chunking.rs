//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] — fixed character windows with exact overlap
//! - [`RecursiveChunker`] — splits by paragraphs, then sentences, then words
//!
//! Chunking is pure and deterministic: the same text and parameters always
//! produce the same chunks, in order, with no characters lost.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings; the pipeline attaches embeddings later.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Build a [`Chunk`] for the given document at the given index.
fn make_chunk(document: &Document, index: usize, text: String) -> Chunk {
    let mut metadata = document.metadata.clone();
    metadata.insert("chunk_index".to_string(), index.to_string());
    Chunk {
        id: format!("{}_{index}", document.id),
        text,
        embedding: Vec::new(),
        metadata,
        document_id: document.id.clone(),
    }
}

/// Split `text` into character windows of at most `chunk_size`, where
/// consecutive windows share exactly `overlap` characters.
///
/// The final window may be shorter. Windows are indexed by `char` so
/// multi-byte UTF-8 input never splits inside a code point. The windows
/// reconstruct the input: the first window plus each later window with its
/// first `overlap` characters removed concatenates back to `text`.
fn window_split(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let step = chunk_size.saturating_sub(overlap);
    if step == 0 {
        // Degenerate parameters: emit the whole text as one chunk rather
        // than loop forever.
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    windows
}

/// Splits text into fixed-size chunks by character count with exact overlap.
///
/// Consecutive chunks share exactly `chunk_overlap` characters; the final
/// chunk may be shorter than `chunk_size`. Input shorter than `chunk_size`
/// yields exactly one chunk. Chunk IDs are `{document_id}_{chunk_index}` and
/// each chunk carries a `chunk_index` metadata field.
///
/// # Example
///
/// ```rust,ignore
/// use study_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 200);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// Callers are expected to supply `chunk_size > 0` and
    /// `chunk_overlap < chunk_size`; [`RagConfig`](crate::RagConfig)
    /// validates these at build time.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        window_split(&document.text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(i, text)| make_chunk(document, i, text))
            .collect()
    }
}

/// Separator hierarchy for [`RecursiveChunker`]: paragraphs, sentence
/// boundaries, then words.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

/// Splits text hierarchically: paragraphs, then sentences, then words.
///
/// Segments are greedily packed into chunks of at most `chunk_size`
/// characters. A segment that still exceeds `chunk_size` at the last level
/// falls back to fixed character windows with `chunk_overlap`. This mirrors
/// the recursive character splitting commonly used for prose documents.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Split `text` at separator level `level`, packing the resulting
    /// segments into `out` as chunks of at most `chunk_size` characters.
    fn split_level(&self, text: &str, level: usize, out: &mut Vec<String>) {
        if char_count(text) <= self.chunk_size {
            if !text.is_empty() {
                out.push(text.to_string());
            }
            return;
        }
        if level >= SEPARATORS.len() {
            out.extend(window_split(text, self.chunk_size, self.chunk_overlap));
            return;
        }

        let mut packed = String::new();
        for segment in split_after(text, SEPARATORS[level]) {
            if packed.is_empty() {
                packed = segment.to_string();
            } else if char_count(&packed) + char_count(segment) <= self.chunk_size {
                packed.push_str(segment);
            } else {
                self.split_level(&packed, level + 1, out);
                packed = segment.to_string();
            }
        }
        if !packed.is_empty() {
            self.split_level(&packed, level + 1, out);
        }
    }
}

/// Character count of a string (`char`s, not bytes).
fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` at every occurrence of `separator`, keeping the separator
/// attached to the end of the preceding segment so no characters are lost.
fn split_after<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(separator) {
        let cut = pos + separator.len();
        segments.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    if !rest.is_empty() {
        segments.push(rest);
    }
    segments
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }
        let mut pieces = Vec::new();
        self.split_level(&document.text, 0, &mut pieces);
        pieces.into_iter().enumerate().map(|(i, text)| make_chunk(document, i, text)).collect()
    }
}
