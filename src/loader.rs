//! Document loading: turning files and raw text into [`Document`]s.
//!
//! Loaded documents carry `source` and `kind` metadata so retrieved chunks
//! can be traced back to the file they came from. Document IDs are derived
//! from the file stem plus a content hash, so re-loading the same file
//! yields the same ID (and chunk IDs) deterministically.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::document::Document;
use crate::error::{RagError, Result};

/// The kind of file an ingestion entry point accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A PDF file; text is extracted before chunking (requires the `pdf` feature).
    Pdf,
    /// A plain UTF-8 text file.
    Text,
}

impl DocumentKind {
    /// Metadata value recorded on loaded documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "text",
        }
    }
}

/// Derive a stable document ID from a display name and its content.
fn document_id(name: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    let mut slug = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if c == ' ' || c == '-' || c == '_' || c == '.' {
            slug.push('-');
        }
    }
    if slug.is_empty() {
        slug.push_str("doc");
    }
    format!("{slug}-{}", &hash[..12])
}

fn checked_path(path: impl AsRef<Path>) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(RagError::InvalidArgument("document path must not be empty".to_string()));
    }
    Ok(path.to_path_buf())
}

fn build_document(path: &Path, kind: DocumentKind, text: String) -> Document {
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("doc");
    let id = document_id(name, &text);
    debug!(document.id = %id, kind = kind.as_str(), chars = text.chars().count(), "loaded document");

    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), path.display().to_string());
    metadata.insert("kind".to_string(), kind.as_str().to_string());
    Document { id, text, metadata, source_uri: Some(path.display().to_string()) }
}

/// Load a UTF-8 text file as a [`Document`].
///
/// # Errors
///
/// Returns [`RagError::InvalidArgument`] for an empty path and
/// [`RagError::Io`] if the file cannot be read.
pub fn load_text(path: impl AsRef<Path>) -> Result<Document> {
    let path = checked_path(path)?;
    let text = std::fs::read_to_string(&path)?;
    Ok(build_document(&path, DocumentKind::Text, text))
}

/// Load a PDF file as a [`Document`], extracting its text content.
///
/// # Errors
///
/// Returns [`RagError::InvalidArgument`] for an empty path and
/// [`RagError::Load`] if text extraction fails.
#[cfg(feature = "pdf")]
pub fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = checked_path(path)?;
    let text = pdf_extract::extract_text(&path)
        .map_err(|e| RagError::Load(format!("failed to extract text from PDF: {e}")))?;
    Ok(build_document(&path, DocumentKind::Pdf, text))
}

/// Build a [`Document`] from raw text content, without a backing file.
///
/// The ID is derived from the content hash, so identical content yields an
/// identical document.
pub fn document_from_text(text: impl Into<String>, metadata: HashMap<String, String>) -> Document {
    let text = text.into();
    let id = document_id("content", &text);
    Document { id, text, metadata, source_uri: None }
}
