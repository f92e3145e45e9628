//! Durable vector store backed by one JSON file per collection.
//!
//! [`JsonVectorStore`] keeps every collection in memory as a `Vec` of
//! records in insertion order and mirrors each collection to
//! `<root>/<name>.json`. Reloading a store from the same directory
//! reproduces identical search results for identical queries: records keep
//! their insertion order and cosine similarity over the same `f32` values
//! is bit-stable.
//!
//! Similarity is fixed per store: cosine. A naive linear scan is the
//! intended scale here (hundreds to low thousands of chunks per session).

use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::{fs, io};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "json";

/// Durable state of one collection, as written to disk.
#[derive(Debug, Serialize, Deserialize)]
struct CollectionSnapshot {
    dimensions: usize,
    records: Vec<Chunk>,
}

/// In-memory state of one collection.
#[derive(Debug)]
struct CollectionState {
    dimensions: usize,
    /// Records in insertion order. Search ties are broken by this order.
    records: Vec<Chunk>,
    /// Set on mutation, cleared by [`JsonVectorStore::persist`].
    dirty: bool,
}

/// A [`VectorStore`] persisted as one JSON file per collection.
///
/// Writes take the write lock, so concurrent ingests against the same store
/// are serialized; `search` and `count` take the read lock and run
/// concurrently without ever observing a partially applied insert.
/// [`persist`](VectorStore::persist) writes each dirty collection to a
/// temporary file, flushes it to disk, and atomically renames it over the
/// durable file, so the file on disk is always a complete snapshot.
#[derive(Debug)]
pub struct JsonVectorStore {
    root: PathBuf,
    collections: RwLock<HashMap<String, CollectionState>>,
}

impl JsonVectorStore {
    /// Open a store rooted at `root`, creating the directory if needed and
    /// reloading every previously persisted collection.
    ///
    /// Opening is idempotent: a collection persisted by an earlier process
    /// comes back with its records in the original insertion order.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let mut collections = HashMap::new();
        for entry in fs::read_dir(&root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let snapshot: CollectionSnapshot = serde_json::from_str(&fs::read_to_string(&path)?)?;
            debug!(collection = name, records = snapshot.records.len(), "reloaded collection");
            collections.insert(
                name.to_string(),
                CollectionState {
                    dimensions: snapshot.dimensions,
                    records: snapshot.records,
                    dirty: false,
                },
            );
        }

        info!(root = %root.display(), collections = collections.len(), "opened vector store");
        Ok(Self { root, collections: RwLock::new(collections) })
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

/// Collection names become file names, so they must not traverse paths.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RagError::InvalidArgument("collection name must not be empty".to_string()));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(RagError::InvalidArgument(format!(
            "collection name '{name}' must not contain path separators"
        )));
    }
    Ok(())
}

/// Compute cosine similarity between two vectors of equal length.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Write a snapshot next to `path` and atomically rename it into place,
/// flushing file contents before the rename.
fn write_snapshot(path: &Path, snapshot: &CollectionSnapshot) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let file = fs::File::create(&tmp)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, snapshot)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl VectorStore for JsonVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        validate_name(name)?;
        if dimensions == 0 {
            return Err(RagError::InvalidArgument(
                "collection dimensions must be greater than zero".to_string(),
            ));
        }

        let mut collections = self.collections.write().await;
        if let Some(existing) = collections.get(name) {
            if existing.dimensions != dimensions {
                return Err(RagError::VectorStore {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "collection '{name}' already exists with dimension {}, not {dimensions}",
                        existing.dimensions
                    ),
                });
            }
            return Ok(());
        }

        collections.insert(
            name.to_string(),
            CollectionState { dimensions, records: Vec::new(), dirty: true },
        );
        info!(collection = name, dimensions, "created collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        match fs::remove_file(self.collection_path(name)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!(collection = name, "deleted collection");
        Ok(())
    }

    async fn insert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let state = collections.get_mut(collection).ok_or_else(|| RagError::VectorStore {
            backend: BACKEND.to_string(),
            message: format!("collection '{collection}' does not exist"),
        })?;

        // Validate every chunk before touching the records, so a mismatch
        // leaves the collection unchanged.
        for chunk in chunks {
            if chunk.embedding.len() != state.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: state.dimensions,
                    actual: chunk.embedding.len(),
                });
            }
        }

        state.records.extend(chunks.iter().cloned());
        state.dirty = true;
        debug!(collection, inserted = chunks.len(), total = state.records.len(), "inserted chunks");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be greater than zero".to_string()));
        }

        let collections = self.collections.read().await;
        let Some(state) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        // Scored in insertion order; the stable sort keeps that order for
        // equal scores, so earlier records win ties.
        let mut scored: Vec<SearchResult> = state
            .records
            .iter()
            .map(|chunk| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(&chunk.embedding, embedding),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |state| state.records.len()))
    }

    async fn clear(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(state) = collections.get_mut(collection) {
            state.records.clear();
            state.dirty = true;
            info!(collection, "cleared collection");
        }
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        let mut collections = self.collections.write().await;
        for (name, state) in collections.iter_mut() {
            if !state.dirty {
                continue;
            }
            let snapshot = CollectionSnapshot {
                dimensions: state.dimensions,
                records: state.records.clone(),
            };
            write_snapshot(&self.collection_path(name), &snapshot)?;
            state.dirty = false;
            debug!(collection = name.as_str(), records = snapshot.records.len(), "persisted");
        }
        Ok(())
    }
}
