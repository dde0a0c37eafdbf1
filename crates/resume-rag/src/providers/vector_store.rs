//! Vector index trait for storing and searching chunk embeddings

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::types::Chunk;

/// A chunk paired with its embedding, ready to persist
#[derive(Debug, Clone)]
pub struct IndexRecord {
    /// The chunk; its `id` must already be assigned
    pub chunk: Chunk,
    /// Embedding of `chunk.content`
    pub embedding: Vec<f32>,
}

/// Search hit from a vector index
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
    /// Stored chunk id
    pub id: String,
    /// Passage text
    pub content: String,
    /// Source file path
    pub source: String,
    /// Page number (0-indexed)
    pub page: u32,
    /// Cosine distance to the query (lower is more similar)
    pub score: f32,
}

/// Trait for a persistent vector index
///
/// Implementations:
/// - `SqliteIndex`: one SQLite database per index directory
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert records keyed by chunk id, all or nothing
    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<()>;

    /// Every stored id mapped to its content hash; no payloads are read
    async fn fingerprints(&self) -> Result<HashMap<String, String>>;

    /// `k` nearest passages in ascending distance order
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredPassage>>;

    /// Get total number of stored chunks
    async fn len(&self) -> Result<usize>;

    /// Check if index is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Get index name for logging
    fn name(&self) -> &str;
}
