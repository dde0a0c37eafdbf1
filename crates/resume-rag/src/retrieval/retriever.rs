//! Similarity retrieval over a vector index

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, ScoredPassage, VectorIndex};

/// Embeds query text and searches an index with it
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Create a retriever using the same embedder the index was built with
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Top `k` passages for `query_text`, most similar first.
    ///
    /// `k == 0` or an empty index returns nothing without calling the embedder.
    pub async fn retrieve(
        &self,
        index: &dyn VectorIndex,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<ScoredPassage>> {
        if k == 0 || index.is_empty().await? {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(query_text).await?;
        let passages = index.search(&embedding, k).await?;

        tracing::debug!(
            "Retrieved {} passage(s) from {} (k = {})",
            passages.len(),
            index.name(),
            k
        );
        Ok(passages)
    }

    /// Every stored passage ranked against `query_text`
    pub async fn retrieve_all(
        &self,
        index: &dyn VectorIndex,
        query_text: &str,
    ) -> Result<Vec<ScoredPassage>> {
        let k = index.len().await?;
        self.retrieve(index, query_text, k).await
    }
}
