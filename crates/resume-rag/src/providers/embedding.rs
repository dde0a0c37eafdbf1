//! Text → vector seam shared by ingestion and retrieval

use async_trait::async_trait;
use crate::error::Result;

/// Turns chunk and query text into vectors
///
/// Ingestion and querying must use the same provider and model for an index;
/// vectors are stored unversioned.
///
/// Implementations:
/// - `GeminiEmbedder`: Generative Language API (models/embedding-001)
/// - `OllamaEmbedder`: Local Ollama server
/// - `HashingEmbedder`: Deterministic offline feature hashing
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one query or chunk
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, one vector per input in input order.
    ///
    /// Falls back to one `embed` call per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Provider name for logs
    fn name(&self) -> &str;
}
