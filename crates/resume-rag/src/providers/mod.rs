//! Provider abstractions for embeddings, LLM, and vector storage
//!
//! Trait-based seams allow switching between Gemini, a local Ollama server,
//! and the offline hashing embedder without touching the pipeline.

pub mod embedding;
pub mod gemini;
pub mod hashing;
pub mod llm;
pub mod ollama;
pub mod vector_store;

use std::sync::Arc;

use crate::config::{BackendProvider, RagConfig};
use crate::error::Result;

pub use embedding::EmbeddingProvider;
pub use gemini::{GeminiClient, GeminiEmbedder};
pub use hashing::HashingEmbedder;
pub use llm::{LlmProvider, ModelOutput};
pub use ollama::{OllamaEmbedder, OllamaLlm};
pub use vector_store::{IndexRecord, ScoredPassage, VectorIndex};

/// Construct the embedding and LLM providers selected by `config.backend`
pub fn build_providers(
    config: &RagConfig,
) -> Result<(Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>)> {
    let providers: (Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>) = match config.backend {
        BackendProvider::Gemini => {
            tracing::info!(
                "Using Gemini backend ({} + {})",
                config.gemini.embedding_model,
                config.gemini.generation_model
            );
            (
                Arc::new(GeminiEmbedder::new(&config.gemini)?),
                Arc::new(GeminiClient::new(&config.gemini)?),
            )
        }
        BackendProvider::Ollama => {
            tracing::info!(
                "Using Ollama backend ({} + {})",
                config.ollama.embed_model,
                config.ollama.generate_model
            );
            let (embedder, llm) = ollama::shared(&config.ollama);
            (Arc::new(embedder), Arc::new(llm))
        }
        BackendProvider::Hashing => {
            tracing::info!(
                "Using hashing embedder ({} dims) with Ollama generation",
                config.hashing.dimensions
            );
            (
                Arc::new(HashingEmbedder::new(config.hashing.dimensions)?),
                Arc::new(OllamaLlm::new(&config.ollama)),
            )
        }
    };

    Ok(providers)
}
