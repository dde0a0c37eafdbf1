//! LLM provider trait and the response adapter every provider normalizes into

use async_trait::async_trait;
use crate::error::{Error, Result};

/// Raw output of a generation call, before normalization.
///
/// Each provider maps its own response object into one of these shapes at
/// the boundary; nothing downstream inspects provider types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutput {
    /// A single text body (Ollama `response`)
    Text(String),
    /// Ordered text parts of the first candidate (Gemini `candidates[0].content.parts`)
    Parts(Vec<String>),
    /// The provider answered without any text
    Empty,
}

impl ModelOutput {
    /// Normalize into trimmed plain text.
    ///
    /// Blank output is a generation failure.
    pub fn into_plain_text(self) -> Result<String> {
        let text = match self {
            ModelOutput::Text(text) => text,
            ModelOutput::Parts(parts) => parts.concat(),
            ModelOutput::Empty => String::new(),
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(Error::generation("model returned no text"));
        }
        Ok(text.to_string())
    }
}

/// Trait for prompt completion
///
/// Implementations:
/// - `GeminiClient`: Generative Language API (gemini-1.5-flash)
/// - `OllamaLlm`: Local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a fully rendered prompt
    async fn generate(&self, prompt: &str) -> Result<ModelOutput>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
