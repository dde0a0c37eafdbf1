//! Answer generation through the configured LLM

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;

/// Sends composed prompts to the model and normalizes the reply
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl AnswerGenerator {
    /// Create a generator over an LLM provider
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Complete `prompt` and return trimmed plain text
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!("Generating answer with {} ({})", self.llm.name(), self.llm.model());
        let output = self.llm.generate(prompt).await?;
        output.into_plain_text()
    }
}
