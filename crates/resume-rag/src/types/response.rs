//! Response types for ingestion and queries

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Error;

/// Fixed reply the templates instruct the model to use for off-topic questions
pub const REFUSAL: &str = "I'm sorry, but I can't assist with that.";

/// Outcome of one ingestion call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Chunks embedded and written
    pub added: usize,
    /// Chunks whose id was already stored
    pub skipped: usize,
    /// Skipped chunks whose stored content differs from the new content
    pub stale: usize,
}

impl IngestReport {
    /// Total chunks seen by the indexer
    pub fn total(&self) -> usize {
        self.added + self.skipped
    }
}

/// Answer with the links recovered from the hyperlink index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Generated answer, trimmed plain text
    pub answer: String,
    /// First URL of every hyperlink hit that carried one
    pub links: Vec<String>,
}

/// Tagged failure of a query
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Nothing was retrieved from the content index
    #[error("no indexed content matched the query")]
    NotFound,

    /// Embedding or generation provider failed
    #[error("provider failure: {0}")]
    ProviderFailure(String),

    /// The query could not be served as given
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl QueryError {
    /// Message that is safe to hand to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            QueryError::NotFound => "No relevant information was found for your question.",
            QueryError::ProviderFailure(_) => "An error occurred while processing your request.",
            QueryError::InvalidInput(_) => "The question could not be processed.",
        }
    }
}

impl From<Error> for QueryError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => QueryError::InvalidInput(msg),
            other => QueryError::ProviderFailure(other.to_string()),
        }
    }
}
