//! Error types for the RAG pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document could not be read or parsed
    #[error("Failed to load document '{path}': {message}")]
    Load { path: String, message: String },

    /// Unsupported document type
    #[error("Unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    /// Embedding provider error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Generation provider error
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Persisted index error (unreadable, corrupt or failed write)
    #[error("Index error: {0}")]
    Index(String),

    /// Caller supplied an unusable value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a document load error
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an index error
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Message that is safe to hand to an end user.
    ///
    /// Provider and storage details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Load { .. } => "One or more documents could not be read.",
            Error::UnsupportedDocumentType(_) => "This document type is not supported.",
            Error::InvalidInput(_) | Error::Config(_) => "The request could not be processed.",
            _ => "An error occurred while processing your request.",
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Index(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_provider_detail() {
        let err = Error::embedding("quota exceeded for key AIza-secret");
        assert!(!err.user_message().contains("AIza"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_load_error_display() {
        let err = Error::load("data/cv.pdf", "encrypted");
        assert_eq!(err.to_string(), "Failed to load document 'data/cv.pdf': encrypted");
    }
}
