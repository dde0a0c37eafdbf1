//! Document and chunk types with positional identity

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Error;

/// Supported document types for directory ingestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// PDF document, one `Document` per page
    Pdf,
}

impl DocumentType {
    /// File extension matched when scanning a directory
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            other => Err(Error::UnsupportedDocumentType(other.to_string())),
        }
    }
}

/// A loaded page of a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Extracted text of the page
    pub text: String,
    /// Path of the source file as it was loaded
    pub source: String,
    /// Page number (0-indexed)
    pub page: u32,
}

impl Document {
    /// Create a new document page
    pub fn new(text: impl Into<String>, source: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            page,
        }
    }
}

/// A chunk of text from a document page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable id `"{source}:{page}:{chunk_index}"`; empty until assigned
    pub id: String,
    /// Text content
    pub content: String,
    /// Source file path inherited from the document
    pub source: String,
    /// Page number inherited from the document
    pub page: u32,
    /// Position among consecutive chunks of the same page
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a chunk without an id
    pub fn new(content: impl Into<String>, source: impl Into<String>, page: u32) -> Self {
        Self {
            id: String::new(),
            content: content.into(),
            source: source.into(),
            page,
            chunk_index: 0,
        }
    }

    /// `"{source}:{page}"`, the key chunk indices are counted under
    pub fn page_key(&self) -> String {
        format!("{}:{}", self.source, self.page)
    }

    /// SHA-256 of the content, hex encoded
    pub fn content_hash(&self) -> String {
        hash_content(&self.content)
    }
}

/// Hash text content for staleness reporting
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
