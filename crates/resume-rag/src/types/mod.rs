//! Core types for the RAG pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document, DocumentType};
pub use query::{Query, QueryMode};
pub use response::{Answer, IngestReport, QueryError};
