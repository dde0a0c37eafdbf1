//! resume-rag: retrieval-augmented answers over resumes and job descriptions
//!
//! PDFs are split into positionally identified chunks and appended to a
//! persistent SQLite vector index, skipping chunks that are already stored.
//! Questions are answered from the content index, while a second hyperlink
//! index queried with extracted keywords supplies related links.
//!
//! ```no_run
//! use resume_rag::{IndexConfig, IndexKind, Query, RagConfig, RagPipeline};
//! use resume_rag::types::DocumentType;
//!
//! # async fn run() -> resume_rag::Result<()> {
//! let config = RagConfig::load(None)?;
//! let index = config.index.clone();
//! let pipeline = RagPipeline::from_config(config)?;
//!
//! pipeline
//!     .ingest(&index, IndexKind::Content, "data/resumes".as_ref(), DocumentType::Pdf)
//!     .await?;
//!
//! match pipeline.answer(&index, &Query::new("Who has Kubernetes experience?")).await {
//!     Ok(answer) => println!("{}\n{:?}", answer.answer, answer.links),
//!     Err(err) => println!("{}", err.user_message()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod storage;
pub mod types;

pub use config::{IndexConfig, IndexKind, RagConfig};
pub use error::{Error, Result};
pub use pipeline::RagPipeline;
pub use types::{
    document::{Chunk, Document, DocumentType},
    query::{Query, QueryMode},
    response::{Answer, IngestReport, QueryError},
};
