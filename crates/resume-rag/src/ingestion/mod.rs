//! Document ingestion: PDF loading, chunking and deduplicated indexing

mod chunker;
mod indexer;
mod loader;

pub use chunker::RecursiveChunker;
pub use indexer::{assign_chunk_ids, DedupIndexer};
pub use loader::PdfLoader;
