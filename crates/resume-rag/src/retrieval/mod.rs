//! Query-side retrieval: similarity search, keyword extraction and context assembly

mod context;
mod keywords;
mod retriever;

pub use context::{assemble, extract_links, first_url, ContextStyle};
pub use keywords::{extract_keywords, title_case, KeywordExtractor, Tag};
pub use retriever::Retriever;
