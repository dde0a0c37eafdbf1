//! Context assembly and link extraction

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::providers::ScoredPassage;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"'\)\]]+"#).expect("Invalid URL regex"));

/// How passages are joined into one context string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStyle {
    /// Blank line, horizontal rule, blank line between passages
    #[default]
    Delimited,
    /// Single space between passages
    Compact,
}

impl ContextStyle {
    fn separator(&self) -> &'static str {
        match self {
            ContextStyle::Delimited => "\n\n---\n\n",
            ContextStyle::Compact => " ",
        }
    }
}

/// Concatenate passage contents in retrieval order
pub fn assemble(passages: &[ScoredPassage], style: ContextStyle) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join(style.separator())
}

/// First URL in `text`, without trailing sentence punctuation
pub fn first_url(text: &str) -> Option<String> {
    URL_PATTERN.find(text).and_then(|m| {
        let url = m
            .as_str()
            .trim_end_matches(|c| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')'));
        let bare = url.trim_start_matches("https://").trim_start_matches("http://");
        (!bare.is_empty()).then(|| url.to_string())
    })
}

/// First URL of each hit; hits without one contribute nothing
pub fn extract_links(hits: &[ScoredPassage]) -> Vec<String> {
    hits.iter().filter_map(|hit| first_url(&hit.content)).collect()
}
