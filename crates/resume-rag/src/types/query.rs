//! Query request types

use serde::{Deserialize, Serialize};

/// Delimiter used by older chat clients to append the answer language
pub const LANGUAGE_DELIMITER: &str = "|>";

/// How a query is retrieved and which template answers it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryMode {
    /// Top-k evidence, {context, question} template
    #[default]
    Plain,
    /// Top-k evidence, answer rendered in the requested language
    Multilingual,
    /// Every stored chunk ranked against a job description
    ResumeRank,
}

impl std::str::FromStr for QueryMode {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "multilingual" => Ok(Self::Multilingual),
            "resume-rank" | "resume_rank" => Ok(Self::ResumeRank),
            other => Err(crate::error::Error::InvalidInput(format!(
                "unknown query mode '{}'",
                other
            ))),
        }
    }
}

/// Structured query value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// The question to answer
    pub text: String,

    /// Language the answer should be written in
    #[serde(default)]
    pub language: Option<String>,

    /// Retrieval/template mode
    #[serde(default)]
    pub mode: QueryMode,

    /// Job description the candidates are ranked against (resume-rank mode)
    #[serde(default)]
    pub job_description: Option<String>,
}

impl Query {
    /// Create a plain query
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            mode: QueryMode::Plain,
            job_description: None,
        }
    }

    /// Ask for the answer in a given language (switches to multilingual mode)
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self.mode = QueryMode::Multilingual;
        self
    }

    /// Rank every indexed resume against a job description
    pub fn resume_rank(text: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            mode: QueryMode::ResumeRank,
            job_description: Some(job_description.into()),
        }
    }

    /// Adapter for `"question |>Language"` strings sent by chat clients.
    ///
    /// Splits on the first delimiter; an empty language part yields a plain query.
    pub fn from_delimited(raw: &str) -> Self {
        match raw.split_once(LANGUAGE_DELIMITER) {
            Some((question, language)) => {
                let language = language.trim();
                let query = Self::new(question.trim());
                if language.is_empty() {
                    query
                } else {
                    query.with_language(language)
                }
            }
            None => Self::new(raw.trim()),
        }
    }
}
