//! Prompt templates for answer generation

use crate::error::{Error, Result};
use crate::types::response::REFUSAL;
use crate::types::{Query, QueryMode};

/// Shared instructions every template ends with
fn behaviour_rules() -> String {
    format!(
        "If the question is a greeting, farewell, or expression of thanks, respond warmly and \
personally without referencing the context. For questions unrelated to the provided resumes \
or job descriptions, reply with: \"{refusal}\" Please ensure your response is descriptive and \
informative based on the context.",
        refusal = REFUSAL
    )
}

/// Prompt builder for the three query shapes
pub struct PromptBuilder;

impl PromptBuilder {
    /// {context, question}
    pub fn plain(context: &str, question: &str) -> String {
        format!(
            r#"Answer the question based only on the following context:

{context}

---

Answer the question based on the above context. {rules}

Question: {question}"#,
            context = context,
            rules = behaviour_rules(),
            question = question,
        )
    }

    /// {context, question, language}
    pub fn multilingual(context: &str, question: &str, language: &str) -> String {
        format!(
            r#"Answer the question based only on the following context:

{context}

---

Answer the question based on the above context. {rules}

Write the entire answer in {language}.

Question: {question}"#,
            context = context,
            rules = behaviour_rules(),
            language = language,
            question = question,
        )
    }

    /// {job_description, context, question}
    pub fn resume_rank(job_description: &str, context: &str, question: &str) -> String {
        format!(
            r#"Here is the job description provided:

{job_description}

---

Here are the candidate resumes retrieved for it:

{context}

---

Compare every candidate above against the job description and answer the following question. {rules}

Question: {question}"#,
            job_description = job_description,
            context = context,
            rules = behaviour_rules(),
            question = question,
        )
    }

    /// Render the template matching `query.mode`
    pub fn for_query(query: &Query, context: &str) -> Result<String> {
        match query.mode {
            QueryMode::Plain => Ok(Self::plain(context, &query.text)),
            QueryMode::Multilingual => match query.language.as_deref() {
                Some(language) if !language.trim().is_empty() => {
                    Ok(Self::multilingual(context, &query.text, language.trim()))
                }
                _ => Ok(Self::plain(context, &query.text)),
            },
            QueryMode::ResumeRank => {
                let job_description = query
                    .job_description
                    .as_deref()
                    .filter(|jd| !jd.trim().is_empty())
                    .ok_or_else(|| {
                        Error::InvalidInput("resume ranking needs a job description".to_string())
                    })?;
                Ok(Self::resume_rank(job_description, context, &query.text))
            }
        }
    }
}
