//! Pipeline façade: ingest, reset and answer

use std::path::Path;
use std::sync::Arc;

use crate::config::{IndexConfig, IndexKind, RagConfig};
use crate::error::{Error, Result};
use crate::generation::{AnswerGenerator, PromptBuilder};
use crate::ingestion::{DedupIndexer, PdfLoader, RecursiveChunker};
use crate::providers::{build_providers, EmbeddingProvider, LlmProvider, ScoredPassage};
use crate::retrieval::{assemble, extract_keywords, extract_links, Retriever};
use crate::storage::IndexRegistry;
use crate::types::{Answer, Document, DocumentType, IngestReport, Query, QueryError, QueryMode};

/// Resume RAG pipeline
///
/// Cheap to share behind an `Arc`; every operation takes `&self`.
pub struct RagPipeline {
    config: RagConfig,
    registry: IndexRegistry,
    chunker: RecursiveChunker,
    indexer: DedupIndexer,
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl RagPipeline {
    /// Create a pipeline over explicit providers
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        let chunker = RecursiveChunker::from_config(&config.chunking)?;
        let indexer = DedupIndexer::new(
            Arc::clone(&embedder),
            config.retrieval.embedding_batch_size,
        );

        Ok(Self {
            registry: IndexRegistry::new(),
            chunker,
            indexer,
            retriever: Retriever::new(embedder),
            generator: AnswerGenerator::new(llm),
            config,
        })
    }

    /// Create a pipeline with the providers selected by `config.backend`
    pub fn from_config(config: RagConfig) -> Result<Self> {
        config.validate()?;
        let (embedder, llm) = build_providers(&config)?;
        Self::new(config, embedder, llm)
    }

    /// Active configuration
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Load every document of `document_type` in `directory` and index it into `target`.
    ///
    /// All files are loaded before anything is written, so one unreadable
    /// file leaves the index untouched.
    pub async fn ingest(
        &self,
        index: &IndexConfig,
        target: IndexKind,
        directory: &Path,
        document_type: DocumentType,
    ) -> Result<IngestReport> {
        let documents = PdfLoader::load_directory(directory, document_type).await?;
        self.ingest_documents(index, target, documents).await
    }

    /// Chunk and index already loaded documents into `target`
    pub async fn ingest_documents(
        &self,
        index: &IndexConfig,
        target: IndexKind,
        documents: Vec<Document>,
    ) -> Result<IngestReport> {
        let path = index.path_for(target);
        let chunks = self.chunker.chunk(&documents);
        tracing::info!(
            "Split {} page(s) into {} chunk(s) for {}",
            documents.len(),
            chunks.len(),
            path.display()
        );

        let guard = self.registry.writer(path).await;
        let store = guard.index().await?;
        let report = self.indexer.index(store.as_ref(), chunks).await?;

        tracing::info!(
            "Ingestion into {} complete: {} chunk(s), {} added, {} skipped, {} stale",
            path.display(),
            report.total(),
            report.added,
            report.skipped,
            report.stale
        );
        Ok(report)
    }

    /// Delete the index directory at `index_path`
    pub async fn reset(&self, index_path: &Path) -> Result<()> {
        self.registry.reset(index_path).await
    }

    /// Answer a query from the content index, with links from the hyperlink index
    pub async fn answer(&self, index: &IndexConfig, query: &Query) -> std::result::Result<Answer, QueryError> {
        match self.try_answer(index, query).await {
            Ok(answer) => Ok(answer),
            Err(err) => {
                tracing::error!("Error in answer: {}", err);
                Err(err)
            }
        }
    }

    async fn try_answer(&self, index: &IndexConfig, query: &Query) -> std::result::Result<Answer, QueryError> {
        let question = query.text.trim();
        if question.is_empty() {
            return Err(QueryError::InvalidInput("empty question".to_string()));
        }

        let passages = self.retrieve_content(index, query).await?;
        if passages.is_empty() {
            return Err(QueryError::NotFound);
        }

        let context = assemble(&passages, self.config.retrieval.context_style);
        let links = self.retrieve_links(index, question).await?;

        let prompt = PromptBuilder::for_query(query, &context)?;
        let answer = self.generator.generate(&prompt).await?;

        Ok(Answer { answer, links })
    }

    async fn retrieve_content(&self, index: &IndexConfig, query: &Query) -> Result<Vec<ScoredPassage>> {
        let content = self.registry.reader(&index.content_path).await?;

        match query.mode {
            QueryMode::ResumeRank => {
                let job_description = query
                    .job_description
                    .as_deref()
                    .map(str::trim)
                    .filter(|jd| !jd.is_empty())
                    .ok_or_else(|| {
                        Error::InvalidInput("resume ranking needs a job description".to_string())
                    })?;
                self.retriever.retrieve_all(content.as_ref(), job_description).await
            }
            QueryMode::Plain | QueryMode::Multilingual => {
                self.retriever
                    .retrieve(content.as_ref(), query.text.trim(), self.config.retrieval.content_k)
                    .await
            }
        }
    }

    async fn retrieve_links(&self, index: &IndexConfig, question: &str) -> Result<Vec<String>> {
        let keywords = extract_keywords(question);
        let links_query = if keywords.is_empty() { question } else { keywords.as_str() };
        tracing::debug!("Hyperlink query: {}", links_query);

        let links_index = self.registry.reader(&index.links_path).await?;
        let hits = self
            .retriever
            .retrieve(links_index.as_ref(), links_query, self.config.retrieval.links_k)
            .await?;
        Ok(extract_links(&hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendProvider;
    use crate::providers::{HashingEmbedder, ModelOutput};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Echoes a fixed answer and records the last prompt
    struct RecordingLlm {
        reply: ModelOutput,
        last_prompt: Mutex<Option<String>>,
    }

    #[async_trait]
    impl LlmProvider for RecordingLlm {
        async fn generate(&self, prompt: &str) -> Result<ModelOutput> {
            *self.last_prompt.lock() = Some(prompt.to_string());
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "recording-1"
        }
    }

    fn pipeline(reply: ModelOutput) -> (RagPipeline, Arc<RecordingLlm>) {
        let config = RagConfig {
            backend: BackendProvider::Hashing,
            ..Default::default()
        };
        let llm = Arc::new(RecordingLlm {
            reply,
            last_prompt: Mutex::new(None),
        });
        let pipeline = RagPipeline::new(
            config,
            Arc::new(HashingEmbedder::new(128).unwrap()),
            Arc::clone(&llm) as Arc<dyn LlmProvider>,
        )
        .unwrap();
        (pipeline, llm)
    }

    fn index_config(dir: &tempfile::TempDir) -> IndexConfig {
        IndexConfig::new(dir.path().join("content"), dir.path().join("links"))
    }

    #[tokio::test]
    async fn test_answer_with_links() {
        let dir = tempfile::tempdir().unwrap();
        let index = index_config(&dir);
        let (pipeline, llm) = pipeline(ModelOutput::Text(" Alice is the best fit. ".to_string()));

        pipeline
            .ingest_documents(
                &index,
                IndexKind::Content,
                vec![Document::new("Alice: senior Rust engineer, tokio, async", "alice.pdf", 0)],
            )
            .await
            .unwrap();
        pipeline
            .ingest_documents(
                &index,
                IndexKind::Links,
                vec![Document::new("Rust engineer profile https://example.com/alice", "links.pdf", 0)],
            )
            .await
            .unwrap();

        let answer = pipeline
            .answer(&index, &Query::new("Which Rust engineer is senior?").with_language("German"))
            .await
            .unwrap();

        assert_eq!(answer.answer, "Alice is the best fit.");
        assert_eq!(answer.links, vec!["https://example.com/alice"]);

        let prompt = llm.last_prompt.lock().clone().unwrap();
        assert!(prompt.contains("senior Rust engineer"));
        assert!(prompt.contains("German"));
    }

    #[tokio::test]
    async fn test_empty_content_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(ModelOutput::Text("unused".to_string()));

        let result = pipeline.answer(&index_config(&dir), &Query::new("anyone?")).await;
        assert_eq!(result, Err(QueryError::NotFound));
    }

    #[tokio::test]
    async fn test_blank_question_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(ModelOutput::Text("unused".to_string()));

        let result = pipeline.answer(&index_config(&dir), &Query::new("   ")).await;
        assert!(matches!(result, Err(QueryError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_empty_model_output_is_provider_failure() {
        let dir = tempfile::tempdir().unwrap();
        let index = index_config(&dir);
        let (pipeline, _) = pipeline(ModelOutput::Empty);

        pipeline
            .ingest_documents(&index, IndexKind::Content, vec![Document::new("some resume", "a.pdf", 0)])
            .await
            .unwrap();

        let result = pipeline.answer(&index, &Query::new("who?")).await;
        assert!(matches!(result, Err(QueryError::ProviderFailure(_))));
    }

    #[tokio::test]
    async fn test_resume_rank_uses_every_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let index = index_config(&dir);
        let (pipeline, llm) = pipeline(ModelOutput::Text("ranked".to_string()));

        let documents: Vec<Document> = (0..8)
            .map(|i| Document::new(format!("candidate {} resume text", i), format!("cv{}.pdf", i), 0))
            .collect();
        pipeline
            .ingest_documents(&index, IndexKind::Content, documents)
            .await
            .unwrap();

        pipeline
            .answer(&index, &Query::resume_rank("Who is the best candidate?", "Backend role"))
            .await
            .unwrap();

        let prompt = llm.last_prompt.lock().clone().unwrap();
        for i in 0..8 {
            assert!(prompt.contains(&format!("candidate {} resume text", i)));
        }
        assert!(prompt.contains("Backend role"));

        let missing = Query {
            job_description: Some("  ".to_string()),
            ..Query::resume_rank("q", "x")
        };
        assert!(matches!(
            pipeline.answer(&index, &missing).await,
            Err(QueryError::InvalidInput(_))
        ));
    }
}
