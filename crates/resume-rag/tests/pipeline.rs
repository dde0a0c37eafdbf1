use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use parking_lot::Mutex;
use resume_rag::config::BackendProvider;
use resume_rag::ingestion::RecursiveChunker;
use resume_rag::providers::{HashingEmbedder, LlmProvider, ModelOutput, VectorIndex};
use resume_rag::storage::SqliteIndex;
use resume_rag::{
    Document, DocumentType, IndexConfig, IndexKind, IngestReport, Query, QueryError, RagConfig,
    RagPipeline,
};
use tempfile::TempDir;

struct StubLlm {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmProvider for StubLlm {
    async fn generate(&self, prompt: &str) -> resume_rag::Result<ModelOutput> {
        self.prompts.lock().push(prompt.to_string());
        Ok(ModelOutput::Parts(vec!["Based on the resumes, ".to_string(), "Dana fits.".to_string()]))
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-1"
    }
}

fn setup(chunk_size: usize, chunk_overlap: usize) -> (RagPipeline, Arc<StubLlm>) {
    let mut config = RagConfig {
        backend: BackendProvider::Hashing,
        ..Default::default()
    };
    config.chunking.chunk_size = chunk_size;
    config.chunking.chunk_overlap = chunk_overlap;

    let llm = Arc::new(StubLlm {
        prompts: Mutex::new(Vec::new()),
    });
    let pipeline = RagPipeline::new(
        config,
        Arc::new(HashingEmbedder::new(256).expect("embedder")),
        Arc::clone(&llm) as Arc<dyn LlmProvider>,
    )
    .expect("pipeline");
    (pipeline, llm)
}

fn index_config(tmp: &TempDir) -> IndexConfig {
    IndexConfig::new(tmp.path().join("chroma"), tmp.path().join("chroma_links"))
}

fn resume_pages() -> Vec<Document> {
    vec![
        Document::new(
            "Dana Ortiz\nPlatform engineer with eight years of Kubernetes and Terraform.\n\nLed the migration of forty services to a service mesh.",
            "dana.pdf",
            0,
        ),
        Document::new(
            "Dana Ortiz\nEducation: BSc Computer Science.\n\nCertified Kubernetes Administrator.",
            "dana.pdf",
            1,
        ),
        Document::new(
            "Lee Park\nFrontend developer focused on React, TypeScript and accessibility audits.",
            "lee.pdf",
            0,
        ),
    ]
}

/// Single page PDF drawing `text` in Helvetica
fn write_pdf(path: &Path, text: &str) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[tokio::test]
async fn reingest_adds_nothing() {
    let tmp = TempDir::new().unwrap();
    let index = index_config(&tmp);
    let (pipeline, _) = setup(80, 10);

    let first = pipeline
        .ingest_documents(&index, IndexKind::Content, resume_pages())
        .await
        .unwrap();
    assert!(first.added > 3);
    assert_eq!(first.skipped, 0);

    let second = pipeline
        .ingest_documents(&index, IndexKind::Content, resume_pages())
        .await
        .unwrap();
    assert_eq!(
        second,
        IngestReport {
            added: 0,
            skipped: first.added,
            stale: 0
        }
    );
}

#[tokio::test]
async fn reset_then_ingest_adds_everything_again() {
    let tmp = TempDir::new().unwrap();
    let index = index_config(&tmp);
    let (pipeline, _) = setup(80, 10);

    let first = pipeline
        .ingest_documents(&index, IndexKind::Content, resume_pages())
        .await
        .unwrap();

    pipeline.reset(&index.content_path).await.unwrap();
    assert!(!index.content_path.exists());

    let result = pipeline.answer(&index, &Query::new("Who knows Kubernetes?")).await;
    assert_eq!(result, Err(QueryError::NotFound));

    let again = pipeline
        .ingest_documents(&index, IndexKind::Content, resume_pages())
        .await
        .unwrap();
    assert_eq!(again.added, first.added);
    assert_eq!(again.skipped, 0);
}

#[tokio::test]
async fn reset_of_missing_index_succeeds() {
    let tmp = TempDir::new().unwrap();
    let (pipeline, _) = setup(80, 10);
    pipeline.reset(&tmp.path().join("never-created")).await.unwrap();
}

#[tokio::test]
async fn answer_reports_links_from_the_links_index() {
    let tmp = TempDir::new().unwrap();
    let index = index_config(&tmp);
    let (pipeline, llm) = setup(200, 20);

    pipeline
        .ingest_documents(&index, IndexKind::Content, resume_pages())
        .await
        .unwrap();
    pipeline
        .ingest_documents(
            &index,
            IndexKind::Links,
            vec![
                Document::new("Kubernetes platform engineer: https://jobs.example.com/platform", "jobs.pdf", 0),
                Document::new("Frontend openings, see careers page", "jobs.pdf", 1),
            ],
        )
        .await
        .unwrap();

    let answer = pipeline
        .answer(&index, &Query::new("Which candidate has Kubernetes experience?"))
        .await
        .unwrap();

    assert_eq!(answer.answer, "Based on the resumes, Dana fits.");
    assert_eq!(answer.links, vec!["https://jobs.example.com/platform"]);

    let prompts = llm.prompts.lock();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Which candidate has Kubernetes experience?"));
}

#[tokio::test]
async fn answer_without_links_index_has_no_links() {
    let tmp = TempDir::new().unwrap();
    let index = index_config(&tmp);
    let (pipeline, _) = setup(200, 20);

    pipeline
        .ingest_documents(&index, IndexKind::Content, resume_pages())
        .await
        .unwrap();

    let answer = pipeline.answer(&index, &Query::new("Who writes TypeScript?")).await.unwrap();
    assert!(answer.links.is_empty());
}

#[tokio::test]
async fn resume_ranking_sees_every_chunk() {
    let tmp = TempDir::new().unwrap();
    let index = index_config(&tmp);
    let (pipeline, llm) = setup(60, 0);

    let report = pipeline
        .ingest_documents(&index, IndexKind::Content, resume_pages())
        .await
        .unwrap();
    assert!(report.added > pipeline.config().retrieval.content_k);

    pipeline
        .answer(
            &index,
            &Query::resume_rank("Rank the candidates", "Senior platform engineer, Kubernetes"),
        )
        .await
        .unwrap();

    let prompt = llm.prompts.lock().last().cloned().unwrap();
    assert!(prompt.contains("Senior platform engineer, Kubernetes"));
    assert!(prompt.contains("Lee Park"));
    assert!(prompt.contains("Certified Kubernetes Administrator."));
}

#[tokio::test]
async fn ingest_pdf_directory() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    write_pdf(&data.join("dana.pdf"), "Dana Ortiz Kubernetes platform engineer");
    write_pdf(&data.join("lee.pdf"), "Lee Park React frontend developer");
    std::fs::write(data.join("notes.txt"), "not a pdf").unwrap();

    let index = index_config(&tmp);
    let (pipeline, llm) = setup(800, 80);

    let report = pipeline
        .ingest(&index, IndexKind::Content, &data, DocumentType::Pdf)
        .await
        .unwrap();
    assert_eq!(report.added, 2);

    let again = pipeline
        .ingest(&index, IndexKind::Content, &data, DocumentType::Pdf)
        .await
        .unwrap();
    assert_eq!(again.added, 0);
    assert_eq!(again.skipped, 2);

    pipeline
        .answer(&index, &Query::new("Who is a Kubernetes engineer?"))
        .await
        .unwrap();
    let prompt = llm.prompts.lock().last().cloned().unwrap();
    assert!(prompt.contains("Kubernetes"));
}

#[tokio::test]
async fn ingest_missing_directory_fails() {
    let tmp = TempDir::new().unwrap();
    let index = index_config(&tmp);
    let (pipeline, _) = setup(800, 80);

    let result = pipeline
        .ingest(&index, IndexKind::Content, &tmp.path().join("absent"), DocumentType::Pdf)
        .await;
    assert!(result.is_err());
    assert!(!index.content_path.exists());
}

async fn stored_chunks(path: &Path) -> usize {
    SqliteIndex::open(path).unwrap().len().await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingests_on_one_index_add_each_chunk_once() {
    let tmp = TempDir::new().unwrap();
    let index = index_config(&tmp);
    let (pipeline, _) = setup(80, 10);
    let pipeline = Arc::new(pipeline);
    let expected = RecursiveChunker::new(80, 10).unwrap().chunk(&resume_pages()).len();

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            let index = index.clone();
            tokio::spawn(async move {
                // half the callers only bring the first resume
                let mut pages = resume_pages();
                if i % 2 == 1 {
                    pages.truncate(2);
                }
                pipeline
                    .ingest_documents(&index, IndexKind::Content, pages)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut added = 0;
    for task in tasks {
        let report = task.await.unwrap();
        assert_eq!(report.stale, 0);
        added += report.added;
    }

    assert_eq!(added, expected);
    assert_eq!(stored_chunks(&index.content_path).await, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queries_racing_reset_do_not_lose_later_ingests() {
    let tmp = TempDir::new().unwrap();
    let index = index_config(&tmp);
    let (pipeline, _) = setup(80, 10);
    let pipeline = Arc::new(pipeline);
    let expected = RecursiveChunker::new(80, 10).unwrap().chunk(&resume_pages()).len();

    for round in 0..20 {
        pipeline
            .ingest_documents(&index, IndexKind::Content, resume_pages())
            .await
            .unwrap();

        let queries: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                let index = index.clone();
                tokio::spawn(async move {
                    for _ in 0..5 {
                        // answers or NotFound depending on timing
                        let _ = pipeline.answer(&index, &Query::new("Who knows Kubernetes?")).await;
                    }
                })
            })
            .collect();
        pipeline.reset(&index.content_path).await.unwrap();
        for query in queries {
            query.await.unwrap();
        }

        let report = pipeline
            .ingest_documents(&index, IndexKind::Content, resume_pages())
            .await
            .unwrap();
        assert_eq!(report.added, expected, "round {}", round);
        assert_eq!(
            stored_chunks(&index.content_path).await,
            expected,
            "round {}: ingested rows did not reach disk",
            round
        );

        pipeline.reset(&index.content_path).await.unwrap();
    }
}
