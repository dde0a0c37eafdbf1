//! Resume RAG command line
//!
//! Run with: cargo run -p resume-rag --features cli -- ingest pdf ./data

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use resume_rag::{
    types::DocumentType, IndexConfig, IndexKind, Query, QueryMode, RagConfig, RagPipeline,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "resume-rag", version, about = "Ingest resumes and ask questions about them")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, default_value = "resume-rag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index every document of a type found directly inside a directory
    Ingest {
        /// Document type (only "pdf" is supported)
        document_type: String,
        /// Directory holding the documents
        directory: PathBuf,
        /// Index to write to
        #[arg(long, value_enum, default_value_t = Target::Content)]
        index: Target,
        /// Delete the index before ingesting
        #[arg(long)]
        reset: bool,
    },
    /// Delete a persisted index
    Reset {
        #[arg(long, value_enum, default_value_t = ResetTarget::Content)]
        index: ResetTarget,
    },
    /// Ask a question against the indexed documents
    Ask {
        /// The question
        question: Vec<String>,
        /// Language the answer should be written in
        #[arg(long)]
        language: Option<String>,
        /// Rank every indexed resume against this job description file
        #[arg(long, conflicts_with = "language")]
        job_description: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Content,
    Links,
}

impl From<Target> for IndexKind {
    fn from(target: Target) -> Self {
        match target {
            Target::Content => IndexKind::Content,
            Target::Links => IndexKind::Links,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ResetTarget {
    Content,
    Links,
    All,
}

fn reset_paths(index: &IndexConfig, target: ResetTarget) -> Vec<PathBuf> {
    match target {
        ResetTarget::Content => vec![index.content_path.clone()],
        ResetTarget::Links => vec![index.links_path.clone()],
        ResetTarget::All => vec![index.content_path.clone(), index.links_path.clone()],
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resume_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = RagConfig::load(Some(&cli.config))?;
    let index = config.index.clone();

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?}", config.backend);
    tracing::info!("  - Content index: {}", index.content_path.display());
    tracing::info!("  - Links index: {}", index.links_path.display());

    let pipeline = RagPipeline::from_config(config)?;

    match cli.command {
        Command::Ingest {
            document_type,
            directory,
            index: target,
            reset,
        } => {
            let document_type: DocumentType = document_type.parse()?;
            let kind = IndexKind::from(target);
            if reset {
                pipeline.reset(index.path_for(kind)).await?;
            }

            match pipeline.ingest(&index, kind, &directory, document_type).await {
                Ok(report) => println!(
                    "Added {} chunk(s), skipped {} already indexed ({} changed since indexing)",
                    report.added, report.skipped, report.stale
                ),
                Err(err) => {
                    tracing::error!("Ingestion failed: {}", err);
                    eprintln!("{}", err.user_message());
                    std::process::exit(1);
                }
            }
        }
        Command::Reset { index: target } => {
            for path in reset_paths(&index, target) {
                pipeline.reset(&path).await?;
                println!("Removed {}", path.display());
            }
        }
        Command::Ask {
            question,
            language,
            job_description,
        } => {
            let text = question.join(" ");
            let query = match (job_description, language) {
                (Some(path), _) => {
                    let jd = tokio::fs::read_to_string(&path).await?;
                    Query::resume_rank(text, jd)
                }
                (None, Some(language)) => Query::new(text).with_language(language),
                (None, None) => Query::from_delimited(&text),
            };
            tracing::debug!("Query mode: {:?}", query.mode);
            if query.mode == QueryMode::ResumeRank {
                tracing::info!("Ranking every indexed chunk against the job description");
            }

            match pipeline.answer(&index, &query).await {
                Ok(answer) => {
                    println!("{}", answer.answer);
                    if !answer.links.is_empty() {
                        println!("\nLinks:");
                        for link in answer.links {
                            println!("  {}", link);
                        }
                    }
                }
                Err(err) => {
                    eprintln!("{}", err.user_message());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
