//! Configuration for the RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::retrieval::ContextStyle;

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Backend provider for embeddings and generation
    pub backend: BackendProvider,
    /// Persistent index locations
    pub index: IndexConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Gemini configuration (used when backend = gemini)
    pub gemini: GeminiConfig,
    /// Ollama configuration (used when backend = ollama)
    pub ollama: OllamaConfig,
    /// Offline hashing embedder configuration (used when backend = hashing)
    pub hashing: HashingConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str::<RagConfig>(&raw)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
            }
            Some(path) => {
                tracing::warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GOOGLE_API_KEY` and `RESUME_RAG_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            if !key.trim().is_empty() {
                self.gemini.api_key = Some(key);
            }
        }
        if let Ok(backend) = std::env::var("RESUME_RAG_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Ok(path) = std::env::var("RESUME_RAG_CONTENT_PATH") {
            self.index.content_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("RESUME_RAG_LINKS_PATH") {
            self.index.links_path = PathBuf::from(path);
        }
        Ok(())
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.retrieval.embedding_batch_size == 0 {
            return Err(Error::Config("retrieval.embedding_batch_size must be > 0".to_string()));
        }

        if self.backend == BackendProvider::Gemini
            && self.gemini.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(Error::Config(
                "Gemini backend selected but no API key (set GOOGLE_API_KEY)".to_string(),
            ));
        }

        if self.backend == BackendProvider::Hashing && self.hashing.dimensions == 0 {
            return Err(Error::Config("hashing.dimensions must be > 0".to_string()));
        }

        Ok(())
    }
}

/// Locations of the two independent persistent indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding the document-content index
    pub content_path: PathBuf,
    /// Directory holding the hyperlink index
    pub links_path: PathBuf,
}

impl IndexConfig {
    /// Create an index configuration from explicit paths
    pub fn new(content_path: impl Into<PathBuf>, links_path: impl Into<PathBuf>) -> Self {
        Self {
            content_path: content_path.into(),
            links_path: links_path.into(),
        }
    }

    /// Path for the given index
    pub fn path_for(&self, kind: IndexKind) -> &Path {
        match kind {
            IndexKind::Content => &self.content_path,
            IndexKind::Links => &self.links_path,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            content_path: PathBuf::from("chroma"),
            links_path: PathBuf::from("chroma_links"),
        }
    }
}

/// Which of the two indices an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Document content used as answer evidence
    Content,
    /// Separate corpus used only to recover hyperlinks
    Links,
}

impl std::str::FromStr for IndexKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "content" => Ok(Self::Content),
            "links" => Ok(Self::Links),
            other => Err(Error::InvalidInput(format!("unknown index '{}'", other))),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be > 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Passages retrieved from the content index (plain and multilingual modes)
    pub content_k: usize,
    /// Hits retrieved from the hyperlink index
    pub links_k: usize,
    /// Texts per embedding request during ingestion
    pub embedding_batch_size: usize,
    /// How retrieved passages are joined into the prompt context
    pub context_style: ContextStyle,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            content_k: 5,
            links_k: 5,
            embedding_batch_size: 100,
            context_style: ContextStyle::Delimited,
        }
    }
}

/// Gemini (Generative Language API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key; usually supplied through `GOOGLE_API_KEY`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Embedding model
    pub embedding_model: String,
    /// Generation model
    pub generation_model: String,
    /// Temperature for generation
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            embedding_model: "models/embedding-001".to_string(),
            generation_model: "gemini-1.5-flash".to_string(),
            temperature: 0.3,
        }
    }
}

/// Ollama configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.3,
        }
    }
}

/// Offline hashing embedder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Embedding dimensions
    pub dimensions: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self { dimensions: 256 }
    }
}

/// Backend provider selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Google Gemini via the Generative Language API
    #[default]
    Gemini,
    /// Local Ollama server
    Ollama,
    /// Deterministic offline embeddings; generation still goes through Ollama
    Hashing,
}

impl std::str::FromStr for BackendProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            "hashing" => Ok(Self::Hashing),
            other => Err(Error::Config(format!("unknown backend '{}'", other))),
        }
    }
}
