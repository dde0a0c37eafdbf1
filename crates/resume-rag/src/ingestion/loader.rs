//! PDF loading into per-page documents
//!
//! Pages are extracted with lopdf so each keeps its own page number. When a
//! page cannot be decoded the whole file is re-read with pdf-extract and
//! returned as a single page.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::{Document, DocumentType};

/// Loads every document of one type from a directory
pub struct PdfLoader;

impl PdfLoader {
    /// Files of `document_type` directly inside `dir`, sorted by name
    pub fn list_files(dir: &Path, document_type: DocumentType) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(Error::load(
                dir.display().to_string(),
                "not a readable directory",
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::load(dir.display().to_string(), e.to_string()))?;
            let matches = entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str())
                    == Some(document_type.extension());
            if matches {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Load every matching file in `dir`; any unreadable file fails the whole call
    pub async fn load_directory(dir: &Path, document_type: DocumentType) -> Result<Vec<Document>> {
        let files = Self::list_files(dir, document_type)?;
        tracing::info!(
            "Found {} {} file(s) in {}",
            files.len(),
            document_type.display_name(),
            dir.display()
        );

        let mut documents = Vec::new();
        for path in files {
            documents.extend(Self::load_file(&path).await?);
        }
        Ok(documents)
    }

    /// Load one PDF as one `Document` per page
    pub async fn load_file(path: &Path) -> Result<Vec<Document>> {
        let source = path.display().to_string();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::load(source.clone(), e.to_string()))?;

        let pages = tokio::task::spawn_blocking({
            let source = source.clone();
            move || Self::parse_pdf(&source, &data)
        })
        .await
        .map_err(|e| Error::internal(format!("PDF parse task failed: {}", e)))??;

        tracing::debug!("Loaded {} page(s) from {}", pages.len(), source);
        Ok(pages)
    }

    /// Split PDF bytes into page documents tagged with `source`
    pub fn parse_pdf(source: &str, data: &[u8]) -> Result<Vec<Document>> {
        let doc = match lopdf::Document::load_mem(data) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("lopdf could not open {}: {}, trying pdf-extract", source, e);
                return Self::extract_whole(source, data);
            }
        };

        let mut documents = Vec::new();
        for (page_number, _) in doc.get_pages() {
            match doc.extract_text(&[page_number]) {
                Ok(text) => documents.push(Document::new(
                    cleanup_pdf_text(&text),
                    source,
                    page_number.saturating_sub(1),
                )),
                Err(e) => {
                    tracing::warn!(
                        "Page {} of {} could not be decoded ({}), extracting whole file",
                        page_number,
                        source,
                        e
                    );
                    return Self::extract_whole(source, data);
                }
            }
        }
        Ok(documents)
    }

    fn extract_whole(source: &str, data: &[u8]) -> Result<Vec<Document>> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::load(source, e.to_string()))?;
        Ok(vec![Document::new(cleanup_pdf_text(&text), source, 0)])
    }
}

/// Strip NUL bytes and expand typographic ligatures
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{00A0}', " ")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
}
