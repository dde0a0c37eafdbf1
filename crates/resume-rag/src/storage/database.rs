//! SQLite-backed vector index
//!
//! One database file per index directory. Embeddings are stored as
//! little-endian `f32` blobs and searched by brute-force cosine distance,
//! which is plenty for a resume-sized corpus.

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::providers::vector_store::{IndexRecord, ScoredPassage, VectorIndex};

/// Database file name inside an index directory
pub const INDEX_FILE: &str = "index.sqlite3";

/// Persistent vector index stored in `<dir>/index.sqlite3`
///
/// All access goes through one connection, so searches and writes on the
/// same index run one at a time. Separate indices never contend.
pub struct SqliteIndex {
    conn: Arc<Mutex<Connection>>,
    name: String,
}

impl SqliteIndex {
    /// Open the index in `dir`, creating the directory and schema on first use
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let conn = Connection::open(dir.join(INDEX_FILE))
            .map_err(|e| Error::index(format!("Failed to open {}: {}", dir.display(), e)))?;

        let index = Self {
            conn: Arc::new(Mutex::new(conn)),
            name: dir.display().to_string(),
        };

        index.migrate()?;
        Ok(index)
    }

    /// Create an in-memory index (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::index(format!("Failed to open in-memory database: {}", e)))?;

        let index = Self {
            conn: Arc::new(Mutex::new(conn)),
            name: ":memory:".to_string(),
        };

        index.migrate()?;
        Ok(index)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
        "#,
        )
        .map_err(|e| Error::index(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL,
                page INTEGER NOT NULL,
                chunk_index INTEGER NOT NULL,
                content_hash TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source, page);
        "#,
        )
        .map_err(|e| Error::index(format!("Failed to create schema: {}", e)))?;

        Ok(())
    }

    fn insert_all(conn: &mut Connection, records: &[IndexRecord]) -> Result<usize> {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                r#"INSERT OR IGNORE INTO chunks
                   (id, content, source, page, chunk_index, content_hash, embedding, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            )?;
            let now = Utc::now().to_rfc3339();

            for record in records {
                let chunk = &record.chunk;
                inserted += stmt.execute(params![
                    chunk.id,
                    chunk.content,
                    chunk.source,
                    chunk.page,
                    chunk.chunk_index,
                    chunk.content_hash(),
                    encode_embedding(&record.embedding),
                    now,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn nearest(conn: &Connection, query: &[f32], k: usize) -> Result<Vec<ScoredPassage>> {
        let mut stmt = conn.prepare("SELECT id, content, source, page, embedding FROM chunks")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, Vec<u8>>(4)?,
            ))
        })?;

        let mut scored = Vec::new();
        for row in rows {
            let (id, content, source, page, blob) = row?;
            let embedding = decode_embedding(&blob)?;
            if embedding.len() != query.len() {
                return Err(Error::index(format!(
                    "Embedding dimension mismatch for '{}': stored {}, query {}",
                    id,
                    embedding.len(),
                    query.len()
                )));
            }
            scored.push(ScoredPassage {
                score: cosine_distance(query, &embedding),
                id,
                content,
                source,
                page,
            });
        }

        // stable sort keeps insertion order among equal distances
        scored.sort_by(|a, b| a.score.total_cmp(&b.score));
        scored.truncate(k);
        Ok(scored)
    }
}

#[async_trait]
impl VectorIndex for SqliteIndex {
    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let conn = Arc::clone(&self.conn);
        let inserted = tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            Self::insert_all(&mut conn, &records)
        })
        .await
        .map_err(|e| Error::internal(format!("Index write task failed: {}", e)))??;

        tracing::debug!("Wrote {} rows to {}", inserted, self.name);
        Ok(())
    }

    async fn fingerprints(&self) -> Result<HashMap<String, String>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            let mut stmt = conn.prepare("SELECT id, content_hash FROM chunks")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect::<rusqlite::Result<HashMap<String, String>>>()
                .map_err(Error::from)
        })
        .await
        .map_err(|e| Error::internal(format!("Index read task failed: {}", e)))?
    }

    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredPassage>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let conn = Arc::clone(&self.conn);
        let query = query_embedding.to_vec();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            Self::nearest(&conn, &query, k)
        })
        .await
        .map_err(|e| Error::internal(format!("Index search task failed: {}", e)))?
    }

    async fn len(&self) -> Result<usize> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
        .map_err(|e| Error::internal(format!("Index count task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::index(format!(
            "Corrupt embedding blob of {} bytes",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// `1 - cosine similarity`; a zero vector is at distance 1 from everything
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}
