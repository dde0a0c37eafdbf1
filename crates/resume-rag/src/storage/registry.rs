//! Registry of open indices keyed by directory
//!
//! Each path gets one slot holding a lazily opened handle and the async
//! single-writer lock. Writers (ingest, reset) hold the lock for their whole
//! read-ids → embed → write sequence; readers only clone the handle.
//!
//! The handle itself sits behind an async `RwLock`. `reset` keeps its write
//! half until the directory is gone, so no reader can reopen (and cache) a
//! database file that is about to be unlinked.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{OwnedMutexGuard, RwLock};

use crate::error::{Error, Result};

use super::database::SqliteIndex;

#[derive(Default)]
struct IndexSlot {
    writer: Arc<tokio::sync::Mutex<()>>,
    handle: RwLock<Option<Arc<SqliteIndex>>>,
}

impl IndexSlot {
    async fn handle(&self, path: &Path) -> Result<Arc<SqliteIndex>> {
        if let Some(index) = self.handle.read().await.as_ref() {
            return Ok(Arc::clone(index));
        }

        let mut handle = self.handle.write().await;
        if let Some(index) = handle.as_ref() {
            return Ok(Arc::clone(index));
        }

        tracing::debug!("Opening index at {}", path.display());
        let dir = path.to_path_buf();
        let index = tokio::task::spawn_blocking(move || SqliteIndex::open(dir))
            .await
            .map_err(|e| Error::internal(format!("Index open task failed: {}", e)))??;
        let index = Arc::new(index);
        *handle = Some(Arc::clone(&index));
        Ok(index)
    }
}

/// Exclusive write access to one index path
pub struct WriteGuard {
    slot: Arc<IndexSlot>,
    path: PathBuf,
    _lock: OwnedMutexGuard<()>,
}

impl WriteGuard {
    /// Open (or reuse) the index this guard protects
    pub async fn index(&self) -> Result<Arc<SqliteIndex>> {
        self.slot.handle(&self.path).await
    }
}

/// Shared registry of persistent indices
#[derive(Default)]
pub struct IndexRegistry {
    slots: DashMap<PathBuf, Arc<IndexSlot>>,
}

/// `chroma`, `./chroma` and `$PWD/chroma` name the same slot
fn slot_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl IndexRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &Path) -> Arc<IndexSlot> {
        Arc::clone(self.slots.entry(key.to_path_buf()).or_default().value())
    }

    /// Handle for querying; takes no writer lock
    pub async fn reader(&self, path: &Path) -> Result<Arc<SqliteIndex>> {
        let key = slot_key(path);
        self.slot(&key).handle(&key).await
    }

    /// Wait for exclusive write access to `path`
    pub async fn writer(&self, path: &Path) -> WriteGuard {
        let key = slot_key(path);
        let slot = self.slot(&key);
        let lock = Arc::clone(&slot.writer).lock_owned().await;
        WriteGuard {
            slot,
            path: key,
            _lock: lock,
        }
    }

    /// Delete the whole index directory; a missing directory is not an error
    pub async fn reset(&self, path: &Path) -> Result<()> {
        let guard = self.writer(path).await;
        let mut handle = guard.slot.handle.write().await;
        handle.take();

        match tokio::fs::remove_dir_all(&guard.path).await {
            Ok(()) => {
                tracing::info!("Deleted index at {}", guard.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Index at {} does not exist, nothing to reset", guard.path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::vector_store::{IndexRecord, VectorIndex};
    use crate::storage::INDEX_FILE;
    use crate::types::Chunk;
    use std::time::Duration;

    fn record(id: &str) -> IndexRecord {
        let mut chunk = Chunk::new("text", "a.pdf", 0);
        chunk.id = id.to_string();
        IndexRecord {
            chunk,
            embedding: vec![1.0, 0.0],
        }
    }

    #[tokio::test]
    async fn test_reader_reuses_handle() {
        let dir = tempfile::tempdir().unwrap();
        let registry = IndexRegistry::new();
        let path = dir.path().join("content");

        let a = registry.reader(&path).await.unwrap();
        let b = registry.reader(&path).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_reset_removes_directory_and_handle() {
        let dir = tempfile::tempdir().unwrap();
        let registry = IndexRegistry::new();
        let path = dir.path().join("content");

        {
            let guard = registry.writer(&path).await;
            guard.index().await.unwrap().upsert(vec![record("a.pdf:0:0")]).await.unwrap();
        }
        assert!(path.exists());

        registry.reset(&path).await.unwrap();
        assert!(!path.exists());

        let index = registry.reader(&path).await.unwrap();
        assert_eq!(index.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reset_missing_directory_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let registry = IndexRegistry::new();
        registry.reset(&dir.path().join("never-created")).await.unwrap();
    }

    #[tokio::test]
    async fn test_writers_on_same_path_serialize() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(IndexRegistry::new());
        let path = dir.path().join("content");

        let first = registry.writer(&path).await;

        let contender = {
            let registry = Arc::clone(&registry);
            let path = path.clone();
            tokio::spawn(async move {
                let _guard = registry.writer(&path).await;
            })
        };

        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(first);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_equivalent_paths_share_writer_lock() {
        let registry = IndexRegistry::new();
        let relative = PathBuf::from("registry-lock-test");
        let dotted = PathBuf::from("./registry-lock-test");
        let absolute = std::env::current_dir().unwrap().join("registry-lock-test");

        let _guard = registry.writer(&relative).await;
        for other in [&dotted, &absolute] {
            let contended = tokio::time::timeout(Duration::from_millis(50), registry.writer(other)).await;
            assert!(contended.is_err(), "{} got its own lock", other.display());
        }
        assert_eq!(registry.slots.len(), 1);
    }

    #[tokio::test]
    async fn test_queries_run_while_writer_is_held() {
        let dir = tempfile::tempdir().unwrap();
        let registry = IndexRegistry::new();
        let path = dir.path().join("content");

        let guard = registry.writer(&path).await;
        guard.index().await.unwrap().upsert(vec![record("a.pdf:0:0")]).await.unwrap();

        let reader = registry.reader(&path).await.unwrap();
        let hits = tokio::time::timeout(Duration::from_secs(5), reader.search(&[1.0, 0.0], 3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hits.len(), 1);
        drop(guard);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_racing_reset_never_orphan_writes() {
        for round in 0..50 {
            let dir = tempfile::tempdir().unwrap();
            let registry = Arc::new(IndexRegistry::new());
            let path = dir.path().join("content");

            {
                let guard = registry.writer(&path).await;
                guard.index().await.unwrap().upsert(vec![record("old:0:0")]).await.unwrap();
            }

            let readers = {
                let registry = Arc::clone(&registry);
                let path = path.clone();
                tokio::spawn(async move {
                    for _ in 0..20 {
                        registry.reader(&path).await.unwrap();
                        tokio::task::yield_now().await;
                    }
                })
            };
            registry.reset(&path).await.unwrap();
            readers.await.unwrap();

            {
                let guard = registry.writer(&path).await;
                guard.index().await.unwrap().upsert(vec![record("new:0:0")]).await.unwrap();
            }

            assert!(path.join(INDEX_FILE).exists(), "round {}: index file missing", round);
            let reopened = SqliteIndex::open(&path).unwrap();
            let ids = reopened.fingerprints().await.unwrap();
            assert!(ids.contains_key("new:0:0"), "round {}: write was lost", round);
            assert!(!ids.contains_key("old:0:0"), "round {}: reset kept old rows", round);
        }
    }
}
