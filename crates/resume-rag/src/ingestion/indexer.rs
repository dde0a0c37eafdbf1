//! Deduplicating indexer
//!
//! Chunks get positional ids, ids already in the index are skipped, and only
//! the remainder is embedded and written. Every embedding is computed before
//! the first write, so a provider failure leaves the index untouched.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, IndexRecord, VectorIndex};
use crate::types::{Chunk, IngestReport};

/// Assign `chunk_index` and `id` in one pass over `chunks`.
///
/// The index increments while consecutive chunks share `(source, page)` and
/// restarts at 0 whenever the pair changes.
pub fn assign_chunk_ids(chunks: &mut [Chunk]) {
    let mut previous: Option<(String, u32)> = None;
    let mut current = 0u32;

    for chunk in chunks.iter_mut() {
        let same_page = previous
            .as_ref()
            .map_or(false, |(source, page)| *source == chunk.source && *page == chunk.page);

        current = if same_page { current + 1 } else { 0 };
        chunk.chunk_index = current;
        chunk.id = format!("{}:{}", chunk.page_key(), current);

        if !same_page {
            previous = Some((chunk.source.clone(), chunk.page));
        }
    }
}

/// Appends new chunks to a vector index
pub struct DedupIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl DedupIndexer {
    /// Create an indexer embedding `batch_size` texts per provider call
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Self {
        Self {
            embedder,
            batch_size: batch_size.max(1),
        }
    }

    /// Index `chunks`, writing only ids the index does not hold yet
    pub async fn index(&self, index: &dyn VectorIndex, mut chunks: Vec<Chunk>) -> Result<IngestReport> {
        assign_chunk_ids(&mut chunks);

        let existing = index.fingerprints().await?;
        tracing::info!("Number of existing chunks in {}: {}", index.name(), existing.len());

        let mut report = IngestReport::default();
        let mut seen = HashSet::new();
        let mut new_chunks = Vec::new();

        for chunk in chunks {
            if let Some(stored_hash) = existing.get(&chunk.id) {
                report.skipped += 1;
                if *stored_hash != chunk.content_hash() {
                    report.stale += 1;
                    tracing::warn!(
                        "Chunk {} changed since it was indexed; keeping the stored version",
                        chunk.id
                    );
                }
                continue;
            }
            if !seen.insert(chunk.id.clone()) {
                tracing::debug!("Duplicate chunk id {} in batch, keeping first", chunk.id);
                report.skipped += 1;
                continue;
            }
            new_chunks.push(chunk);
        }

        if new_chunks.is_empty() {
            tracing::info!("No new chunks to add to {}", index.name());
            return Ok(report);
        }

        tracing::info!("Adding new chunks to {}: {}", index.name(), new_chunks.len());

        let mut records = Vec::with_capacity(new_chunks.len());
        for batch in new_chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "{} returned {} embeddings for {} chunks",
                    self.embedder.name(),
                    embeddings.len(),
                    batch.len()
                )));
            }

            tracing::debug!("Embedded batch of {} chunks", batch.len());
            records.extend(batch.iter().cloned().zip(embeddings).map(|(chunk, embedding)| {
                IndexRecord { chunk, embedding }
            }));
        }

        report.added = records.len();
        index.upsert(records).await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashingEmbedder;
    use crate::storage::SqliteIndex;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn chunk(source: &str, page: u32, content: &str) -> Chunk {
        Chunk::new(content, source, page)
    }

    fn indexer() -> DedupIndexer {
        DedupIndexer::new(Arc::new(HashingEmbedder::new(32).unwrap()), 2)
    }

    /// Fails on the n-th batch call
    struct FailingEmbedder {
        calls: AtomicUsize,
        fail_on: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_on {
                return Err(Error::embedding("quota exceeded"));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_chunk_index_resets_when_page_changes() {
        let mut chunks = vec![
            chunk("s", 0, "a"),
            chunk("s", 0, "b"),
            chunk("s", 1, "c"),
            chunk("s", 0, "d"),
        ];
        assign_chunk_ids(&mut chunks);

        let indices: Vec<u32> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 0, 0]);
        assert_eq!(chunks[1].id, "s:0:1");
        assert_eq!(chunks[2].id, "s:1:0");
        assert_eq!(chunks[3].id, "s:0:0");
    }

    #[test]
    fn test_chunk_ids_are_deterministic() {
        let make = || vec![chunk("a.pdf", 0, "x"), chunk("a.pdf", 0, "y"), chunk("b.pdf", 0, "z")];
        let mut first = make();
        let mut second = make();
        assign_chunk_ids(&mut first);
        assign_chunk_ids(&mut second);
        assert_eq!(first, second);
        assert_eq!(first[2].id, "b.pdf:0:0");
    }

    #[tokio::test]
    async fn test_only_new_ids_are_added() {
        let index = SqliteIndex::in_memory().unwrap();
        let indexer = indexer();

        let report = indexer
            .index(&index, vec![chunk("A", 0, "alpha"), chunk("B", 0, "beta")])
            .await
            .unwrap();
        assert_eq!(report.added, 2);

        let report = indexer
            .index(&index, vec![chunk("A", 0, "alpha"), chunk("C", 0, "gamma")])
            .await
            .unwrap();
        assert_eq!(report, IngestReport { added: 1, skipped: 1, stale: 0 });

        let ids = index.fingerprints().await.unwrap();
        let mut ids: Vec<_> = ids.keys().cloned().collect();
        ids.sort();
        assert_eq!(ids, vec!["A:0:0", "B:0:0", "C:0:0"]);
    }

    #[tokio::test]
    async fn test_reingest_is_idempotent() {
        let index = SqliteIndex::in_memory().unwrap();
        let indexer = indexer();
        let chunks = vec![chunk("a", 0, "one"), chunk("a", 0, "two"), chunk("a", 1, "three")];

        indexer.index(&index, chunks.clone()).await.unwrap();
        let report = indexer.index(&index, chunks).await.unwrap();

        assert_eq!(report.added, 0);
        assert_eq!(report.skipped, 3);
        assert_eq!(index.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_changed_content_is_reported_stale_but_kept() {
        let index = SqliteIndex::in_memory().unwrap();
        let indexer = indexer();

        indexer.index(&index, vec![chunk("a", 0, "old text")]).await.unwrap();
        let report = indexer.index(&index, vec![chunk("a", 0, "new text")]).await.unwrap();

        assert_eq!(report, IngestReport { added: 0, skipped: 1, stale: 1 });
        let hits = index.search(&[1.0; 32], 1).await.unwrap();
        assert_eq!(hits[0].content, "old text");
    }

    #[tokio::test]
    async fn test_duplicate_ids_in_one_call_keep_first() {
        let index = SqliteIndex::in_memory().unwrap();
        let report = indexer()
            .index(&index, vec![chunk("s", 0, "first"), chunk("s", 1, "other"), chunk("s", 0, "second")])
            .await
            .unwrap();

        assert_eq!(report, IngestReport { added: 2, skipped: 1, stale: 0 });
        assert_eq!(index.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_embedding_failure_writes_nothing() {
        let index = SqliteIndex::in_memory().unwrap();
        let indexer = DedupIndexer::new(
            Arc::new(FailingEmbedder {
                calls: AtomicUsize::new(0),
                fail_on: 1,
            }),
            1,
        );

        let result = indexer
            .index(&index, vec![chunk("a", 0, "one"), chunk("b", 0, "two")])
            .await;

        assert!(matches!(result, Err(Error::Embedding(_))));
        assert_eq!(index.len().await.unwrap(), 0);
    }
}
