//! Chunk index per document, persisted through an artifact store

use std::sync::Arc;

use super::chunker::TextChunker;
use super::extractor::TextExtractor;
use crate::error::{Error, Result};
use crate::storage::{
    file_stem, get_json, put_json, validate_filename, ArtifactStore, DocumentStore, KeyedLocks,
};
use crate::types::Chunk;

/// Builds, persists and loads the chunk sequence of each document
pub struct ChunkIndexer {
    store: Arc<dyn ArtifactStore>,
    documents: Arc<dyn DocumentStore>,
    extractor: Arc<TextExtractor>,
    chunker: TextChunker,
    locks: KeyedLocks,
}

impl ChunkIndexer {
    /// Create a new indexer
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        documents: Arc<dyn DocumentStore>,
        extractor: Arc<TextExtractor>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            store,
            documents,
            extractor,
            chunker,
            locks: KeyedLocks::new(),
        }
    }

    /// Artifact key for a document's chunks
    pub fn chunk_key(filename: &str) -> String {
        format!("{}_chunks", file_stem(filename))
    }

    /// Check if chunks exist for this document
    pub async fn chunks_exist(&self, filename: &str) -> Result<bool> {
        validate_filename(filename)?;
        self.store.exists(&Self::chunk_key(filename)).await
    }

    /// Extract, chunk and persist a document's bytes; returns the chunk count
    pub async fn create_chunks(&self, filename: &str, data: Vec<u8>) -> Result<usize> {
        validate_filename(filename)?;

        let extractor = Arc::clone(&self.extractor);
        let chunker = self.chunker.clone();
        let name = filename.to_string();

        let chunks = tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
            let extracted = extractor.extract(&name, &data)?;
            Ok(chunker.chunk_text(&extracted.text))
        })
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        put_json(self.store.as_ref(), &Self::chunk_key(filename), &chunks).await?;

        tracing::info!("Indexed {} into {} chunks", filename, chunks.len());
        Ok(chunks.len())
    }

    /// Read a document from the document store and index it
    pub async fn index_document(&self, filename: &str) -> Result<usize> {
        let data = self.documents.read(filename).await?;
        self.create_chunks(filename, data).await
    }

    /// Index the document unless its chunks are already cached
    ///
    /// Concurrent callers for the same document wait for the first one
    /// instead of extracting twice.
    pub async fn ensure_chunks(&self, filename: &str) -> Result<()> {
        validate_filename(filename)?;
        let _guard = self.locks.lock(filename).await;

        if self.chunks_exist(filename).await? {
            tracing::debug!("Chunk cache hit for {}", filename);
            return Ok(());
        }

        self.index_document(filename).await?;
        Ok(())
    }

    /// Load the cached chunk sequence in document order
    pub async fn load_chunks(&self, filename: &str) -> Result<Vec<Chunk>> {
        validate_filename(filename)?;
        let texts: Vec<String> = get_json(self.store.as_ref(), &Self::chunk_key(filename))
            .await?
            .ok_or_else(|| Error::not_found(format!("No chunk index for {}", filename)))?;

        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(index, text))
            .collect())
    }

    /// Drop the cached chunks; returns whether any existed
    pub async fn invalidate(&self, filename: &str) -> Result<bool> {
        validate_filename(filename)?;
        let _guard = self.locks.lock(filename).await;
        self.remove_chunks(filename).await
    }

    /// Drop and rebuild the chunks; returns the new chunk count
    ///
    /// The document lock is held throughout, so `ensure_chunks` waits for
    /// the rebuilt index instead of extracting alongside it.
    pub async fn reindex(&self, filename: &str) -> Result<usize> {
        validate_filename(filename)?;
        let _guard = self.locks.lock(filename).await;
        self.remove_chunks(filename).await?;
        self.index_document(filename).await
    }

    /// Caller holds the document lock
    async fn remove_chunks(&self, filename: &str) -> Result<bool> {
        let removed = self.store.remove(&Self::chunk_key(filename)).await?;
        if removed {
            tracing::info!("Invalidated chunk index for {}", filename);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;
    use crate::storage::{JsonFileStore, LocalDocumentStore, MemoryStore};
    use crate::test_support::build_pdf;
    use tokio_test::assert_ok;

    fn indexer_with(store: Arc<dyn ArtifactStore>, docs_dir: &std::path::Path) -> ChunkIndexer {
        ChunkIndexer::new(
            store,
            Arc::new(LocalDocumentStore::new(docs_dir)),
            Arc::new(TextExtractor::new(&ExtractionConfig::default())),
            TextChunker::default(),
        )
    }

    #[test]
    fn test_chunk_key_uses_stem() {
        assert_eq!(ChunkIndexer::chunk_key("session_12.pdf"), "session_12_chunks");
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = indexer_with(Arc::new(MemoryStore::new()), dir.path());

        assert!(!indexer.chunks_exist("absent.pdf").await.unwrap());
        assert!(matches!(indexer.load_chunks("absent.pdf").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_assigns_indices_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn ArtifactStore> = Arc::new(MemoryStore::new());
        put_json(store.as_ref(), "session_chunks", &vec!["πρώτο", "δεύτερο"]).await.unwrap();

        let indexer = indexer_with(Arc::clone(&store), dir.path());
        let chunks = indexer.load_chunks("session.pdf").await.unwrap();

        assert_eq!(chunks, vec![Chunk::new(0, "πρώτο"), Chunk::new(1, "δεύτερο")]);
    }

    #[tokio::test]
    async fn test_corrupt_document_propagates_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.pdf"), b"not a pdf at all").unwrap();
        let indexer = indexer_with(Arc::new(MemoryStore::new()), dir.path());

        let result = indexer.ensure_chunks("broken.pdf").await;
        assert!(matches!(result, Err(Error::Extraction { .. })));
        assert!(!indexer.chunks_exist("broken.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let indexer = indexer_with(Arc::new(MemoryStore::new()), dir.path());
        assert!(matches!(indexer.ensure_chunks("absent.pdf").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_existing_cache_skips_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn ArtifactStore> = Arc::new(MemoryStore::new());
        put_json(store.as_ref(), "cached_chunks", &vec!["ήδη αποθηκευμένο"]).await.unwrap();

        // No PDF on disk: a cache hit must not touch the document store
        let indexer = indexer_with(Arc::clone(&store), dir.path());
        assert_ok!(indexer.ensure_chunks("cached.pdf").await);
        assert_eq!(indexer.load_chunks("cached.pdf").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn ArtifactStore> = Arc::new(MemoryStore::new());
        put_json(store.as_ref(), "s_chunks", &vec!["x"]).await.unwrap();

        let indexer = indexer_with(Arc::clone(&store), dir.path());
        assert!(indexer.invalidate("s.pdf").await.unwrap());
        assert!(!indexer.invalidate("s.pdf").await.unwrap());
        assert!(!indexer.chunks_exist("s.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_store_output_is_a_json_string_array() {
        let dir = tempfile::tempdir().unwrap();
        let chunks_dir = dir.path().join("chunks");
        let store: Arc<dyn ArtifactStore> = Arc::new(JsonFileStore::new(&chunks_dir));
        put_json(store.as_ref(), "s_chunks", &vec!["α", "β"]).await.unwrap();

        let raw = std::fs::read_to_string(chunks_dir.join("s_chunks.json")).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["α".to_string(), "β".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_document_persists_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn ArtifactStore> = Arc::new(MemoryStore::new());
        let indexer = indexer_with(Arc::clone(&store), dir.path());

        let count = indexer.create_chunks("blank.pdf", build_pdf(&[None])).await.unwrap();

        assert_eq!(count, 0);
        let stored: Vec<String> = get_json(store.as_ref(), "blank_chunks").await.unwrap().unwrap();
        assert!(stored.is_empty());
        assert!(indexer.load_chunks("blank.pdf").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recreating_chunks_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn ArtifactStore> = Arc::new(JsonFileStore::new(dir.path().join("chunks")));
        let indexer = indexer_with(Arc::clone(&store), dir.path());

        let text = "The chamber debated the annual budget. ".repeat(60);
        let pdf = build_pdf(&[Some(text.as_str()), Some(text.as_str())]);

        let first_count = indexer.create_chunks("budget.pdf", pdf.clone()).await.unwrap();
        let first = store.get("budget_chunks").await.unwrap().unwrap();
        let second_count = indexer.create_chunks("budget.pdf", pdf).await.unwrap();
        let second = store.get("budget_chunks").await.unwrap().unwrap();

        assert!(first_count > 1);
        assert_eq!(first_count, second_count);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_reindex_rebuilds_from_document() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn ArtifactStore> = Arc::new(MemoryStore::new());
        put_json(store.as_ref(), "s_chunks", &vec!["stale"]).await.unwrap();
        let text = "Members voted on the amendment after a long debate. ".repeat(10);
        std::fs::write(dir.path().join("s.pdf"), build_pdf(&[Some(text.as_str())])).unwrap();

        let indexer = Arc::new(indexer_with(Arc::clone(&store), dir.path()));
        let (rebuilt, ensured) =
            tokio::join!(indexer.reindex("s.pdf"), indexer.ensure_chunks("s.pdf"));

        assert!(rebuilt.unwrap() >= 1);
        assert_ok!(ensured);
        let chunks = indexer.load_chunks("s.pdf").await.unwrap();
        assert!(chunks.iter().all(|chunk| chunk.text != "stale"));
        assert!(chunks[0].text.contains("amendment"));
    }
}
