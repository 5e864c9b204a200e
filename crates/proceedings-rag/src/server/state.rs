//! Application state for the proceedings server

use parking_lot::RwLock;
use std::fs;
use std::sync::Arc;

use crate::cache::AnswerCache;
use crate::config::ProceedingsConfig;
use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::ingestion::{ChunkIndexer, TextChunker, TextExtractor};
use crate::providers::{GeminiClient, LlmProvider};
use crate::services::{QaService, SessionSummarizer, TopicExtractor, TranscriptSource};
use crate::storage::{ArtifactStore, DocumentStore, JsonFileStore, LocalDocumentStore, MemoryStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: ProceedingsConfig,
    /// Session PDFs
    documents: Arc<dyn DocumentStore>,
    /// Chunk index
    indexer: Arc<ChunkIndexer>,
    /// Answer cache (process-local)
    answer_cache: Arc<AnswerCache>,
    /// Generative backend shared by every service
    llm: Arc<dyn LlmProvider>,
    qa: QaService,
    summarizer: SessionSummarizer,
    topics: TopicExtractor,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create application state backed by the Gemini client
    pub fn new(config: ProceedingsConfig) -> Result<Self> {
        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiClient::new(&config.llm)?);
        Self::with_llm(config, llm)
    }

    /// Create application state around an existing generative backend
    pub fn with_llm(config: ProceedingsConfig, llm: Arc<dyn LlmProvider>) -> Result<Self> {
        config.validate()?;
        let storage = &config.storage;
        tracing::info!("Initializing proceedings state (media root: {:?})", storage.media_root);

        fs::create_dir_all(storage.documents_dir())?;
        let documents: Arc<dyn DocumentStore> =
            Arc::new(LocalDocumentStore::new(storage.documents_dir()));
        let extractor = Arc::new(TextExtractor::new(&config.extraction));

        let chunk_store: Arc<dyn ArtifactStore> =
            Arc::new(JsonFileStore::new(storage.chunks_dir()));
        let summary_store: Arc<dyn ArtifactStore> =
            Arc::new(JsonFileStore::new(storage.summaries_dir()));
        let topic_store: Arc<dyn ArtifactStore> =
            Arc::new(JsonFileStore::new(storage.topics_dir()));
        let answer_store: Arc<dyn ArtifactStore> = Arc::new(MemoryStore::new());

        let indexer = Arc::new(ChunkIndexer::new(
            chunk_store,
            Arc::clone(&documents),
            Arc::clone(&extractor),
            TextChunker::from_config(&config.chunking),
        ));
        let answer_cache = Arc::new(AnswerCache::new(answer_store, config.cache.answer_ttl_secs));
        let prompts = PromptBuilder::from_config(&config.retrieval);
        let transcripts = Arc::new(TranscriptSource::new(Arc::clone(&documents), extractor));

        let qa = QaService::new(
            Arc::clone(&answer_cache),
            Arc::clone(&indexer),
            Arc::clone(&llm),
            prompts.clone(),
            config.retrieval.top_k,
        );
        let summarizer = SessionSummarizer::new(
            summary_store,
            Arc::clone(&transcripts),
            Arc::clone(&llm),
            prompts.clone(),
        );
        let topics = TopicExtractor::new(
            topic_store,
            transcripts,
            Arc::clone(&llm),
            prompts,
            config.topics.strategy.clone(),
        );

        tracing::info!(
            "Generative backend: {} ({}), topic strategy: {:?}",
            llm.name(),
            llm.model(),
            config.topics.strategy
        );

        let state = Self {
            inner: Arc::new(AppStateInner {
                config,
                documents,
                indexer,
                answer_cache,
                llm,
                qa,
                summarizer,
                topics,
                ready: RwLock::new(false),
            }),
        };
        state.set_ready(true);
        Ok(state)
    }

    /// Get configuration
    pub fn config(&self) -> &ProceedingsConfig {
        &self.inner.config
    }

    pub fn documents(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.documents
    }

    pub fn indexer(&self) -> &Arc<ChunkIndexer> {
        &self.inner.indexer
    }

    pub fn answer_cache(&self) -> &Arc<AnswerCache> {
        &self.inner.answer_cache
    }

    pub fn llm_provider(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    pub fn qa(&self) -> &QaService {
        &self.inner.qa
    }

    pub fn summarizer(&self) -> &SessionSummarizer {
        &self.inner.summarizer
    }

    pub fn topics(&self) -> &TopicExtractor {
        &self.inner.topics
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }

    /// Drop every derived artifact of a document
    ///
    /// Used when a document's bytes change.
    pub async fn invalidate_document(&self, filename: &str) -> Result<()> {
        self.inner.indexer.invalidate(filename).await?;
        self.inner.summarizer.invalidate(filename).await?;
        self.inner.topics.invalidate(filename).await?;
        self.inner.answer_cache.invalidate_document(filename).await?;
        Ok(())
    }
}
