//! Markdown session summaries, generated once and cached per document

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::LlmProvider;
use crate::storage::{get_json, put_json, validate_filename, ArtifactStore, KeyedLocks};
use crate::types::SummaryArtifact;

use super::TranscriptSource;

/// Produces and caches a summary artifact per session
pub struct SessionSummarizer {
    store: Arc<dyn ArtifactStore>,
    transcripts: Arc<TranscriptSource>,
    llm: Arc<dyn LlmProvider>,
    prompts: PromptBuilder,
    locks: KeyedLocks,
}

impl SessionSummarizer {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        transcripts: Arc<TranscriptSource>,
        llm: Arc<dyn LlmProvider>,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            store,
            transcripts,
            llm,
            prompts,
            locks: KeyedLocks::new(),
        }
    }

    /// Cached summary, generating it on first access
    pub async fn get_or_generate(&self, filename: &str) -> Result<SummaryArtifact> {
        validate_filename(filename)?;
        let _guard = self.locks.lock(filename).await;

        if let Some(summary) = get_json(self.store.as_ref(), filename).await? {
            tracing::debug!("Summary cache hit for {}", filename);
            return Ok(summary);
        }

        self.generate_and_store(filename).await
    }

    /// Discard the cached summary and generate a new one
    pub async fn regenerate(&self, filename: &str) -> Result<SummaryArtifact> {
        validate_filename(filename)?;
        let _guard = self.locks.lock(filename).await;

        self.store.remove(filename).await?;
        self.generate_and_store(filename).await
    }

    /// Drop the cached summary; returns whether one existed
    pub async fn invalidate(&self, filename: &str) -> Result<bool> {
        validate_filename(filename)?;
        let _guard = self.locks.lock(filename).await;
        self.store.remove(filename).await
    }

    /// Generate a summary, caching it unless it only reports an error
    async fn generate_and_store(&self, filename: &str) -> Result<SummaryArtifact> {
        let transcript = match self.transcripts.read(filename).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => return Ok(Self::degraded(filename, "Error: Could not read PDF content")),
            Err(Error::Extraction { message, .. }) => {
                tracing::warn!("Could not read {}: {}", filename, message);
                return Ok(Self::degraded(filename, "Error: Could not read PDF content"));
            }
            Err(e) => return Err(e),
        };

        let prompt = self.prompts.summary_prompt(&transcript);
        let summary = match self.llm.generate(&prompt).await {
            Ok(text) => SummaryArtifact::new(text),
            Err(e) => {
                return Ok(Self::degraded(filename, format!("Error generating summary: {}", e)));
            }
        };

        put_json(self.store.as_ref(), filename, &summary).await?;
        tracing::info!("Generated summary for {}", filename);
        Ok(summary)
    }

    fn degraded(filename: &str, message: impl Into<String>) -> SummaryArtifact {
        let message = message.into();
        tracing::warn!("Summary for {} not cached: {}", filename, message);
        SummaryArtifact::new(message)
    }
}
