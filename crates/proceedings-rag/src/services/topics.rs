//! Legislative topic extraction
//!
//! Two strategies share one interface: the generic one prompts over the whole
//! truncated transcript, the marker one first splits the transcript at each
//! occurrence of a phrase that opens a bill.

use std::sync::Arc;

use crate::config::TopicStrategy;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::LlmProvider;
use crate::storage::{file_stem, get_json, put_json, validate_filename, ArtifactStore, KeyedLocks};
use crate::types::{SectionsFound, TopicsArtifact};

use super::TranscriptSource;

/// Split `text` into sections that each start at `marker`
///
/// Text before the first marker is discarded. An empty marker yields no
/// sections.
pub fn split_sections(text: &str, marker: &str) -> Vec<String> {
    if marker.is_empty() {
        return Vec::new();
    }

    let starts: Vec<usize> = text.match_indices(marker).map(|(i, _)| i).collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(text.len());
            text[start..end].trim().to_string()
        })
        .collect()
}

/// Produces and caches a topics artifact per session
pub struct TopicExtractor {
    store: Arc<dyn ArtifactStore>,
    transcripts: Arc<TranscriptSource>,
    llm: Arc<dyn LlmProvider>,
    prompts: PromptBuilder,
    strategy: TopicStrategy,
    locks: KeyedLocks,
}

impl TopicExtractor {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        transcripts: Arc<TranscriptSource>,
        llm: Arc<dyn LlmProvider>,
        prompts: PromptBuilder,
        strategy: TopicStrategy,
    ) -> Self {
        Self {
            store,
            transcripts,
            llm,
            prompts,
            strategy,
            locks: KeyedLocks::new(),
        }
    }

    /// Artifact key for a document's topics
    pub fn topics_key(filename: &str) -> String {
        format!("{}_topics", file_stem(filename))
    }

    /// Cached topics, extracting them on first access
    pub async fn get_or_generate(&self, filename: &str) -> Result<TopicsArtifact> {
        validate_filename(filename)?;
        let _guard = self.locks.lock(filename).await;

        if let Some(topics) = get_json(self.store.as_ref(), &Self::topics_key(filename)).await? {
            tracing::debug!("Topics cache hit for {}", filename);
            return Ok(topics);
        }

        self.generate_and_store(filename).await
    }

    /// Discard the cached topics and extract them again
    pub async fn regenerate(&self, filename: &str) -> Result<TopicsArtifact> {
        validate_filename(filename)?;
        let _guard = self.locks.lock(filename).await;

        self.store.remove(&Self::topics_key(filename)).await?;
        self.generate_and_store(filename).await
    }

    /// Drop the cached topics; returns whether any existed
    pub async fn invalidate(&self, filename: &str) -> Result<bool> {
        validate_filename(filename)?;
        let _guard = self.locks.lock(filename).await;
        self.store.remove(&Self::topics_key(filename)).await
    }

    async fn generate_and_store(&self, filename: &str) -> Result<TopicsArtifact> {
        let text = match self.transcripts.read(filename).await {
            Ok(text) => text,
            Err(Error::Extraction { message, .. }) => {
                tracing::warn!("Could not read {}: {}", filename, message);
                String::new()
            }
            Err(e) => return Err(e),
        };

        let topics = self.extract(&text).await;
        if topics.sections_found == SectionsFound::Flag(false) {
            tracing::warn!("Topics for {} not cached: {}", filename, topics.topics);
            return Ok(topics);
        }

        put_json(self.store.as_ref(), &Self::topics_key(filename), &topics).await?;
        tracing::info!("Extracted topics for {}", filename);
        Ok(topics)
    }

    /// Run the configured strategy over a transcript
    ///
    /// Failures are reported inside the artifact with `sections_found: false`.
    pub async fn extract(&self, text: &str) -> TopicsArtifact {
        if text.trim().is_empty() {
            return TopicsArtifact::new(
                "Error: No content available to analyze",
                SectionsFound::Flag(false),
            );
        }

        let (prompt, sections_found) = match &self.strategy {
            TopicStrategy::Generic => (self.prompts.topics_prompt(text), SectionsFound::Flag(true)),
            TopicStrategy::Marker { marker } => {
                let sections = split_sections(text, marker);
                tracing::debug!("Found {} sections at marker {:?}", sections.len(), marker);
                if sections.is_empty() {
                    (self.prompts.topics_prompt(text), SectionsFound::Count(0))
                } else {
                    let count = sections.len();
                    (self.prompts.sectioned_topics_prompt(&sections), SectionsFound::Count(count))
                }
            }
        };

        match self.llm.generate(&prompt).await {
            Ok(topics) => TopicsArtifact::new(topics, sections_found),
            Err(e) => TopicsArtifact::new(
                format!("Error generating topics: {}", e),
                SectionsFound::Flag(false),
            ),
        }
    }
}
