//! Whole-transcript text for summary and topic prompts

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ingestion::TextExtractor;
use crate::storage::DocumentStore;

/// Reads a session PDF and returns its raw page text
pub struct TranscriptSource {
    documents: Arc<dyn DocumentStore>,
    extractor: Arc<TextExtractor>,
}

impl TranscriptSource {
    pub fn new(documents: Arc<dyn DocumentStore>, extractor: Arc<TextExtractor>) -> Self {
        Self { documents, extractor }
    }

    /// Raw text of every page, no boilerplate filtering
    ///
    /// A missing document is `Error::NotFound`; an unreadable one is
    /// `Error::Extraction`.
    pub async fn read(&self, filename: &str) -> Result<String> {
        let data = self.documents.read(filename).await?;
        let extractor = Arc::clone(&self.extractor);
        let name = filename.to_string();

        tokio::task::spawn_blocking(move || extractor.extract_raw(&name, &data))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }
}
