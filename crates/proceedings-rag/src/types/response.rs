//! Generated artifacts and API responses

use serde::{Deserialize, Serialize};

use super::document::SessionInfo;

/// Timestamp format written into artifacts
pub fn artifact_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Cached session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryArtifact {
    /// Markdown summary (or an error message when generation degraded)
    pub summary: String,
    pub generated_at: String,
    /// Always `markdown`
    pub format: String,
}

impl SummaryArtifact {
    /// Create a summary stamped with the current time
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            generated_at: artifact_timestamp(),
            format: "markdown".to_string(),
        }
    }
}

/// Whether topic sections were found; a count for the marker strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionsFound {
    Flag(bool),
    Count(usize),
}

impl SectionsFound {
    /// Whether generation produced usable topics
    pub fn is_found(&self) -> bool {
        match self {
            SectionsFound::Flag(found) => *found,
            SectionsFound::Count(n) => *n > 0,
        }
    }
}

/// Cached legislative topics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicsArtifact {
    /// Markdown topics (or an error message when generation degraded)
    pub topics: String,
    pub generated_at: String,
    pub sections_found: SectionsFound,
}

impl TopicsArtifact {
    /// Create a topics artifact stamped with the current time
    pub fn new(topics: impl Into<String>, sections_found: SectionsFound) -> Self {
        Self {
            topics: topics.into(),
            generated_at: artifact_timestamp(),
            sections_found,
        }
    }
}

/// Q&A answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResponse {
    pub answer: String,
    /// Served from the answer cache
    #[serde(default)]
    pub cached: bool,
    /// Chunks placed in the prompt context
    #[serde(default)]
    pub chunks_used: usize,
    pub status: String,
}

impl QaResponse {
    /// Successful answer
    pub fn success(answer: String, cached: bool, chunks_used: usize) -> Self {
        Self {
            answer,
            cached,
            chunks_used,
            status: "success".to_string(),
        }
    }
}

/// Session page data with rendered artifacts
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: SessionInfo,
    /// Summary rendered to HTML
    pub summary_html: String,
    /// Topics rendered to HTML
    pub topics_html: String,
}
