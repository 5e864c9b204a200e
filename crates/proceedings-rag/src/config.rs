//! Configuration for the proceedings service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the media root
pub const MEDIA_ROOT_ENV: &str = "PROCEEDINGS_MEDIA_ROOT";

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProceedingsConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Where documents and cached artifacts live
    #[serde(default)]
    pub storage: StorageConfig,
    /// PDF text extraction
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval and prompt budget
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Answer cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Generative backend configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Topic extraction configuration
    #[serde(default)]
    pub topics: TopicsConfig,
}

impl ProceedingsConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(root) = std::env::var(MEDIA_ROOT_ENV) {
            if !root.trim().is_empty() {
                self.storage.media_root = PathBuf::from(root);
            }
        }
        self
    }

    /// Reject settings the chunker and ranker cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".to_string()));
        }
        if let TopicStrategy::Marker { marker } = &self.topics.strategy {
            if marker.trim().is_empty() {
                return Err(Error::Config("topics.strategy.marker must not be empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Storage layout under a single media root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Media root directory
    pub media_root: PathBuf,
}

impl StorageConfig {
    /// Directory holding the session PDFs
    pub fn documents_dir(&self) -> PathBuf {
        self.media_root.join("pdf_documents")
    }

    /// Directory holding chunk artifacts
    pub fn chunks_dir(&self) -> PathBuf {
        self.media_root.join("chunks")
    }

    /// Directory holding summary artifacts
    pub fn summaries_dir(&self) -> PathBuf {
        self.media_root.join("summaries")
    }

    /// Directory holding topic artifacts
    pub fn topics_dir(&self) -> PathBuf {
        self.media_root.join("topics")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let media_root = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("proceedings-rag")
            .join("media");

        Self { media_root }
    }
}

/// PDF text extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Lines containing any of these are running headers/footers
    pub boilerplate_markers: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            boilerplate_markers: vec![
                "ΒΟΥΛΗ ΤΩΝ ΑΝΤΙΠΡΟΣΩΠΩΝ".to_string(),
                "Σελίδα".to_string(),
            ],
        }
    }
}

/// Text chunking configuration (all sizes in characters)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size
    pub chunk_size: usize,
    /// Overlap between consecutive windows
    pub chunk_overlap: usize,
    /// Chunks whose trimmed length is not above this are dropped
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            min_chunk_size: 100,
        }
    }
}

/// Retrieval and prompt budget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks placed in the Q&A context
    pub top_k: usize,
    /// Trailing chat turns included in the Q&A prompt
    pub history_window: usize,
    /// Character budget for document text sent to the model
    pub max_context_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            history_window: 3,
            max_context_chars: 30_000,
        }
    }
}

/// Answer cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for cached answers in seconds
    pub answer_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            answer_ttl_secs: 3600, // 1 hour
        }
    }
}

/// Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// API key (usually supplied through GEMINI_API_KEY)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            api_key: None,
            temperature: 0.2,
            max_output_tokens: 2048,
            timeout_secs: 120,
        }
    }
}

/// Topic extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TopicsConfig {
    /// Which extraction strategy to run
    #[serde(default)]
    pub strategy: TopicStrategy,
}

/// Topic extraction strategy
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TopicStrategy {
    /// Single prompt over the whole (truncated) transcript
    #[default]
    Generic,
    /// Segment the transcript at a localized marker phrase first
    Marker {
        /// Phrase opening each legislative item
        #[serde(default = "default_topic_marker")]
        marker: String,
    },
}

/// Default phrase opening a legislative item in the minutes
pub fn default_topic_marker() -> String {
    "Νομοσχέδιο με τίτλο".to_string()
}
