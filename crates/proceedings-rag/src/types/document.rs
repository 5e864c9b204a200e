//! Session documents and their chunks

use serde::{Deserialize, Serialize};

use crate::storage::file_stem;

/// A bounded slice of a document's extracted text, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the document's chunk sequence
    pub index: usize,
    /// Chunk text (trimmed)
    pub text: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Number of characters in the chunk
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A chunk with its lexical overlap score for a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: usize,
}

/// A parliamentary session backed by one PDF
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Document key
    pub filename: String,
    /// Display title (filename without extension)
    pub title: String,
    /// Public URL of the PDF
    pub url: String,
}

impl SessionInfo {
    /// Describe the session stored under `filename`
    pub fn from_filename(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            title: file_stem(filename).to_string(),
            url: format!("/media/pdf_documents/{}", filename),
        }
    }
}
