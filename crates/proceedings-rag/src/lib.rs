//! proceedings-rag: question answering over parliamentary session PDFs
//!
//! Session transcripts are extracted, split into overlapping chunks and
//! ranked by keyword overlap for each question. The best chunks become the
//! context of a prompt to a generative backend. Summaries, legislative topics,
//! chunk indexes and answers are cached as artifacts.

pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod services;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::ProceedingsConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, ScoredChunk, SessionInfo},
    query::{ChatMessage, QaRequest},
    response::{QaResponse, SummaryArtifact, TopicsArtifact},
};
