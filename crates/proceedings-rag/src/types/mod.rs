//! Core types for the proceedings service

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ScoredChunk, SessionInfo};
pub use query::{ChatMessage, QaRequest};
pub use response::{QaResponse, SectionsFound, SessionDetail, SummaryArtifact, TopicsArtifact};
