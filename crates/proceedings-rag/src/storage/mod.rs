//! Storage for source documents and derived artifacts

mod artifact_store;
mod document_store;
mod keyed_locks;

pub use artifact_store::{get_json, put_json, ArtifactStore, JsonFileStore, MemoryStore};
pub use document_store::{file_stem, validate_filename, DocumentStore, LocalDocumentStore};
pub use keyed_locks::KeyedLocks;
