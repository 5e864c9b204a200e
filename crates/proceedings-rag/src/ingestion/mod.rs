//! Document ingestion: PDF text extraction, chunking and the chunk index

mod chunker;
mod extractor;
mod indexer;

pub use chunker::TextChunker;
pub use extractor::{ExtractedText, TextExtractor};
pub use indexer::ChunkIndexer;
