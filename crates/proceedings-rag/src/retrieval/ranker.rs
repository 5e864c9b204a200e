//! Keyword-overlap ranking
//!
//! A chunk's score is the number of distinct lowercase words it shares with
//! the query. There is no weighting and no stemming.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::ingestion::ChunkIndexer;
use crate::types::{Chunk, ScoredChunk};

/// Unique lowercase whitespace-separated words
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Number of query words present in the chunk
pub fn score(query_tokens: &HashSet<String>, chunk_text: &str) -> usize {
    let chunk_tokens = tokenize(chunk_text);
    query_tokens.intersection(&chunk_tokens).count()
}

/// Score every chunk and keep the best `k`
///
/// Output is sorted by descending score; equal scores keep document order.
pub fn rank(query: &str, chunks: Vec<Chunk>, k: usize) -> Vec<ScoredChunk> {
    let query_tokens = tokenize(query);

    let mut scored: Vec<ScoredChunk> = chunks
        .into_iter()
        .map(|chunk| ScoredChunk {
            score: score(&query_tokens, &chunk.text),
            chunk,
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.chunk.index.cmp(&b.chunk.index))
    });
    scored.truncate(k);
    scored
}

/// Top-k retrieval against a document's persisted chunks
pub struct RelevanceRanker {
    indexer: Arc<ChunkIndexer>,
}

impl RelevanceRanker {
    pub fn new(indexer: Arc<ChunkIndexer>) -> Self {
        Self { indexer }
    }

    /// Best `k` chunks of `filename` for `query`
    ///
    /// Fails with `Error::NotFound` when the document has not been indexed.
    pub async fn top_k(&self, filename: &str, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let chunks = self.indexer.load_chunks(filename).await?;
        let total = chunks.len();
        let ranked = rank(query, chunks, k);

        tracing::debug!(
            "Ranked {} chunks of {} for query, best score {}",
            total,
            filename,
            ranked.first().map(|c| c.score).unwrap_or(0)
        );

        Ok(ranked)
    }
}
