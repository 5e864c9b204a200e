//! Cached Q&A answers keyed by document and question
//!
//! Entries live in an injected `ArtifactStore` and expire after a TTL. Expired
//! entries read as absent and are removed on that read.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::storage::{file_stem, get_json, put_json, validate_filename, ArtifactStore};

/// Cached answer with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnswer {
    /// Original question
    pub question: String,
    /// Generated answer
    pub answer: String,
    /// When this was cached
    pub cached_at: DateTime<Utc>,
    /// When this stops being served
    pub expires_at: DateTime<Utc>,
}

impl CachedAnswer {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Answer cache over an artifact store
pub struct AnswerCache {
    store: Arc<dyn ArtifactStore>,
    /// TTL for cache entries (seconds)
    ttl_seconds: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AnswerCache {
    /// Create a new answer cache
    pub fn new(store: Arc<dyn ArtifactStore>, ttl_seconds: u64) -> Self {
        Self {
            store,
            ttl_seconds,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Prefix shared by every answer cached for a document
    fn document_prefix(filename: &str) -> String {
        format!("{}_qa_", file_stem(filename))
    }

    /// Cache key for a (document, question) pair
    pub fn cache_key(filename: &str, question: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(filename.as_bytes());
        hasher.update([0u8]);
        hasher.update(question.as_bytes());
        format!("{}{}", Self::document_prefix(filename), hex::encode(hasher.finalize()))
    }

    /// Get a cached answer if it is still valid
    pub async fn get(&self, filename: &str, question: &str) -> Result<Option<String>> {
        validate_filename(filename)?;
        let key = Self::cache_key(filename, question);

        let entry: Option<CachedAnswer> = get_json(self.store.as_ref(), &key).await?;
        let answer = match entry {
            Some(entry) if entry.question != question => {
                tracing::debug!("Cache miss (key collision): {}", &key);
                None
            }
            Some(entry) if entry.is_expired(Utc::now()) => {
                tracing::debug!("Cache miss (TTL expired): {}", &key);
                self.store.remove(&key).await?;
                None
            }
            Some(entry) => Some(entry.answer),
            None => None,
        };

        match answer {
            Some(answer) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Cache hit: {}", &key);
                Ok(Some(answer))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    /// Store an answer valid for `ttl_seconds`
    pub async fn put(
        &self,
        filename: &str,
        question: &str,
        answer: &str,
        ttl_seconds: u64,
    ) -> Result<()> {
        validate_filename(filename)?;
        let key = Self::cache_key(filename, question);

        let cached_at = Utc::now();
        let expires_at = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| cached_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let entry = CachedAnswer {
            question: question.to_string(),
            answer: answer.to_string(),
            cached_at,
            expires_at,
        };

        put_json(self.store.as_ref(), &key, &entry).await?;
        tracing::debug!("Cached answer: {}", &key);
        Ok(())
    }

    /// Store an answer with the configured TTL
    pub async fn put_default(&self, filename: &str, question: &str, answer: &str) -> Result<()> {
        self.put(filename, question, answer, self.ttl_seconds).await
    }

    /// Drop every cached answer for a document
    ///
    /// Called when a document is replaced or re-indexed
    pub async fn invalidate_document(&self, filename: &str) -> Result<usize> {
        validate_filename(filename)?;
        let prefix = Self::document_prefix(filename);
        let keys = self.store.keys_with_prefix(&prefix).await?;

        let mut invalidated = 0;
        // `a.pdf` shares its prefix with keys of `a_qa_b.pdf`; only a bare
        // question hash may follow it
        for key in keys
            .into_iter()
            .filter(|key| key.strip_prefix(&prefix).map_or(false, is_question_hash))
        {
            if self.store.remove(&key).await? {
                invalidated += 1;
            }
        }

        if invalidated > 0 {
            tracing::info!("Invalidated {} cached answers for {}", invalidated, filename);
        }
        Ok(invalidated)
    }

    /// Get cache statistics
    pub async fn stats(&self) -> Result<CacheStats> {
        let entries = self.store.keys_with_prefix("").await?.len();
        Ok(CacheStats {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl_seconds: self.ttl_seconds,
        })
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

/// Hex SHA-256 digest, the tail of every answer key
fn is_question_hash(tail: &str) -> bool {
    tail.len() == 64 && tail.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub ttl_seconds: u64,
}
