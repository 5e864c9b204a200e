//! Answer caching with a fixed validity window

mod answer_cache;

pub use answer_cache::{AnswerCache, CacheStats, CachedAnswer};
