//! Per-key async mutual exclusion for check-compute-write sequences

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created async mutex per key
#[derive(Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    /// Create an empty lock map
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out before awaiting so no dashmap shard guard is held
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Number of keys that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no key has been locked yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
