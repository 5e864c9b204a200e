//! Key-value stores for derived artifacts
//!
//! Every cache area (chunks, summaries, topics, answers) is an `ArtifactStore`
//! injected into the component that owns it. Values are raw JSON bytes so the
//! on-disk form keeps the field order of the serialized struct.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Key-value capability for persisted artifacts
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Read the raw value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Check whether `key` holds a value
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remove `key`; returns whether anything was removed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// List stored keys starting with `prefix`
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

/// Read and decode a JSON artifact
///
/// Undecodable values are reported and treated as absent so that the caller
/// regenerates them.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn ArtifactStore,
    key: &str,
) -> Result<Option<T>> {
    let Some(bytes) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!("Ignoring unreadable artifact '{}' in {}: {}", key, store.name(), e);
            Ok(None)
        }
    }
}

/// Encode and store a JSON artifact (2-space indented)
pub async fn put_json<T: Serialize + ?Sized>(
    store: &dyn ArtifactStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    store.put(key, bytes).await
}

/// Reject keys that would escape the store's namespace
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..")
        || key.contains('\0')
    {
        return Err(Error::validation(format!("Invalid artifact key: {:?}", key)));
    }
    Ok(())
}

/// Directory of `<key>.json` files
pub struct JsonFileStore {
    dir: PathBuf,
    name: String,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`; the directory is created lazily
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifacts".to_string());
        Self { dir, name }
    }

    /// Root directory of this store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl ArtifactStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write beside the target and rename so readers never see a partial file
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        tokio::fs::write(&tmp, &value).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!("Stored artifact '{}' in {} ({} bytes)", key, self.name, value.len());
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if let Some(key) = file_name.strip_suffix(".json") {
                if key.starts_with(prefix) && !key.starts_with('.') {
                    keys.push(key.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Process-local store, used for answers and in tests
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        summary: String,
        format: String,
    }

    #[tokio::test]
    async fn test_file_store_round_trip_is_pretty_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("summaries"));

        let sample = Sample {
            summary: "Ψηφίστηκε ο νόμος".to_string(),
            format: "markdown".to_string(),
        };
        assert_ok!(put_json(&store, "session_1.pdf", &sample).await);

        let raw = std::fs::read_to_string(dir.path().join("summaries/session_1.pdf.json")).unwrap();
        assert!(raw.contains("Ψηφίστηκε"), "non-ASCII must not be escaped");
        assert!(raw.contains("\n  \"summary\""), "2-space indentation expected");
        assert!(raw.find("summary").unwrap() < raw.find("format").unwrap());

        let loaded: Option<Sample> = get_json(&store, "session_1.pdf").await.unwrap();
        assert_eq!(loaded, Some(sample));
    }

    #[tokio::test]
    async fn test_file_store_missing_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(!store.exists("absent").await.unwrap());
        assert!(store.get("absent").await.unwrap().is_none());
        assert!(!store.remove("absent").await.unwrap());

        store.put("present", b"[]".to_vec()).await.unwrap();
        assert!(store.exists("present").await.unwrap());
        assert!(store.remove("present").await.unwrap());
        assert!(!store.exists("present").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert_err!(store.put("../escape", b"{}".to_vec()).await);
        assert_err!(store.get("nested/key").await);
        assert_err!(MemoryStore::new().put("", Vec::new()).await);
    }

    #[tokio::test]
    async fn test_corrupt_artifact_reads_as_absent() {
        let store = MemoryStore::new();
        store.put("broken", b"{not json".to_vec()).await.unwrap();

        let loaded: Option<Sample> = get_json(&store, "broken").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_keys_with_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let file_store = JsonFileStore::new(dir.path());
        let memory_store = MemoryStore::new();

        for store in [&file_store as &dyn ArtifactStore, &memory_store as &dyn ArtifactStore] {
            store.put("qa_aaa_1", b"1".to_vec()).await.unwrap();
            store.put("qa_aaa_2", b"2".to_vec()).await.unwrap();
            store.put("qa_bbb_1", b"3".to_vec()).await.unwrap();

            let keys = store.keys_with_prefix("qa_aaa_").await.unwrap();
            assert_eq!(keys, vec!["qa_aaa_1".to_string(), "qa_aaa_2".to_string()]);
        }
    }
}
