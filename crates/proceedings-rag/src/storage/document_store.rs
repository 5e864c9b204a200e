//! Source document storage
//!
//! Session PDFs are addressed by filename. The core only reads them; uploads
//! are the single write path.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Trait for source document storage
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List stored PDF filenames, sorted
    async fn list(&self) -> Result<Vec<String>>;

    /// Read a document's bytes
    async fn read(&self, filename: &str) -> Result<Vec<u8>>;

    /// Check if a document exists
    async fn exists(&self, filename: &str) -> Result<bool>;

    /// Store an uploaded document, returning the stored filename
    async fn save(&self, filename: &str, data: &[u8]) -> Result<String>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

/// Validate a document filename used as a key
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(Error::validation("Filename is required"));
    }
    if filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
        || filename.contains('\0')
    {
        return Err(Error::validation(format!("Invalid filename: {:?}", filename)));
    }
    Ok(())
}

/// Filename without its final extension (`session_12.pdf` -> `session_12`)
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => &filename[..pos],
        _ => filename,
    }
}

/// Session documents carry a lowercase `.pdf` extension
fn is_pdf(filename: &str) -> bool {
    filename.ends_with(".pdf") && filename.len() > ".pdf".len()
}

/// Rewrite an upload name to the `.pdf` form, rejecting other extensions
fn normalize_upload_name(filename: &str) -> Result<String> {
    let stem = file_stem(filename);
    let ext = &filename[stem.len()..];
    if stem.is_empty() || stem == filename || !ext.eq_ignore_ascii_case(".pdf") {
        return Err(Error::validation(format!(
            "Only PDF uploads are accepted: {}",
            filename
        )));
    }
    Ok(format!("{}.pdf", stem))
}

/// Pick a name in `dir` not taken by any entry, ignoring case
///
/// Artifact keys derive from the stem, so `s.PDF` next to `s.pdf` would
/// share cached artifacts.
fn available_name(dir: &Path, filename: &str) -> String {
    let taken: HashSet<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_lowercase))
        .collect();
    let is_free = |candidate: &str| !taken.contains(&candidate.to_lowercase());

    if is_free(filename) {
        return filename.to_string();
    }

    let stem = file_stem(filename);
    let ext = &filename[stem.len()..];
    (1..)
        .map(|n| format!("{}_{}{}", stem, n, ext))
        .find(|candidate| is_free(candidate))
        .unwrap_or_else(|| filename.to_string())
}

/// Documents in a local directory
pub struct LocalDocumentStore {
    dir: PathBuf,
}

impl LocalDocumentStore {
    /// Create a store over `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filesystem path of a document
    pub fn path_of(&self, filename: &str) -> Result<PathBuf> {
        validate_filename(filename)?;
        if !is_pdf(filename) {
            return Err(Error::validation(format!("Not a session document: {}", filename)));
        }
        Ok(self.dir.join(filename))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn list(&self) -> Result<Vec<String>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            if !dir.exists() {
                return Ok(Vec::new());
            }

            let mut names: Vec<String> = WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
                .filter(|name| is_pdf(name))
                .collect();
            names.sort();
            Ok(names)
        })
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.path_of(filename)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found(format!("Document {}", filename)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, filename: &str) -> Result<bool> {
        let path = self.path_of(filename)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn save(&self, filename: &str, data: &[u8]) -> Result<String> {
        validate_filename(filename)?;
        let filename = normalize_upload_name(filename)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let dir = self.dir.clone();
        let stored = tokio::task::spawn_blocking(move || available_name(&dir, &filename))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?;
        tokio::fs::write(self.dir.join(&stored), data).await?;

        tracing::info!("Stored document {} ({} bytes)", stored, data.len());
        Ok(stored)
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("session_12.pdf"), "session_12");
        assert_eq!(file_stem("archive.tar.pdf"), "archive.tar");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("session.pdf").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("../etc/passwd").is_err());
        assert!(validate_filename("a/b.pdf").is_err());
    }

    #[tokio::test]
    async fn test_list_only_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();
        std::fs::write(dir.path().join("c.pdf"), b"%PDF").unwrap();

        let store = LocalDocumentStore::new(dir.path());
        assert_eq!(
            store.list().await.unwrap(),
            vec!["b.pdf".to_string(), "c.pdf".to_string()]
        );
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path().join("absent"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path().join("pdf_documents"));

        let first = store.save("session.pdf", b"one").await.unwrap();
        let second = store.save("session.pdf", b"two").await.unwrap();

        assert_eq!(first, "session.pdf");
        assert_eq!(second, "session_1.pdf");
        assert_eq!(store.read("session.pdf").await.unwrap(), b"one");
        assert_eq!(store.read("session_1.pdf").await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_uppercase_extension_never_shares_a_stem() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path());

        let first = store.save("s.pdf", b"apples").await.unwrap();
        let second = store.save("s.PDF", b"zebras").await.unwrap();

        assert_eq!(first, "s.pdf");
        assert_eq!(second, "s_1.pdf");
        assert_eq!(store.list().await.unwrap(), vec!["s.pdf".to_string(), "s_1.pdf".to_string()]);
        assert_eq!(store.read("s.pdf").await.unwrap(), b"apples");
        assert!(matches!(store.read("s.PDF").await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_taken_names_compare_without_case() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Session.PDF"), b"old").unwrap();
        let store = LocalDocumentStore::new(dir.path());

        assert_eq!(store.save("session.pdf", b"new").await.unwrap(), "session_1.pdf");
        assert!(matches!(store.save("session", b"x").await, Err(Error::Validation(_))));
        assert!(matches!(store.save(".pdf", b"x").await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path());
        assert!(matches!(store.read("absent.pdf").await, Err(Error::NotFound(_))));
        assert!(matches!(store.save("notes.txt", b"x").await, Err(Error::Validation(_))));
    }
}
