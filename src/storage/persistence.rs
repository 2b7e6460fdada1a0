//! Whole-document persistence for the film and account collections.
//!
//! Each collection is stored as one JSON document that is rewritten in full
//! on every change. Writes go to a sibling temp file first and are renamed
//! into place, so a crash mid-write leaves the previous document intact.

use crate::core::{FilmError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;

/// Durable home of one document.
#[async_trait]
pub trait DocumentStore<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Reads the document. `Ok(None)` means nothing was ever written.
    async fn load(&self) -> Result<Option<T>>;

    /// Replaces the stored document with `document`.
    async fn save(&self, document: &T) -> Result<()>;
}

// ============================================================================
// JSON file
// ============================================================================

pub struct JsonFileStore<T> {
    path: PathBuf,
    _document: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _document: PhantomData,
        }
    }
}

#[async_trait]
impl<T> DocumentStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> Result<Option<T>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(FilmError::persistence(format!(
                    "Failed to read '{}': {}",
                    self.path.display(),
                    err
                )));
            }
        };

        let document = serde_json::from_slice(&bytes).map_err(|err| {
            FilmError::persistence(format!(
                "Failed to parse '{}': {}",
                self.path.display(),
                err
            ))
        })?;
        Ok(Some(document))
    }

    async fn save(&self, document: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document)?;
        atomic_write(&self.path, &bytes).await
    }
}

async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|err| {
            FilmError::persistence(format!(
                "Failed to create parent directory '{}': {}",
                parent.display(),
                err
            ))
        })?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await.map_err(|err| {
        FilmError::persistence(format!(
            "Failed to write temp file '{}': {}",
            tmp.display(),
            err
        ))
    })?;

    fs::rename(&tmp, path).await.map_err(|err| {
        FilmError::persistence(format!(
            "Failed to rename temp file '{}' -> '{}': {}",
            tmp.display(),
            path.display(),
            err
        ))
    })?;
    Ok(())
}

// ============================================================================
// In-memory
// ============================================================================

/// Keeps the document in process memory. Writes can be switched to fail,
/// which lets callers exercise their error paths.
pub struct MemoryDocumentStore<T> {
    document: Mutex<Option<T>>,
    fail_writes: AtomicBool,
}

impl<T> Default for MemoryDocumentStore<T> {
    fn default() -> Self {
        Self {
            document: Mutex::new(None),
            fail_writes: AtomicBool::new(false),
        }
    }
}

impl<T: Clone> MemoryDocumentStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: T) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Last successfully saved document.
    pub fn snapshot(&self) -> Option<T> {
        self.document
            .lock()
            .map(|document| document.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl<T> DocumentStore<T> for MemoryDocumentStore<T>
where
    T: Clone + Send + Sync,
{
    async fn load(&self) -> Result<Option<T>> {
        Ok(self.snapshot())
    }

    async fn save(&self, document: &T) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FilmError::persistence("write rejected"));
        }
        let mut slot = self
            .document
            .lock()
            .map_err(|err| FilmError::Internal(err.to_string()))?;
        *slot = Some(document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        items: Vec<u32>,
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::<Doc>::new(temp_dir.path().join("absent.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("doc.json");
        let store = JsonFileStore::<Doc>::new(&path);

        let doc = Doc { items: vec![1, 2, 3] };
        store.save(&doc).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(store.load().await.unwrap(), Some(doc));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileStore::<Doc>::new(&path);
        assert!(matches!(store.load().await, Err(FilmError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_memory_store_write_failure() {
        let store = MemoryDocumentStore::with_document(Doc { items: vec![1] });
        store.set_fail_writes(true);

        assert!(store.save(&Doc { items: vec![2] }).await.is_err());
        assert_eq!(store.snapshot(), Some(Doc { items: vec![1] }));
    }
}
