//! Key-value backends for the record store.
//!
//! The store talks to storage through [`KvBackend`], with two
//! implementations: a durable file-backed one and an in-process map.
//! The in-process variant doubles as the fallback the store degrades to
//! when the durable backend fails, and is constructed explicitly by the
//! hosting entry point rather than living as ambient global state.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, StoreError};

/// A minimal key-value interface: whole values in, whole values out.
pub trait KvBackend: Send + Sync {
    /// Short label for the storage type, surfaced via store statistics.
    fn label(&self) -> &'static str;

    /// Fetches the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Durable backend keeping one JSON file per key.
///
/// Writes go to a temp file first and are renamed into place, so a
/// crash mid-write never leaves a half-written value behind.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at the given directory.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| StoreError::DirectoryError {
                path: self.dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Writes data to a file atomically (temp file + rename).
    fn atomic_write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut temp_file = tempfile::NamedTempFile::new_in(&self.dir).map_err(|source| {
            StoreError::WriteError {
                path: path.to_path_buf(),
                source,
            }
        })?;

        temp_file
            .write_all(data)
            .map_err(|source| StoreError::WriteError {
                path: path.to_path_buf(),
                source,
            })?;

        temp_file
            .flush()
            .map_err(|source| StoreError::WriteError {
                path: path.to_path_buf(),
                source,
            })?;

        temp_file
            .persist(path)
            .map_err(|e| StoreError::WriteError {
                path: path.to_path_buf(),
                source: e.error,
            })?;

        Ok(())
    }
}

impl KvBackend for FileBackend {
    fn label(&self) -> &'static str {
        "durable"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| StoreError::ReadError { path, source })
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;
        self.atomic_write(&self.key_path(key), value.as_bytes())
    }
}

/// In-process backend that is lost on restart.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty in-process backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned lock just means a writer panicked mid-insert; the
        // map itself is still a usable map.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KvBackend for MemoryBackend {
    fn label(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_backend_roundtrip() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.put("tasks", "{\"next_id\":0}").unwrap();
        let value = backend.get("tasks").unwrap();

        assert_eq!(value.as_deref(), Some("{\"next_id\":0}"));
    }

    #[test]
    fn test_file_backend_missing_key() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        assert!(backend.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_overwrite() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.put("settings", "a").unwrap();
        backend.put("settings", "b").unwrap();

        assert_eq!(backend.get("settings").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_file_backend_creates_dir_on_write() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("state/records");
        let backend = FileBackend::new(&nested);

        backend.put("messages", "[]").unwrap();
        assert!(nested.join("messages.json").exists());
    }

    #[test]
    fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new();

        assert!(backend.get("tasks").unwrap().is_none());
        backend.put("tasks", "x").unwrap();
        assert_eq!(backend.get("tasks").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_labels() {
        let dir = tempdir().unwrap();
        assert_eq!(FileBackend::new(dir.path()).label(), "durable");
        assert_eq!(MemoryBackend::new().label(), "memory");
    }
}
