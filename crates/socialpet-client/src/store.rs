//! Synchronous, process-local key-value persistence for session state.
//!
//! # Design
//! - The session reads the store once at startup and writes on every change,
//!   so the interface stays synchronous and tiny.
//! - `FileStore` rewrites the whole document through a temp file and rename;
//!   a crash mid-write leaves the previous document intact, and a failed
//!   rename removes the temp file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("session store io failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Persisted document could not be parsed.
    #[error("session store is corrupt")]
    Corrupt {
        /// Path of the unreadable document.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
    /// In-memory entries could not be encoded.
    #[error("failed to encode session store")]
    Encode {
        /// Source encode error.
        source: serde_json::Error,
    },
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal string store used to persist the session between runs.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; absent keys yield `None`.
    fn get_string(&self, key: &str) -> Option<String>;

    /// Insert or replace a value.
    ///
    /// # Errors
    ///
    /// Returns an error when the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove a value. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the removal could not be persisted.
    fn delete(&self, key: &str) -> StoreResult<()>;
}

/// Volatile store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is treated as empty; the file
    /// and its parent directory are created on first write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file exists but cannot be read and
    /// [`StoreError::Corrupt`] when it does not hold a JSON string map.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    operation: "file_store.read",
                    path,
                    source,
                });
            }
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "session store opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<F>(&self, apply: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.lock();
        let mut next = entries.clone();
        apply(&mut next);
        if next == *entries {
            return Ok(());
        }
        self.write(&next)?;
        *entries = next;
        Ok(())
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        let bytes =
            serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Encode { source })?;
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            operation: "file_store.create_dir",
            path: dir.to_path_buf(),
            source,
        })?;

        // Created owner-only (0600 on unix); it holds a bearer token.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| StoreError::Io {
            operation: "file_store.create_temp",
            path: dir.to_path_buf(),
            source,
        })?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|source| StoreError::Io {
                operation: "file_store.write",
                path: tmp.path().to_path_buf(),
                source,
            })?;
        tmp.persist(&self.path)
            .map(drop)
            .map_err(|err| StoreError::Io {
                operation: "file_store.rename",
                path: self.path.clone(),
                source: err.error,
            })
    }
}

impl KeyValueStore for FileStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn memory_store_set_get_delete() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("token", "tok-A")?;
        assert_eq!(store.get_string("token").as_deref(), Some("tok-A"));
        store.set("token", "tok-B")?;
        assert_eq!(store.get_string("token").as_deref(), Some("tok-B"));
        assert_eq!(store.len(), 1);
        store.delete("token")?;
        store.delete("token")?;
        assert!(store.get_string("token").is_none());
        Ok(())
    }

    #[test]
    fn file_store_survives_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::open(&path)?;
        assert!(store.get_string("token").is_none());
        store.set("token", "tok-A")?;
        store.set("user", "{\"id\":\"u-1\"}")?;
        drop(store);

        let reopened = FileStore::open(&path)?;
        assert_eq!(reopened.get_string("token").as_deref(), Some("tok-A"));
        reopened.delete("token")?;
        drop(reopened);

        let again = FileStore::open(&path)?;
        assert!(again.get_string("token").is_none());
        assert!(again.get_string("user").is_some());
        Ok(())
    }

    #[test]
    fn file_store_reports_corrupt_document() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        fs::write(&path, "not json")?;
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Corrupt { .. })
        ));
        Ok(())
    }

    #[test]
    fn file_store_treats_blank_file_as_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        fs::write(&path, "\n")?;
        let store = FileStore::open(&path)?;
        assert!(store.get_string("token").is_none());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path)?;
        store.set("token", "tok-A")?;
        let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        Ok(())
    }

    #[test]
    fn file_store_leaves_no_temp_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path)?;
        store.set("token", "tok-A")?;
        store.set("token", "tok-B")?;
        store.delete("token")?;

        let names = fs::read_dir(dir.path())?
            .map(|entry| entry.map(|entry| entry.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        assert_eq!(names, vec![std::ffi::OsString::from("session.json")]);
        Ok(())
    }

    #[test]
    fn failed_rename_keeps_state_and_cleans_up() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path)?;
        fs::create_dir(&path)?;

        assert!(matches!(
            store.set("token", "tok-A"),
            Err(StoreError::Io {
                operation: "file_store.rename",
                ..
            })
        ));
        assert!(store.get_string("token").is_none());
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
