//! Key/value blob storage backing the task store
//!
//! A [`BlobStorage`] holds opaque string blobs under short keys, the way
//! browser local storage does. Two backends ship:
//!
//! - [`FileStorage`]: one `<key>.json` file per key under a data directory,
//!   written atomically and guarded by a sidecar lock file
//! - [`MemoryStorage`]: a process-local map, used by tests and throwaway
//!   sessions
//!
//! # Directory Structure
//!
//! ```text
//! <data dir>/
//!   taskmaster.toml               # Optional configuration
//!   taskmaster_tasks.json         # Task collection blob (JSON array)
//!   taskmaster_tasks.json.lock    # Lock file for read-modify-write cycles
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Guard held for the duration of a read-modify-write cycle.
///
/// Backends without cross-process coordination hand out an empty guard.
#[derive(Debug, Default)]
pub struct BlobGuard {
    _lock: Option<FileLock>,
}

impl BlobGuard {
    pub fn unlocked() -> Self {
        Self { _lock: None }
    }

    fn file(lock: FileLock) -> Self {
        Self { _lock: Some(lock) }
    }
}

/// Persistent string storage keyed by name.
pub trait BlobStorage {
    /// Read the blob stored under `key`, `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the blob; removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Exclusive access to `key` across processes sharing this storage.
    fn lock(&self, _key: &str) -> Result<BlobGuard> {
        Ok(BlobGuard::unlocked())
    }
}

impl<T: BlobStorage + ?Sized> BlobStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn lock(&self, key: &str) -> Result<BlobGuard> {
        (**self).lock(key)
    }
}

/// Keys become file names, so keep them to a safe alphabet.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("storage key cannot be empty".to_string()));
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        || key.starts_with('.')
    {
        return Err(Error::InvalidArgument(format!(
            "invalid storage key '{key}' (use letters, digits, '_', '-', '.')"
        )));
    }
    Ok(())
}

/// File-backed blob storage rooted at a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the blob file for `key`
    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl BlobStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.blob_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Storage(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.blob_path(key);
        lock::write_atomic(&path, value.as_bytes()).map_err(|err| {
            Error::Storage(format!("failed to write {}: {err}", path.display()))
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.blob_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::Storage(format!(
                "failed to remove {}: {err}",
                path.display()
            ))),
        }
    }

    fn lock(&self, key: &str) -> Result<BlobGuard> {
        validate_key(key)?;
        let lock_path = lock::lock_path_for(self.blob_path(key));
        let lock = FileLock::acquire(&lock_path, self.lock_timeout_ms)?;
        Ok(BlobGuard::file(lock))
    }
}

/// In-memory blob storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| Error::Storage("memory storage mutex poisoned".to_string()))
    }
}

impl BlobStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items()?.remove(key);
        Ok(())
    }
}
