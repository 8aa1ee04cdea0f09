//! Key-value persistence backends.
//!
//! A backend stores one serialized JSON document per key, the way browser
//! local storage does. [`load_json`] and [`save_json`] implement the
//! recovery policy shared by every store: a missing, empty or structurally
//! invalid value reads back as the default, and a failed write is logged and
//! reported as `false` instead of an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use sowonee_core::defaults::STORAGE_DIR_NAME;
use sowonee_core::{Error, Result};

/// Synchronous key-value store holding serialized JSON values.
pub trait StorageBackend: Send + Sync {
    /// Read the raw value for `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Erase `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Load and decode `key`, falling back to `T::default()`.
pub fn load_json<T>(backend: &dyn StorageBackend, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match backend.get(key) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => {
            debug!(storage_key = key, "No persisted value, using default");
            return T::default();
        }
        Err(e) => {
            warn!(storage_key = key, error = %e, "Failed to read persisted value, using default");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(storage_key = key, error = %e, "Ignoring corrupt persisted value");
            T::default()
        }
    }
}

/// Encode and write `value` under `key`. Returns whether the write succeeded.
pub fn save_json<T: Serialize>(backend: &dyn StorageBackend, key: &str, value: &T) -> bool {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!(storage_key = key, error = %e, "Failed to serialize value for storage");
            return false;
        }
    };

    match backend.set(key, &encoded) {
        Ok(()) => {
            trace!(storage_key = key, bytes = encoded.len(), "Persisted value");
            true
        }
        Err(e) => {
            warn!(storage_key = key, error = %e, "Failed to save to storage");
            false
        }
    }
}

/// Erase `key`, logging instead of failing.
pub fn remove_key(backend: &dyn StorageBackend, key: &str) -> bool {
    match backend.remove(key) {
        Ok(()) => true,
        Err(e) => {
            warn!(storage_key = key, error = %e, "Failed to remove persisted value");
            false
        }
    }
}

// =============================================================================
// MEMORY BACKEND
// =============================================================================

/// In-process backend.
///
/// An optional byte quota over the sum of stored values makes writes fail the
/// way a full browser storage does; a disabled backend rejects every call.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that rejects writes once stored values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Backend standing in for unavailable storage.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Seed a raw value, bypassing quota checks.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries().insert(key.into(), value.into());
    }

    /// Raw stored value, bypassing the disabled flag.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_enabled(&self) -> Result<()> {
        if self.disabled {
            return Err(Error::Storage("storage is unavailable".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_enabled()?;
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_enabled()?;
        let mut entries = self.entries();
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > quota {
                return Err(Error::Storage(format!(
                    "quota exceeded: {} of {} bytes",
                    others + value.len(),
                    quota
                )));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_enabled()?;
        self.entries().remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE BACKEND
// =============================================================================

/// One `<key>.json` file per key inside a directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader sees either the old or the new document.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory, e.g. `~/.local/share/sowonee` on Linux.
    pub fn default_dir() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push(STORAGE_DIR_NAME);
        path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::InvalidInput(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        let written = std::fs::write(&tmp, value).and_then(|()| std::fs::rename(&tmp, &path));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp file");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
