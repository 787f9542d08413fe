//! JSON file-backed key-value store.
//!
//! The whole store is one JSON object. It is read once on open and
//! rewritten after every mutation through a temporary sibling file, so a
//! crash mid-write leaves the previous contents intact.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::KeyValueStore;

// ============================================================================
// FileStore
// ============================================================================

/// Store persisted to a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: Mutex<FxHashMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first write.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file exists but cannot be read
    /// - [`Error::Storage`] if the file is not a JSON object of strings
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let slots = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => FxHashMap::default(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                Error::storage(format!("{} is not a valid store: {e}", path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => FxHashMap::default(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), slots = slots.len(), "Opened file store");

        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    /// Returns the backing file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, slots: &FxHashMap<String, String>) {
        if let Err(e) = write_atomic(&self.path, slots) {
            warn!(path = %self.path.display(), error = %e, "Failed to persist store");
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut slots = self.slots.lock();
        slots.insert(key.to_string(), value);
        self.persist(&slots);
    }

    fn remove(&self, key: &str) {
        let mut slots = self.slots.lock();
        if slots.remove(key).is_some() {
            self.persist(&slots);
        }
    }
}

fn write_atomic(path: &Path, slots: &FxHashMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(slots)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
