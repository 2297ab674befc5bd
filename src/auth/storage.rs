//! Durable client storage for the session pair.
//!
//! Storage is a small key-value map. Writes and removals take a batch of keys
//! and apply all of them or none, so the token and user entries can never be
//! observed half-written.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// File name used by [`FileStorage`] inside its directory.
pub const STORAGE_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("storage file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Key-value storage that survives process restarts.
pub trait DurableStorage: Send {
    /// Read a single entry.
    ///
    /// # Errors
    /// Returns an error when the backing store cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every entry, or none of them.
    ///
    /// # Errors
    /// Returns an error when the batch could not be persisted; prior values stay in place.
    fn write_all(&mut self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    /// Remove every key, or none of them. Missing keys are not an error.
    ///
    /// # Errors
    /// Returns an error when the removal could not be persisted.
    fn remove_all(&mut self, keys: &[&str]) -> Result<(), StorageError>;
}

/// In-process storage. Clones share the same entries, which lets tests model a
/// restart by handing a clone to a fresh session store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a single entry, bypassing batch semantics.
    ///
    /// # Errors
    /// Returns an error if the lock is poisoned.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DurableStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write_all(&mut self, batch: &[(&str, String)]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in batch {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_all(&mut self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

/// JSON file storage. Every change rewrites the whole file through a temporary
/// sibling and a rename, so readers see either the old map or the new one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(STORAGE_FILE)
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(self.path()) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Like `load`, but an unparsable file counts as empty; the next persist
    /// replaces it.
    fn load_replacing_corrupt(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.load() {
            Ok(entries) => Ok(entries),
            Err(StorageError::Json(err)) => {
                warn!("replacing unparsable storage file: {err}");
                Ok(BTreeMap::new())
            }
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self, entries), fields(path = %self.path().display()))]
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!("{STORAGE_FILE}.tmp"));
        let json = serde_json::to_vec_pretty(entries)?;

        if let Err(err) = write_private(&tmp, &json).and_then(|()| fs::rename(&tmp, self.path())) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!("could not remove {}: {cleanup}", tmp.display());
            }
            return Err(err.into());
        }

        debug!("persisted {} storage entries", entries.len());
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl DurableStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn write_all(&mut self, batch: &[(&str, String)]) -> Result<(), StorageError> {
        let mut entries = self.load_replacing_corrupt()?;
        for (key, value) in batch {
            entries.insert((*key).to_string(), value.clone());
        }
        self.persist(&entries)
    }

    fn remove_all(&mut self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.load_replacing_corrupt()?;
        for key in keys {
            entries.remove(*key);
        }
        self.persist(&entries)
    }
}
