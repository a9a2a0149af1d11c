//! Key/value storage backing the persisted session
//!
//! [`FileStore`] keeps every key in one JSON document on disk, the desktop
//! counterpart of browser local storage. [`MemoryStore`] is used in tests and
//! for throwaway sessions.

use crate::{ClientError, Result};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Synchronous string key/value storage
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; missing keys are not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<IndexMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().shift_remove(key);
        Ok(())
    }
}

/// Storage persisted as a single JSON object file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// File name used inside the storage directory
    pub const FILE_NAME: &'static str = "local-storage.json";

    /// Open (or lazily create) the store in `dir`
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::at(dir.join(Self::FILE_NAME))
    }

    /// Use an explicit file path
    #[must_use]
    pub const fn at(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<IndexMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(IndexMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|err| {
                ClientError::storage(format!("{} is not valid JSON: {err}", self.path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(IndexMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Current entries, or an empty map when the document cannot be parsed
    ///
    /// Returns whether the document was discarded so callers rewrite it.
    fn read_or_reset(&self) -> Result<(IndexMap<String, String>, bool)> {
        match self.read_all() {
            Ok(entries) => Ok((entries, false)),
            Err(ClientError::Storage { .. }) => {
                tracing::warn!(path = %self.path.display(), "discarding unreadable local storage");
                Ok((IndexMap::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn write_all(&self, entries: &IndexMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let (mut entries, _) = self.read_or_reset()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let (mut entries, discarded) = self.read_or_reset()?;
        if entries.shift_remove(key).is_some() || discarded {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
