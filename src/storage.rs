//! Storage capability backing the cart.
//!
//! Mirrors browser local storage: string values under string keys. Reads
//! never fail (unreadable data is "absent"); writes report errors.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write storage key '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
}

pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

/// In-memory storage, for tests and hosts that sync state themselves
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key inside a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        // Create a stable file name for the key
        let safe_name = key.replace(['/', '\\', ':'], "_");
        self.dir.join(format!("{}.json", safe_name))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.item_path(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "unreadable storage item, treating as absent");
                None
            }
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.item_path(key), value).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })
    }
}
