use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors from the durable storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable key-value storage for persisted session records, keyed by namespace
pub trait Storage: Send + Sync {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, namespace: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, namespace: &str) -> Result<(), StorageError>;
}

/// One JSON file per namespace inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

impl Storage for FileStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        let file = self.path_for(namespace);
        if !file.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(file)?))
    }

    fn save(&self, namespace: &str, value: &str) -> Result<(), StorageError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        fs::write(self.path_for(namespace), value)?;
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(namespace)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage; survives store re-creation but not the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(namespace)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(namespace).cloned())
    }

    fn save(&self, namespace: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(namespace.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(namespace);
        Ok(())
    }
}

/// Rehydrate a record, falling back to its default when missing or unreadable
pub(crate) fn rehydrate<T>(storage: &dyn Storage, namespace: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let loaded = storage
        .load(namespace)
        .and_then(|raw| match raw {
            Some(content) => Ok(Some(serde_json::from_str::<T>(&content)?)),
            None => Ok(None),
        });

    match loaded {
        Ok(Some(record)) => record,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!("Discarding unreadable '{}' record: {}", namespace, e);
            T::default()
        }
    }
}

/// Best-effort write; failures are logged, never surfaced
pub(crate) fn persist<T: Serialize>(storage: &dyn Storage, namespace: &str, record: &T) {
    let result = serde_json::to_string_pretty(record)
        .map_err(StorageError::from)
        .and_then(|content| storage.save(namespace, &content));

    if let Err(e) = result {
        tracing::warn!("Failed to persist '{}': {}", namespace, e);
    }
}

pub(crate) fn forget(storage: &dyn Storage, namespace: &str) {
    if let Err(e) = storage.remove(namespace) {
        tracing::warn!("Failed to remove '{}': {}", namespace, e);
    }
}
