//! Durable key/value storage for the three state namespaces.
//!
//! Every namespace holds one JSON document. Read and write failures are
//! reported to the caller; the stores above this layer log them and keep
//! running on their in-memory state.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::warn;

pub const BROWSER_CONFIG: &str = "browserConfig";
pub const CONVERSATION_CONTEXT: &str = "conversationContext";
pub const SCHEDULED_TASKS: &str = "scheduledTasks";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait Storage: Send + Sync {
    /// Read a namespace. `Ok(None)` means nothing has been written yet.
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError>;

    fn save(&self, namespace: &str, contents: &str) -> Result<(), StorageError>;
}

/// Load and decode a namespace, falling back to `None` on missing or corrupt data.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, namespace: &str) -> Option<T> {
    let raw = match storage.load(namespace) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(namespace, "Failed to read saved state, using defaults: {}", e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(namespace, "Saved state is corrupt, using defaults: {}", e);
            None
        }
    }
}

pub fn save_json<T: Serialize>(
    storage: &dyn Storage,
    namespace: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value)?;
    storage.save(namespace, &json)
}

/// Write a snapshot, logging instead of failing. In-memory state stays
/// authoritative when the write does not go through.
pub fn persist<T: Serialize>(storage: &dyn Storage, namespace: &str, value: &T) {
    if let Err(e) = save_json(storage, namespace, value) {
        warn!(namespace, "Failed to persist state: {}", e);
    }
}

/// One `<namespace>.json` file per namespace inside a state directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

impl Storage for FileStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(namespace)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, namespace: &str, contents: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(namespace);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    read_only: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Overwrite a namespace with raw contents, bypassing the read-only flag.
    pub fn insert_raw(&self, namespace: &str, contents: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(namespace.to_string(), contents.to_string());
    }

    pub fn raw(&self, namespace: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .cloned()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(namespace))
    }

    fn save(&self, namespace: &str, contents: &str) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "storage is read-only").into());
        }
        self.insert_raw(namespace, contents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("state"));

        assert!(storage.load(SCHEDULED_TASKS).unwrap().is_none());

        let sample = Sample {
            name: "tasks".into(),
            count: 2,
        };
        save_json(&storage, SCHEDULED_TASKS, &sample).unwrap();

        assert!(dir.path().join("state").join("scheduledTasks.json").exists());
        let loaded: Option<Sample> = load_json(&storage, SCHEDULED_TASKS);
        assert_eq!(loaded, Some(sample));
    }

    #[test]
    fn test_corrupt_data_loads_as_none() {
        let storage = MemoryStorage::new();
        storage.insert_raw(CONVERSATION_CONTEXT, "{not json");
        let loaded: Option<Sample> = load_json(&storage, CONVERSATION_CONTEXT);
        assert!(loaded.is_none());
    }

    #[test]
    fn test_read_only_storage_rejects_writes() {
        let storage = MemoryStorage::new();
        storage.set_read_only(true);
        let result = save_json(&storage, BROWSER_CONFIG, &1u32);
        assert!(matches!(result, Err(StorageError::Io(_))));

        // persist swallows the failure
        persist(&storage, BROWSER_CONFIG, &1u32);
        assert!(storage.raw(BROWSER_CONFIG).is_none());
    }
}
