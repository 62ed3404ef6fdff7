//! Snapshot persistence contract.
//!
//! Every collection owned by the engine is durably stored as a JSON array
//! under a well-known key. The engine never touches the filesystem directly;
//! it goes through the [`Storage`] trait so tests can swap in an in-memory
//! implementation and force write failures.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

/// Well-known snapshot keys.
pub mod keys {
    pub const APPOINTMENTS: &str = "appointments";
    pub const FINANCES: &str = "finances";
    pub const SERVICES: &str = "services";
    pub const MATERIALS: &str = "materials";
    pub const CLIENTS: &str = "clients";
    pub const USERS: &str = "users";
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read \"{key}\": {source}")]
    Read { key: String, source: io::Error },
    #[error("failed to write \"{key}\": {source}")]
    Write { key: String, source: io::Error },
    #[error("corrupt snapshot \"{key}\": {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable key-value store for serialized collections.
///
/// `load` returns `None` for a key that was never written. `save` replaces
/// the whole payload for the key; partial updates do not exist at this layer.
pub trait Storage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError>;
}

// Lets callers keep a handle on the storage they hand to the engine.
impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        (**self).save(key, payload)
    }
}

/// One `<key>.json` file per snapshot key under a root directory.
///
/// Writes go to a temporary file first and are moved into place, so a crash
/// mid-write never leaves a truncated snapshot behind.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::Write {
            key: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        let wrap = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };

        let tmp = self.root.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, payload).map_err(wrap)?;
        std::fs::rename(&tmp, self.path_for(key)).map_err(wrap)
    }
}

/// In-memory storage for tests.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<HashMap<String, String>>,
    fail_saves: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, as if a previous process had written it.
    pub fn seed(self, key: &str, payload: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.insert(key.to_string(), payload.to_string());
        }
        self
    }

    /// When set, every `save` fails until cleared again.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.get(key).cloned())
    }

    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                key: key.to_string(),
                source: io::Error::other("storage failure injected by test"),
            });
        }
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_storage() -> FileStorage {
        let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../target/test_storage")
            .join(uuid::Uuid::new_v4().to_string());
        FileStorage::new(root).unwrap()
    }

    #[test]
    fn file_roundtrip() {
        let storage = file_storage();
        assert!(storage.load("appointments").unwrap().is_none());

        storage.save("appointments", "[]").unwrap();
        assert_eq!(storage.load("appointments").unwrap().unwrap(), "[]");

        storage.save("appointments", "[{\"id\":\"1\"}]").unwrap();
        assert_eq!(
            storage.load("appointments").unwrap().unwrap(),
            "[{\"id\":\"1\"}]"
        );
    }

    #[test]
    fn memory_save_failure() {
        let storage = MemoryStorage::new();
        storage.save("finances", "[]").unwrap();

        storage.fail_saves(true);
        assert!(storage.save("finances", "[1]").is_err());

        storage.fail_saves(false);
        assert_eq!(storage.load("finances").unwrap().unwrap(), "[]");
    }
}
