//! StatePersistence trait — pluggable key/value backend for the event store
//!
//! The store keeps one JSON document per bucket, so the backend only needs
//! whole-value save/load by key:
//! - `SledPersistence`: durable, flushed on every write
//! - `InMemoryPersistence`: tests and ephemeral deployments

use std::collections::HashMap;
use std::path::Path;

/// Trait for pluggable persistence backends
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across async tasks.
pub trait StatePersistence: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Returns only once the write is durable for this backend.
    fn save(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError>;

    /// Load the value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sled::Error> for PersistenceError {
    fn from(err: sled::Error) -> Self {
        PersistenceError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

// ============================================================================
// Sled
// ============================================================================

/// Sled-backed persistence. Every `save` is followed by a flush.
#[derive(Clone)]
pub struct SledPersistence {
    db: sled::Db,
}

impl SledPersistence {
    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref)?;
        tracing::info!("[EventStore] sled database opened at {:?}", path_ref);
        Ok(Self { db })
    }
}

impl StatePersistence for SledPersistence {
    fn save(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        self.db.insert(key.as_bytes(), value)?;
        self.db.flush()?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.db.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}

// ============================================================================
// In-Memory
// ============================================================================

/// In-memory persistence for testing and ephemeral deployments
///
/// Thread-safe via `RwLock`. Not durable — data lost on restart.
#[derive(Default)]
pub struct InMemoryPersistence {
    entries: std::sync::RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatePersistence for InMemoryPersistence {
    fn save(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
