use std::{collections::HashMap, sync::RwLock};

use serde_json::Value;
use tokio::sync::broadcast;

use crate::storage::{StorageAreaName, StorageBackend, StorageChange, StorageError};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// An in-process [StorageBackend]. Values live for as long as the backend does.
pub struct MemoryStorageBackend {
    values: RwLock<HashMap<(StorageAreaName, String), Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl std::fmt::Debug for MemoryStorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorageBackend").finish()
    }
}

impl Default for MemoryStorageBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorageBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Seeds a value without emitting a change notification.
    pub fn with_value(self, area: StorageAreaName, key: &str, value: Value) -> Self {
        self.values
            .write()
            .expect("RwLock should not be poisoned")
            .insert((area, key.to_string()), value);
        self
    }

    /// Returns a copy of the raw value stored at `key` in `area`.
    pub fn value(&self, area: StorageAreaName, key: &str) -> Option<Value> {
        self.values
            .read()
            .expect("RwLock should not be poisoned")
            .get(&(area, key.to_string()))
            .cloned()
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn get(&self, area: StorageAreaName, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.value(area, key))
    }

    async fn set(
        &self,
        area: StorageAreaName,
        key: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        self.values
            .write()
            .expect("RwLock should not be poisoned")
            .insert((area, key.to_string()), value);

        // Nobody listening is fine.
        let _ = self.changes.send(StorageChange {
            area,
            keys: vec![key.to_string()],
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
