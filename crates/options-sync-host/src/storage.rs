use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::codec::CodecError;

/// An error resulting from operations on a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend reported a failure, for example `runtime.lastError`.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// The stored value could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A serialization or deserialization error.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// The storage area a bucket lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageAreaName {
    /// Synchronized across the user's browsers.
    #[default]
    Sync,
    /// Local to this browser profile.
    Local,
}

impl fmt::Display for StorageAreaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageAreaName::Sync => f.write_str("sync"),
            StorageAreaName::Local => f.write_str("local"),
        }
    }
}

/// Notification that one or more keys changed in a storage area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// The area in which the keys changed.
    pub area: StorageAreaName,
    /// The keys whose values changed.
    pub keys: Vec<String>,
}

impl StorageChange {
    /// Returns true if this change touches `key` in `area`.
    pub fn affects(&self, area: StorageAreaName, key: &str) -> bool {
        self.area == area && self.keys.iter().any(|changed| changed == key)
    }
}

/// This trait represents the host's persistent key-value storage. It is up to the platform to
/// implement it, and to broadcast a [StorageChange] for every successful write, including writes
/// made by other contexts of the same extension.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Retrieves the value stored at `key` in `area`, or `None` if nothing is stored.
    async fn get(&self, area: StorageAreaName, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replaces the value stored at `key` in `area`.
    async fn set(&self, area: StorageAreaName, key: &str, value: Value)
        -> Result<(), StorageError>;

    /// Subscribe to change notifications for all areas.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}
