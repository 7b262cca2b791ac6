use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use options_sync_host::{
    MemoryStorageBackend, StorageAreaName, StorageBackend, StorageChange, StorageError,
};
use serde_json::Value;
use tokio::sync::broadcast;

/// A single entry in a [CallLog].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// A storage read.
    Get {
        /// Area read from.
        area: StorageAreaName,
        /// Key read.
        key: String,
    },
    /// A storage write.
    Set {
        /// Area written to.
        area: StorageAreaName,
        /// Key written.
        key: String,
        /// Raw value written.
        value: Value,
    },
    /// A marker recorded by test code, for example from inside a migration.
    Mark(String),
}

/// An ordered log of storage calls and test markers. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a marker at the current position.
    pub fn mark(&self, label: impl Into<String>) {
        self.push(Call::Mark(label.into()));
    }

    /// A copy of every call recorded so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().expect("Mutex should not be poisoned").clone()
    }

    /// The raw values of every write, in order.
    pub fn writes(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Set { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Position of the first call matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(predicate)
    }

    fn push(&self, call: Call) {
        self.0.lock().expect("Mutex should not be poisoned").push(call);
    }
}

/// A [StorageBackend] that records every call and can simulate backend failures.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    inner: MemoryStorageBackend,
    log: CallLog,
    failing_reads: AtomicBool,
    failing_writes: AtomicBool,
}

impl RecordingBackend {
    /// Create an empty backend with its own log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend recording into `log`.
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Seed a value without recording a call or emitting a change.
    pub fn with_value(mut self, area: StorageAreaName, key: &str, value: Value) -> Self {
        self.inner = self.inner.with_value(area, key, value);
        self
    }

    /// The log calls are recorded into.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// The raw value currently stored.
    pub fn value(&self, area: StorageAreaName, key: &str) -> Option<Value> {
        self.inner.value(area, key)
    }

    /// Make subsequent reads fail.
    pub fn fail_reads(&self, failing: bool) {
        self.failing_reads.store(failing, Ordering::SeqCst);
    }

    /// Make subsequent writes fail.
    pub fn fail_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl StorageBackend for RecordingBackend {
    async fn get(&self, area: StorageAreaName, key: &str) -> Result<Option<Value>, StorageError> {
        self.log.push(Call::Get {
            area,
            key: key.to_string(),
        });
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("simulated read failure".to_string()));
        }
        self.inner.get(area, key).await
    }

    async fn set(
        &self,
        area: StorageAreaName,
        key: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        self.log.push(Call::Set {
            area,
            key: key.to_string(),
            value: value.clone(),
        });
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("simulated write failure".to_string()));
        }
        self.inner.set(area, key, value).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.inner.subscribe()
    }
}
