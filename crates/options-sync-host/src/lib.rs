#![doc = include_str!("../README.md")]

/// Asynchronous key-value storage areas and their change notifications.
pub mod storage;

/// Reading and writing a single named settings bucket.
pub mod bucket;

/// Compression used for encoded buckets.
pub mod codec;

/// Extension lifecycle signals.
pub mod lifecycle;

mod memory;

pub use bucket::{BucketEncoding, BucketStore, StoredBucket};
pub use codec::CodecError;
pub use lifecycle::{InstallType, Lifecycle};
pub use memory::MemoryStorageBackend;
pub use storage::{StorageAreaName, StorageBackend, StorageChange, StorageError};
