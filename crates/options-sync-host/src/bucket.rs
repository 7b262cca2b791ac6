use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    codec,
    storage::{StorageAreaName, StorageBackend, StorageChange, StorageError},
};

/// How a bucket is written to storage. Reading always accepts both forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketEncoding {
    /// JSON, brotli-compressed and base64url-encoded into a single string.
    #[default]
    Compressed,
    /// The JSON object as-is.
    Plain,
}

/// The raw value found in a bucket, discriminated by its JSON shape.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredBucket {
    /// A string produced by [BucketEncoding::Compressed].
    Encoded(String),
    /// Any other value, written by [BucketEncoding::Plain] or by versions that predate encoding.
    Plain(Value),
}

impl From<Value> for StoredBucket {
    fn from(value: Value) -> Self {
        match value {
            Value::String(encoded) => StoredBucket::Encoded(encoded),
            other => StoredBucket::Plain(other),
        }
    }
}

impl StoredBucket {
    /// Decodes the bucket into `T`. Corrupt data is an error, never a silent reset.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StorageError> {
        match self {
            StoredBucket::Encoded(encoded) => {
                let json = codec::decompress(&encoded)?;
                Ok(serde_json::from_str(&json)?)
            }
            StoredBucket::Plain(value) => Ok(serde_json::from_value(value)?),
        }
    }
}

/// A single named bucket in one storage area.
///
/// The whole bucket is one value in the backend: [BucketStore::write] replaces it entirely.
#[derive(Clone)]
pub struct BucketStore {
    backend: Arc<dyn StorageBackend>,
    area: StorageAreaName,
    key: String,
    encoding: BucketEncoding,
}

impl std::fmt::Debug for BucketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketStore")
            .field("area", &self.area)
            .field("key", &self.key)
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl BucketStore {
    /// Create a handle to the bucket named `key` in `area`.
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        area: StorageAreaName,
        key: impl Into<String>,
        encoding: BucketEncoding,
    ) -> Self {
        Self {
            backend,
            area,
            key: key.into(),
            encoding,
        }
    }

    /// The bucket name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The storage area holding the bucket.
    pub fn area(&self) -> StorageAreaName {
        self.area
    }

    /// The backend the bucket is stored in.
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Returns true if `change` touches this bucket.
    pub fn is_affected_by(&self, change: &StorageChange) -> bool {
        change.affects(self.area, &self.key)
    }

    /// Reads and decodes the bucket. An absent or `null` bucket yields `T::default()`.
    pub async fn read<T: DeserializeOwned + Default>(&self) -> Result<T, StorageError> {
        match self.backend.get(self.area, &self.key).await? {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => StoredBucket::from(value).decode(),
        }
    }

    /// Encodes `value` and writes it, replacing anything previously stored in the bucket.
    pub async fn write<T: Serialize + Sync>(&self, value: &T) -> Result<(), StorageError> {
        let stored = match self.encoding {
            BucketEncoding::Compressed => {
                Value::String(codec::compress(&serde_json::to_string(value)?)?)
            }
            BucketEncoding::Plain => serde_json::to_value(value)?,
        };

        log::debug!("Writing bucket '{}' to {} storage", self.key, self.area);
        self.backend.set(self.area, &self.key, stored).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::MemoryStorageBackend;

    type Bag = BTreeMap<String, Value>;

    fn bucket(backend: &Arc<MemoryStorageBackend>, encoding: BucketEncoding) -> BucketStore {
        BucketStore::new(backend.clone(), StorageAreaName::Sync, "options", encoding)
    }

    #[test]
    fn stored_bucket_discriminates_on_string() {
        assert_eq!(
            StoredBucket::from(json!("abc")),
            StoredBucket::Encoded("abc".to_string())
        );
        assert_eq!(
            StoredBucket::from(json!({"a": 1})),
            StoredBucket::Plain(json!({"a": 1}))
        );
    }

    #[tokio::test]
    async fn absent_bucket_reads_as_default() {
        let backend = Arc::new(MemoryStorageBackend::new());
        let bag: Bag = bucket(&backend, BucketEncoding::Compressed)
            .read()
            .await
            .unwrap();
        assert!(bag.is_empty());
    }

    #[tokio::test]
    async fn compressed_write_stores_a_string() {
        let backend = Arc::new(MemoryStorageBackend::new());
        let store = bucket(&backend, BucketEncoding::Compressed);
        let bag: Bag = [("color".to_string(), json!("red"))].into();

        store.write(&bag).await.unwrap();

        let raw = backend.value(StorageAreaName::Sync, "options").unwrap();
        assert!(raw.is_string());
        assert_eq!(store.read::<Bag>().await.unwrap(), bag);
    }

    #[tokio::test]
    async fn plain_write_stores_the_object() {
        let backend = Arc::new(MemoryStorageBackend::new());
        let store = bucket(&backend, BucketEncoding::Plain);
        let bag: Bag = [("sound".to_string(), json!(false))].into();

        store.write(&bag).await.unwrap();

        assert_eq!(
            backend.value(StorageAreaName::Sync, "options"),
            Some(json!({"sound": false}))
        );
    }

    #[tokio::test]
    async fn reads_legacy_plain_bucket_with_compressed_encoding() {
        let backend = Arc::new(
            MemoryStorageBackend::new().with_value(
                StorageAreaName::Sync,
                "options",
                json!({"size": 30}),
            ),
        );
        let bag: Bag = bucket(&backend, BucketEncoding::Compressed)
            .read()
            .await
            .unwrap();
        assert_eq!(bag.get("size"), Some(&json!(30)));
    }

    #[tokio::test]
    async fn corrupt_encoded_bucket_is_an_error() {
        let backend = Arc::new(MemoryStorageBackend::new().with_value(
            StorageAreaName::Sync,
            "options",
            json!("%%% not encoded"),
        ));
        let result = bucket(&backend, BucketEncoding::Compressed)
            .read::<Bag>()
            .await;
        assert!(matches!(result, Err(StorageError::Codec(_))));
    }
}
