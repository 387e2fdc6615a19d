use crate::error::StorageError;
use crate::key::StoreKey;
use async_trait::async_trait;
use std::sync::Arc;

/// String key-value persistence.
///
/// Implementations make each individual `set` durable and atomic; nothing is promised
/// across keys.
#[async_trait]
pub trait KeyValueStore: std::fmt::Debug + Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    async fn get(&self, key: &StoreKey) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &StoreKey, value: &str) -> Result<(), StorageError>;

    /// Deletes the key. Returns whether a value was present.
    async fn remove(&self, key: &StoreKey) -> Result<bool, StorageError>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &StoreKey) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &StoreKey, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &StoreKey) -> Result<bool, StorageError> {
        (**self).remove(key).await
    }
}
