use crate::error::StorageError;
use crate::key::StoreKey;
use crate::store::KeyValueStore;
use async_trait::async_trait;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// A volatile [`KeyValueStore`] kept in process memory.
///
/// Clones share the same map, so a test can hand one clone to the code under test and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<FxHashMap<StoreKey, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `(key, value)` pairs.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidKey`] if any key is malformed.
    pub fn seeded<I, K, V>(entries: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = FxHashMap::default();
        for (key, value) in entries {
            map.insert(StoreKey::try_from(key.as_ref())?, value.into());
        }
        Ok(Self { entries: Arc::new(Mutex::new(map)) })
    }

    /// Synchronous peek used by tests and diagnostics.
    #[must_use]
    pub fn snapshot(&self, key: &StoreKey) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &StoreKey) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &StoreKey, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.clone(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &StoreKey) -> Result<bool, StorageError> {
        Ok(self.entries.lock().remove(key).is_some())
    }
}
