use crate::error::{RegistrationError, RegistrationErrorExt};
use std::collections::BTreeSet;
use std::fmt;
use trip_domain::constants::{COUNTER_KEY, EMAIL_LIST_KEY};
use trip_domain::model::{RegistrationState, normalize_email};
use trip_storage::{KeyValueStore, StoreKey};

/// Persistence gateway for the registration counter and the registered email list.
///
/// The state is read once by [`Self::open`] (or again with [`Self::load`]) and cached; the
/// duplicate and capacity gates answer from the cache. Each write goes through to the
/// backend immediately.
pub struct RegistrationStore<K> {
    backend: K,
    capacity: u32,
    counter_key: StoreKey,
    emails_key: StoreKey,
    state: RegistrationState,
}

impl<K: KeyValueStore> RegistrationStore<K> {
    /// Binds the gateway to `backend` and reads the current state.
    ///
    /// # Errors
    /// Only if the well-known keys are rejected by the storage layer. Missing or corrupt
    /// values are not errors; they read as zero and an empty list.
    pub async fn open(backend: K, capacity: u32) -> Result<Self, RegistrationError> {
        let mut store = Self {
            backend,
            capacity,
            counter_key: StoreKey::try_from(COUNTER_KEY).context("Counter key")?,
            emails_key: StoreKey::try_from(EMAIL_LIST_KEY).context("Email list key")?,
            state: RegistrationState::default(),
        };
        store.load().await;
        Ok(store)
    }

    /// Re-reads both persisted values, replacing the cache.
    pub async fn load(&mut self) -> &RegistrationState {
        self.state = RegistrationState {
            count: self.read_count().await,
            emails: self.read_emails().await,
        };
        tracing::debug!(
            count = self.state.count,
            emails = self.state.emails.len(),
            capacity = self.capacity,
            "Registration state loaded"
        );
        &self.state
    }

    /// Adds one registration: the email joins the list, then the counter goes up by one.
    ///
    /// The two writes are independent. If the second fails, the persisted list and counter
    /// disagree by one until the next registration.
    ///
    /// # Errors
    /// [`RegistrationError::Storage`] when a write fails. The cache only changes once both
    /// writes have succeeded, so a failed attempt can be retried.
    pub async fn record_registration(&mut self, email: &str) -> Result<(), RegistrationError> {
        let mut emails = self.state.emails.clone();
        emails.insert(normalize_email(email));
        let count = self.state.count.saturating_add(1);

        let list = serde_json::to_string(&emails).map_err(|e| RegistrationError::Internal {
            message: e.to_string().into(),
            context: Some("Encoding registered emails".into()),
        })?;
        self.backend.set(&self.emails_key, &list).await.context("Saving registered emails")?;
        self.backend
            .set(&self.counter_key, &count.to_string())
            .await
            .context("Saving registration counter")?;

        self.state = RegistrationState { count, emails };
        tracing::info!(count, capacity = self.capacity, "Registration recorded");
        Ok(())
    }

    /// Case-insensitive check against the registered list.
    #[must_use]
    pub fn is_duplicate(&self, email: &str) -> bool {
        self.state.contains_email(email)
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.state.count >= self.capacity
    }

    #[must_use]
    pub const fn count(&self) -> u32 {
        self.state.count
    }

    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    #[must_use]
    pub const fn spots_left(&self) -> u32 {
        self.capacity.saturating_sub(self.state.count)
    }

    #[must_use]
    pub const fn state(&self) -> &RegistrationState {
        &self.state
    }

    #[must_use]
    pub const fn backend(&self) -> &K {
        &self.backend
    }

    async fn read_count(&self) -> u32 {
        let raw = match self.backend.get(&self.counter_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return 0,
            Err(e) => {
                tracing::warn!(error = %e, "Reading registration counter failed, assuming 0");
                return 0;
            },
        };

        raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "Unreadable registration counter, assuming 0");
            0
        })
    }

    async fn read_emails(&self) -> BTreeSet<String> {
        let raw = match self.backend.get(&self.emails_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeSet::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Reading registered emails failed, assuming none");
                return BTreeSet::new();
            },
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => list.iter().map(String::as_str).map(normalize_email).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable registered email list, assuming none");
                BTreeSet::new()
            },
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for RegistrationStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationStore")
            .field("backend", &self.backend)
            .field("capacity", &self.capacity)
            .field("count", &self.state.count)
            .field("emails", &self.state.emails.len())
            .finish_non_exhaustive()
    }
}
