use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors surfaced by key-value store backends.
///
/// Decode failures are not represented here: a corrupt payload is a
/// repository-level concern, recovered by skipping the record.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── CONTRACT ──────────────────────────────────────────────────────────────────
//

/// Durable string-keyed mapping, the foundation for everything persisted.
///
/// No expiry, no size accounting beyond the host's limits, no optimistic
/// locking: `set` is an unconditional overwrite and independent writers race
/// with last-write-wins semantics. `keys_with_prefix` is a full scan and the
/// only discovery mechanism for per-user records.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend cannot be reached.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, overwriting unconditionally.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend cannot be reached.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend cannot be reached.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All keys starting with `prefix`, in lexicographic order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the backend cannot be reached.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Map-backed store for tests, prototyping, and the degraded mode entered
/// when the durable backend is unavailable. Contents die with the process.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lock()?
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
