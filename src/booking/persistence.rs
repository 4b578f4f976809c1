//! Snapshot persistence for the booking form.
//!
//! Snapshots hold field values only. Validation errors and the price
//! breakdown are rebuilt by the coordinator after a restore.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

use super::observers::Subscription;
use super::state::BookingFormState;
use crate::error::PersistenceError;

/// String key-value storage, e.g. browser local storage or a session table
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn delete(&self, key: &str) -> Result<(), PersistenceError>;
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

pub fn load_snapshot(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<BookingFormState>, PersistenceError> {
    store
        .get(key)?
        .map(|raw| serde_json::from_str(&raw).map_err(PersistenceError::from))
        .transpose()
}

pub fn save_snapshot(
    store: &dyn KeyValueStore,
    key: &str,
    state: &BookingFormState,
) -> Result<(), PersistenceError> {
    let raw = serde_json::to_string(state)?;
    store.set(key, &raw)
}

/// Handle for an enabled auto-persist.
///
/// Dropping the handle stops writing but keeps the stored snapshot;
/// [`AutoPersist::disable`] also deletes it.
#[must_use = "dropping AutoPersist stops persisting the form"]
pub struct AutoPersist {
    store: Arc<dyn KeyValueStore>,
    key: String,
    subscription: Subscription,
}

impl AutoPersist {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>, key: String, subscription: Subscription) -> Self {
        Self {
            store,
            key,
            subscription,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn disable(self) {
        self.subscription.unsubscribe();
        match self.store.delete(&self.key) {
            Ok(()) => info!(key = %self.key, "Booking form auto-persist disabled"),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to delete booking form snapshot"),
        }
    }
}

impl std::fmt::Debug for AutoPersist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoPersist").field("key", &self.key).finish()
    }
}

/// Listener body that writes each snapshot to the store
pub(crate) fn snapshot_writer(
    store: Arc<dyn KeyValueStore>,
    key: String,
) -> impl Fn(&BookingFormState) -> anyhow::Result<()> + Send + Sync + 'static {
    move |state| {
        if let Err(e) = save_snapshot(store.as_ref(), &key, state) {
            warn!(key = %key, error = %e, "Failed to persist booking form snapshot");
        }
        Ok(())
    }
}
