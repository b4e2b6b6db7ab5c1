//! In-memory property value store.
//!
//! Holds the latest known value of every named device/user property. Each
//! operation takes the lock for a single key and releases it before
//! returning, so tree evaluation never holds it across a traversal. Readers
//! always see a fully written value for a key; values of different keys may
//! come from different moments.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

use crate::value::TriggerValue;

/// Thread-safe map from property name to its current value.
#[derive(Debug, Default)]
pub struct TriggerValueStore {
    values: RwLock<HashMap<String, TriggerValue>>,
}

impl TriggerValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A writer that panicked held the lock for one insert or remove, which
    // either happened or did not. The map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, TriggerValue>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, TriggerValue>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the value of `key`. Returns the previous value.
    pub fn set(&self, key: impl Into<String>, value: TriggerValue) -> Option<TriggerValue> {
        let key = key.into();
        trace!(key = %key, value = %value, "trigger value set");
        self.write().insert(key, value)
    }

    /// Remove `key`. Returns the value it held, if any.
    pub fn remove(&self, key: &str) -> Option<TriggerValue> {
        trace!(key, "trigger value removed");
        self.write().remove(key)
    }

    /// Current value of `key`, or `None` when absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<TriggerValue> {
        self.read().get(key).cloned()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Sorted list of stored property names.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Point-in-time copy of the whole map.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, TriggerValue> {
        self.read().clone()
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}
