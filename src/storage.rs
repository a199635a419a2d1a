//! In-memory storage module.
//!
//! A thread-safe string map shared by every connection task.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Thread-safe in-memory key-value storage
#[derive(Debug, Default)]
pub struct Storage {
    data: RwLock<HashMap<String, String>>,
}

impl Storage {
    /// Create a new, empty storage instance
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store a value, replacing any previous one
    pub fn set(&self, key: &str, value: &str) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.insert(key.to_string(), value.to_string());
        trace!(key, "Stored item");
    }

    /// Get a copy of the value for a key
    pub fn get(&self, key: &str) -> Option<String> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(key).cloned()
    }

    /// Remove a key, returning whether it was present
    pub fn delete(&self, key: &str) -> bool {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let removed = data.remove(key).is_some();
        if removed {
            trace!(key, "Deleted item");
        }
        removed
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no items are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
