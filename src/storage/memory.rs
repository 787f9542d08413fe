//! In-process key-value store.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::KeyValueStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// Store that keeps slots in memory for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<FxHashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Returns `true` if no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.slots.write().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.slots.write().remove(key);
    }
}

// ============================================================================
// Tests
// ============================================================================
