//! Client-side persisted state.
//!
//! Session credentials and cached profile data live in a [`KeyValueStore`],
//! one named slot per value. The store is injected, so the auth and
//! transport layers never touch a global.
//!
//! | Slot | Contents |
//! |------|----------|
//! | [`keys::AUTH_TOKEN`] | bearer token |
//! | [`keys::REFRESH_TOKEN`] | refresh token |
//! | [`keys::USER_DATA`] | cached [`User`](crate::protocol::User) as JSON |
//! | [`keys::SETTINGS`] | cached user settings as JSON |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `memory` | In-process store |
//! | `file` | JSON file-backed store |
//! | `token` | Token supplier for the realtime handshake |

// ============================================================================
// Submodules
// ============================================================================

/// JSON file-backed store.
pub mod file;

/// In-process store.
pub mod memory;

/// Token supplier for the realtime handshake.
pub mod token;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

// ============================================================================
// Re-exports
// ============================================================================

pub use file::FileStore;
pub use memory::MemoryStore;
pub use token::{StoredToken, TokenSupplier};

// ============================================================================
// Slot Names
// ============================================================================

/// Slot names used by the client.
pub mod keys {
    /// Bearer token.
    pub const AUTH_TOKEN: &str = "fraud_detection_token";

    /// Refresh token.
    pub const REFRESH_TOKEN: &str = "fraud_detection_refresh_token";

    /// Cached user profile (JSON).
    pub const USER_DATA: &str = "fraud_detection_user";

    /// Cached user settings (JSON).
    pub const SETTINGS: &str = "fraud_detection_settings";
}

// ============================================================================
// KeyValueStore
// ============================================================================

/// String key-value persistence.
///
/// Writes are fire-and-forget: implementations log their own I/O failures
/// instead of returning them.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value in `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` in `key`, replacing any previous value.
    fn set(&self, key: &str, value: String);

    /// Empties `key`.
    fn remove(&self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) {
        (**self).set(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}
