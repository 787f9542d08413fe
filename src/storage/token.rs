//! Token supplier for the realtime handshake.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use super::{KeyValueStore, keys};

// ============================================================================
// TokenSupplier
// ============================================================================

/// Provides the bearer token used when opening a connection.
///
/// Looked up synchronously before every connection attempt. `None` means
/// connect without a token.
pub trait TokenSupplier: Send + Sync {
    /// Returns the current session token.
    fn token(&self) -> Option<String>;
}

impl<T: TokenSupplier + ?Sized> TokenSupplier for Arc<T> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}

/// Supplier that never has a token.
impl TokenSupplier for () {
    fn token(&self) -> Option<String> {
        None
    }
}

// ============================================================================
// StoredToken
// ============================================================================

/// Reads the token from the [`keys::AUTH_TOKEN`] slot of a store.
#[derive(Debug, Clone)]
pub struct StoredToken<S> {
    store: S,
}

impl<S: KeyValueStore> StoredToken<S> {
    /// Wraps `store`.
    #[inline]
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> TokenSupplier for StoredToken<S> {
    fn token(&self) -> Option<String> {
        self.store.get(keys::AUTH_TOKEN).filter(|t| !t.is_empty())
    }
}

// ============================================================================
// Tests
// ============================================================================
