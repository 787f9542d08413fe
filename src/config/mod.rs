//! Client configuration.
//!
//! Every setting has a default, so a bare [`ClientConfig::default()`] points
//! at a local development backend.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ClientConfig`] | Resolved, validated settings |
//! | [`ClientConfigBuilder`] | Fluent builder with validation |
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use fraudwatch_client::ClientConfig;
//!
//! # fn example() -> fraudwatch_client::Result<()> {
//! let config = ClientConfig::builder()
//!     .ws_url("wss://api.example.com/ws")
//!     .reconnect_interval(Duration::from_secs(2))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for [`ClientConfig`].
pub mod builder;

/// Environment-variable loading.
pub mod env;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientConfigBuilder;

// ============================================================================
// Constants
// ============================================================================

/// Default realtime endpoint.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Default REST base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default base interval for reconnect backoff.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(5000);

/// Default cap on consecutive reconnect attempts.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Default timeout for API requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

// ============================================================================
// ClientConfig
// ============================================================================

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Realtime channel target, without the token parameter.
    pub ws_url: Url,

    /// Base URL that API endpoint paths are appended to.
    pub api_url: Url,

    /// Backoff base; attempt `n` waits `reconnect_interval * 2^n`.
    pub reconnect_interval: Duration,

    /// Reconnect attempts allowed before the channel gives up.
    pub max_reconnect_attempts: u32,

    /// Timeout applied to each API request.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Creates a builder seeded with the defaults.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: Url::parse(DEFAULT_WS_URL).expect("default ws url is valid"),
            api_url: Url::parse(DEFAULT_API_URL).expect("default api url is valid"),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
