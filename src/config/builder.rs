//! Builder pattern for client configuration.
//!
//! # Example
//!
//! ```no_run
//! use fraudwatch_client::ClientConfig;
//!
//! # fn example() -> fraudwatch_client::Result<()> {
//! let config = ClientConfig::builder()
//!     .ws_url("ws://127.0.0.1:9000/ws")
//!     .api_url("http://127.0.0.1:9000/api")
//!     .max_reconnect_attempts(3)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

use super::{
    ClientConfig, DEFAULT_API_URL, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_INTERVAL,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_WS_URL,
};

// ============================================================================
// ClientConfigBuilder
// ============================================================================

/// Builder for [`ClientConfig`].
///
/// Use [`ClientConfig::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    ws_url: String,
    api_url: String,
    reconnect_interval: Duration,
    max_reconnect_attempts: u32,
    request_timeout: Duration,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

// ============================================================================
// ClientConfigBuilder Implementation
// ============================================================================

impl ClientConfigBuilder {
    /// Creates a builder seeded with the defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the realtime endpoint (`ws://` or `wss://`).
    #[inline]
    #[must_use]
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = url.into();
        self
    }

    /// Sets the REST base URL (`http://` or `https://`).
    #[inline]
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sets the backoff base interval.
    #[inline]
    #[must_use]
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the cap on consecutive reconnect attempts.
    ///
    /// Zero disables automatic reconnection entirely.
    #[inline]
    #[must_use]
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Sets the per-request API timeout.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the configuration with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if either URL does not parse
    /// - [`Error::Config`] if a URL has the wrong scheme
    /// - [`Error::Config`] if an interval or timeout is zero
    pub fn build(self) -> Result<ClientConfig> {
        let ws_url = self.validate_ws_url()?;
        let api_url = self.validate_api_url()?;
        self.validate_durations()?;

        Ok(ClientConfig {
            ws_url,
            api_url,
            reconnect_interval: self.reconnect_interval,
            max_reconnect_attempts: self.max_reconnect_attempts,
            request_timeout: self.request_timeout,
        })
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientConfigBuilder {
    fn validate_ws_url(&self) -> Result<Url> {
        let url = Url::parse(&self.ws_url)?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::config(format!(
                "Realtime URL must use ws:// or wss://, got {other}://"
            ))),
        }
    }

    fn validate_api_url(&self) -> Result<Url> {
        let url = Url::parse(&self.api_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::config(format!(
                "API URL must use http:// or https://, got {other}://"
            ))),
        }
    }

    fn validate_durations(&self) -> Result<()> {
        if self.reconnect_interval.is_zero() {
            return Err(Error::config("Reconnect interval must be greater than zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::config("Request timeout must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
