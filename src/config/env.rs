//! Loading configuration from environment variables.
//!
//! | Variable | Setting | Default |
//! |----------|---------|---------|
//! | `FRAUDWATCH_WS_URL` | realtime endpoint | `ws://localhost:8000/ws` |
//! | `FRAUDWATCH_API_URL` | REST base URL | `http://localhost:8000/api` |
//! | `FRAUDWATCH_WS_RECONNECT_INTERVAL_MS` | backoff base | `5000` |
//! | `FRAUDWATCH_WS_MAX_RECONNECT_ATTEMPTS` | attempt cap | `10` |
//! | `FRAUDWATCH_API_TIMEOUT_MS` | request timeout | `30000` |

// ============================================================================
// Imports
// ============================================================================

use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result, millis};

use super::{ClientConfig, ClientConfigBuilder};

// ============================================================================
// Constants
// ============================================================================

/// Realtime endpoint variable.
pub const ENV_WS_URL: &str = "FRAUDWATCH_WS_URL";

/// REST base URL variable.
pub const ENV_API_URL: &str = "FRAUDWATCH_API_URL";

/// Backoff base interval variable (milliseconds).
pub const ENV_RECONNECT_INTERVAL_MS: &str = "FRAUDWATCH_WS_RECONNECT_INTERVAL_MS";

/// Reconnect attempt cap variable.
pub const ENV_MAX_RECONNECT_ATTEMPTS: &str = "FRAUDWATCH_WS_MAX_RECONNECT_ATTEMPTS";

/// API request timeout variable (milliseconds).
pub const ENV_API_TIMEOUT_MS: &str = "FRAUDWATCH_API_TIMEOUT_MS";

// ============================================================================
// ClientConfig - Environment
// ============================================================================

impl ClientConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is present but unparseable,
    /// or any error from [`ClientConfigBuilder::build`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Absent keys fall back to defaults. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut builder = ClientConfigBuilder::new();

        if let Some(url) = get(ENV_WS_URL) {
            builder = builder.ws_url(url);
        }
        if let Some(url) = get(ENV_API_URL) {
            builder = builder.api_url(url);
        }
        if let Some(ms) = parse_value::<u64>(ENV_RECONNECT_INTERVAL_MS, get(ENV_RECONNECT_INTERVAL_MS))? {
            builder = builder.reconnect_interval(Duration::from_millis(ms));
        }
        if let Some(attempts) =
            parse_value::<u32>(ENV_MAX_RECONNECT_ATTEMPTS, get(ENV_MAX_RECONNECT_ATTEMPTS))?
        {
            builder = builder.max_reconnect_attempts(attempts);
        }
        if let Some(ms) = parse_value::<u64>(ENV_API_TIMEOUT_MS, get(ENV_API_TIMEOUT_MS))? {
            builder = builder.request_timeout(Duration::from_millis(ms));
        }

        let config = builder.build()?;
        debug!(
            ws_url = %config.ws_url,
            api_url = %config.api_url,
            reconnect_interval_ms = millis(config.reconnect_interval),
            max_reconnect_attempts = config.max_reconnect_attempts,
            "Loaded client configuration"
        );
        Ok(config)
    }
}

fn parse_value<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>> {
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| Error::config(format!("{key} has an invalid value: {value:?}")))
    })
    .transpose()
}

// ============================================================================
// Tests
// ============================================================================
