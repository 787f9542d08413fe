//! Opening WebSocket connections.
//!
//! The driver only needs a [`Socket`]: a stream of inbound frames plus a
//! sink for outbound ones. [`Connector`] hides how that socket is made, so
//! tests can substitute their own.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Sink, Stream};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for the opening handshake.
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Socket
// ============================================================================

/// A bidirectional WebSocket frame stream.
pub trait Socket:
    Stream<Item = StdResult<Message, WsError>> + Sink<Message, Error = WsError> + Send + Unpin
{
}

impl<T> Socket for T where
    T: Stream<Item = StdResult<Message, WsError>> + Sink<Message, Error = WsError> + Send + Unpin
{
}

/// Type-erased socket owned by the driver.
pub type BoxSocket = Box<dyn Socket>;

// ============================================================================
// Connector
// ============================================================================

/// Opens sockets for the driver.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Performs the opening handshake against `url`.
    ///
    /// # Errors
    ///
    /// Any error is treated as an abnormal close by the caller.
    async fn connect(&self, url: &Url) -> Result<BoxSocket>;
}

// ============================================================================
// TungsteniteConnector
// ============================================================================

/// Connector backed by `tokio-tungstenite`.
///
/// `wss://` URLs are dialed over rustls with the webpki root store.
#[derive(Debug, Clone, Copy)]
pub struct TungsteniteConnector {
    handshake_timeout: Duration,
}

impl TungsteniteConnector {
    /// Creates a connector with the default handshake timeout (30s).
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Overrides the handshake timeout.
    #[inline]
    #[must_use]
    pub const fn with_handshake_timeout(mut self, handshake_timeout: Duration) -> Self {
        self.handshake_timeout = handshake_timeout;
        self
    }
}

impl Default for TungsteniteConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &Url) -> Result<BoxSocket> {
        let (stream, response) = timeout(self.handshake_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| {
                Error::connection(format!(
                    "Handshake timed out after {}ms",
                    self.handshake_timeout.as_millis()
                ))
            })?
            .map_err(|e| Error::connection(format!("WebSocket handshake failed: {e}")))?;

        debug!(status = %response.status(), "WebSocket handshake completed");

        Ok(Box::new(stream))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Appends the session token to the target URL as `?token=`.
#[must_use]
pub fn target_url(base: &Url, token: Option<&str>) -> Url {
    let mut url = base.clone();
    if let Some(token) = token {
        url.query_pairs_mut().append_pair("token", token);
    }
    url
}

// ============================================================================
// Tests
// ============================================================================
