//! Connection lifecycle notifications.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::identifiers::ConnectionId;

// ============================================================================
// LifecycleEvent
// ============================================================================

/// Notification about the channel's connection.
///
/// Broadcast to every receiver obtained from
/// [`RealtimeClient::lifecycle`](crate::RealtimeClient::lifecycle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A handshake started.
    Connecting {
        /// Attempt ID.
        connection_id: ConnectionId,
    },
    /// The handshake completed.
    Connected {
        /// Attempt ID.
        connection_id: ConnectionId,
    },
    /// An open connection ended.
    Closed {
        /// Attempt ID.
        connection_id: ConnectionId,
        /// Close code, if the peer sent one.
        code: Option<u16>,
    },
    /// A reconnect timer was armed.
    ReconnectScheduled {
        /// One-based attempt number.
        attempt: u32,
        /// Delay before dialing.
        delay: Duration,
    },
    /// The attempt cap was reached; no further retries until `connect()`.
    ReconnectsExhausted {
        /// Attempts made.
        attempts: u32,
    },
    /// `disconnect()` completed.
    Disconnected,
}

impl LifecycleEvent {
    /// Returns `true` for the terminal failure notification.
    #[inline]
    #[must_use]
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::ReconnectsExhausted { .. })
    }
}
