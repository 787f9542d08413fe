//! Realtime update channel.
//!
//! [`RealtimeClient`] is the public handle to one streaming connection. It
//! is cheap to clone; every clone drives the same connection and shares one
//! subscriber registry. Consumers that need the same stream should share a
//! handle instead of opening independent connections.
//!
//! # Example
//!
//! ```no_run
//! use fraudwatch_client::{ClientConfig, MemoryStore, RealtimeClient, StoredToken};
//! use std::sync::Arc;
//!
//! # async fn example() -> fraudwatch_client::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let store = Arc::new(MemoryStore::new());
//! let client = RealtimeClient::new(&config, StoredToken::new(store));
//!
//! let alerts = client.on_new_alert(|alert| {
//!     println!("[{:?}] {}", alert.severity, alert.title);
//! });
//!
//! client.connect();
//! // ...
//! alerts.unsubscribe();
//! client.disconnect().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::protocol::{
    Envelope, RiskUpdate, SecurityAlert, SystemMonitoring, Transaction, events,
};
use crate::registry::{EventRegistry, Subscription};
use crate::storage::TokenSupplier;
use crate::transport::driver::{Command, Driver};
use crate::transport::{
    BackoffPolicy, ConnectionState, Connector, LifecycleEvent, Session, TungsteniteConnector,
};

// ============================================================================
// Constants
// ============================================================================

/// Lifecycle events buffered per receiver before the oldest are dropped.
const LIFECYCLE_CAPACITY: usize = 64;

// ============================================================================
// RealtimeClient
// ============================================================================

/// Handle to a realtime update channel.
///
/// Construction spawns the channel's driver task, so it must happen inside
/// a Tokio runtime. The connection is not opened until [`connect`](Self::connect).
/// The driver stops, and all subscriptions are cleared, once every clone
/// of the handle is dropped.
#[derive(Clone)]
pub struct RealtimeClient {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    lifecycle: broadcast::Sender<LifecycleEvent>,
    registry: EventRegistry,
}

impl fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("state", &self.state())
            .field("registry", &self.registry)
            .finish()
    }
}

// ============================================================================
// RealtimeClient - Constructors
// ============================================================================

impl RealtimeClient {
    /// Creates a channel using the tungstenite connector.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new<T>(config: &ClientConfig, tokens: T) -> Self
    where
        T: TokenSupplier + 'static,
    {
        Self::with_connector(config, tokens, TungsteniteConnector::new())
    }

    /// Creates a channel with a custom connector.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn with_connector<T, C>(config: &ClientConfig, tokens: T, connector: C) -> Self
    where
        T: TokenSupplier + 'static,
        C: Connector + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let (lifecycle_tx, _) = broadcast::channel(LIFECYCLE_CAPACITY);
        let registry = EventRegistry::new();

        let connector: Arc<dyn Connector> = Arc::new(connector);
        let tokens: Arc<dyn TokenSupplier> = Arc::new(tokens);
        let policy = BackoffPolicy::new(config.reconnect_interval, config.max_reconnect_attempts);

        let driver = Driver::new(
            Session::new(policy),
            config.ws_url.clone(),
            connector,
            tokens,
            registry.clone(),
            command_rx,
            state_tx,
            lifecycle_tx.clone(),
        );
        tokio::spawn(driver.run());

        Self {
            commands: command_tx,
            state: state_rx,
            lifecycle: lifecycle_tx,
            registry,
        }
    }
}

// ============================================================================
// RealtimeClient - Connection
// ============================================================================

impl RealtimeClient {
    /// Starts connecting.
    ///
    /// Returns immediately; observe the outcome through
    /// [`state_changes`](Self::state_changes) or [`lifecycle`](Self::lifecycle).
    /// No-op while a handshake is in flight or the connection is open.
    pub fn connect(&self) {
        if self.commands.send(Command::Connect).is_err() {
            warn!("Realtime driver stopped; connect ignored");
        }
    }

    /// Closes the connection and cancels any pending reconnect.
    ///
    /// When this returns the state is [`ConnectionState::Idle`] and nothing
    /// will reconnect until [`connect`](Self::connect) is called again.
    pub async fn disconnect(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Disconnect { ack }).is_err() {
            return;
        }
        let _ = done.await;
    }

    /// Returns `true` iff the connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.state.borrow() == ConnectionState::Open
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Returns a receiver that observes every state change.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Returns a receiver for lifecycle notifications, including the
    /// terminal [`LifecycleEvent::ReconnectsExhausted`].
    #[must_use]
    pub fn lifecycle(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.lifecycle.subscribe()
    }

    /// Sends `{event, data}` if the connection is open.
    ///
    /// Fire-and-forget: while not connected the message is dropped with a
    /// warning; nothing is queued.
    pub fn send<D: Serialize>(&self, event: &str, data: D) {
        if !self.is_connected() {
            warn!(event, "Realtime channel not connected; message dropped");
            return;
        }

        let encoded = serde_json::to_value(data)
            .map_err(Error::from)
            .and_then(|data| Envelope::new(event, data).encode());

        let text = match encoded {
            Ok(text) => text,
            Err(e) => {
                warn!(event, error = %e, "Failed to encode message");
                return;
            }
        };

        if self.commands.send(Command::Send(text)).is_err() {
            warn!(event, "Realtime driver stopped; message dropped");
        }
    }
}

// ============================================================================
// RealtimeClient - Subscriptions
// ============================================================================

impl RealtimeClient {
    /// Returns the channel's subscriber registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Subscribes to raw payloads of `event`.
    pub fn subscribe<F>(&self, event: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.registry.subscribe(event, callback)
    }

    /// Subscribes to payloads of `event` decoded as `T`.
    pub fn subscribe_as<T, F>(&self, event: impl Into<String>, callback: F) -> Subscription
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.registry.subscribe_as(event, callback)
    }

    /// Subscribes to `transaction-update`.
    pub fn on_transaction_update<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Transaction) + Send + Sync + 'static,
    {
        self.subscribe_as(events::TRANSACTION_UPDATE, callback)
    }

    /// Subscribes to `new-alert`.
    pub fn on_new_alert<F>(&self, callback: F) -> Subscription
    where
        F: Fn(SecurityAlert) + Send + Sync + 'static,
    {
        self.subscribe_as(events::NEW_ALERT, callback)
    }

    /// Subscribes to `system-status`.
    pub fn on_system_status<F>(&self, callback: F) -> Subscription
    where
        F: Fn(SystemMonitoring) + Send + Sync + 'static,
    {
        self.subscribe_as(events::SYSTEM_STATUS, callback)
    }

    /// Subscribes to `risk-update`.
    pub fn on_risk_update<F>(&self, callback: F) -> Subscription
    where
        F: Fn(RiskUpdate) + Send + Sync + 'static,
    {
        self.subscribe_as(events::RISK_UPDATE, callback)
    }
}

// ============================================================================
// Tests
// ============================================================================
