//! FraudWatch client - realtime updates and REST access for the fraud
//! detection dashboard.
//!
//! The dashboard streams transaction screenings, security alerts, system
//! health and risk scores from its backend over one WebSocket connection,
//! and reads everything else through a JSON REST API.
//!
//! # Architecture
//!
//! - **Realtime channel**: one driver task per [`RealtimeClient`] owns the
//!   socket, a sans-IO [`Session`] state machine and the reconnect timer
//! - **Dispatch**: inbound `{event, data}` envelopes fan out to callbacks in
//!   an [`EventRegistry`], in subscription order, isolated from each other
//! - **Reconnect**: abnormal closes retry with exponential backoff up to a
//!   configured cap, then stop and report [`LifecycleEvent::ReconnectsExhausted`]
//! - **Credentials**: [`AuthSession`] persists tokens in a [`KeyValueStore`]
//!   and supplies the bearer token to each connection attempt
//!
//! # Quick Start
//!
//! ```no_run
//! use fraudwatch_client::{ClientConfig, MemoryStore, RealtimeClient, Result, StoredToken};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let store = Arc::new(MemoryStore::new());
//!     let client = RealtimeClient::new(&config, StoredToken::new(store));
//!
//!     let _alerts = client.on_new_alert(|alert| {
//!         println!("{:?}: {}", alert.severity, alert.title);
//!     });
//!     let _status = client.on_system_status(|status| {
//!         println!("{} tx/s", status.transactions_per_second);
//!     });
//!
//!     client.connect();
//!     tokio::signal::ctrl_c().await?;
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | REST client and HTTP transport |
//! | [`auth`] | Signed-in user session |
//! | [`client`] | [`RealtimeClient`] handle |
//! | [`config`] | [`ClientConfig`], builder and environment loading |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire envelope and typed payloads |
//! | [`registry`] | Event subscriber registry |
//! | [`storage`] | Key-value persistence and token suppliers |
//! | [`transport`] | Connection state machine, backoff and connectors |

// ============================================================================
// Modules
// ============================================================================

/// REST client and HTTP transport.
pub mod api;

/// Signed-in user session.
pub mod auth;

/// Realtime channel handle.
///
/// Use [`RealtimeClient::new`] inside a Tokio runtime.
pub mod client;

/// Client configuration.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Wire envelope and typed payloads.
pub mod protocol;

/// Event subscriber registry.
pub mod registry;

/// Key-value persistence and token suppliers.
pub mod storage;

/// Connection state machine, backoff and connectors.
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

// ============================================================================
// Re-exports
// ============================================================================

// API types
pub use api::{
    ApiClient, ApiResponse, AuthResponse, HttpTransport, LoginRequest, Navigator, Page,
    Pagination, RegisterRequest, ReqwestTransport,
};

// Session types
pub use auth::AuthSession;

// Realtime types
pub use client::RealtimeClient;
pub use registry::{EventRegistry, Subscription};
pub use transport::{
    BackoffPolicy, ConnectionState, Connector, LifecycleEvent, Session, TungsteniteConnector,
};

// Configuration
pub use config::{ClientConfig, ClientConfigBuilder};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, SubscriptionId};

// Payload types
pub use protocol::{
    AlertFilters, AlertSeverity, AlertStatus, DashboardStats, Envelope, RiskAssessment, RiskLevel,
    RiskUpdate, SecurityAlert, SecuritySettings, SystemMonitoring, Transaction, TransactionFilters,
    User, events,
};

// Storage types
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoredToken, TokenSupplier};
