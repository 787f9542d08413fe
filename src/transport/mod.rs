//! Realtime transport layer.
//!
//! Owns the single WebSocket connection of a channel and its reconnect
//! policy.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   commands    ┌──────────────────────┐   WebSocket   ┌──────────┐
//! │  RealtimeClient  │──────────────►│ Driver task          │◄─────────────►│  Server  │
//! │  (handle, Clone) │◄──────────────│  Session + timer     │               └──────────┘
//! └──────────────────┘ state, events │  → EventRegistry     │
//!                                    └──────────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `connect()` - dial `ws_url?token=...`
//! 2. Handshake completes - state `Open`, retry count reset
//! 3. Abnormal close or failure - wait `base * 2^n`, dial again
//! 4. Cap reached - terminal `ReconnectsExhausted`, state `Idle`
//! 5. `disconnect()` - cancel timer, close socket, state `Idle`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `backoff` | Exponential delay policy |
//! | `connector` | Socket abstraction and tungstenite connector |
//! | `driver` | Event loop task |
//! | `lifecycle` | Lifecycle notifications |
//! | `session` | I/O-free state machine |

// ============================================================================
// Submodules
// ============================================================================

/// Exponential delay policy.
pub mod backoff;

/// Socket abstraction and tungstenite connector.
pub mod connector;

/// Event loop task.
pub(crate) mod driver;

/// Lifecycle notifications.
pub mod lifecycle;

/// I/O-free state machine.
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use backoff::BackoffPolicy;
pub use connector::{BoxSocket, Connector, Socket, TungsteniteConnector, target_url};
pub use lifecycle::LifecycleEvent;
pub use session::{CloseOutcome, ConnectionState, NORMAL_CLOSURE, Session};
