//! Realtime wire protocol.
//!
//! Every frame on the realtime channel is a JSON text message with two
//! fields:
//!
//! ```json
//! { "event": "new-alert", "data": { "id": "1", "severity": "high" } }
//! ```
//!
//! The transport and registry layers treat `data` as opaque JSON. Only
//! typed subscriptions interpret it.
//!
//! | Event | Payload |
//! |-------|---------|
//! | `transaction-update` | [`Transaction`] |
//! | `new-alert` | [`SecurityAlert`] |
//! | `system-status` | [`SystemMonitoring`] |
//! | `risk-update` | [`RiskUpdate`] |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `envelope` | Wire envelope and event names |
//! | `payload` | Typed payloads shared with the REST API |

// ============================================================================
// Submodules
// ============================================================================

/// Wire envelope and event names.
pub mod envelope;

/// Typed payloads.
pub mod payload;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::{Envelope, events};
pub use payload::{
    AlertFilters, AlertSeverity, AlertStatus, DashboardStats, FeatureStatus, LocationActivity,
    Platform, Report, RiskAssessment, RiskLevel, RiskUpdate, SecurityAlert, SecurityFeatures,
    SecuritySettings, SystemMonitoring, Transaction, TransactionFilters, TransactionKind,
    TransactionStatus, User,
};
