//! Wire envelope for realtime messages.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str, to_string};

use crate::error::{Error, Result};

// ============================================================================
// Event Names
// ============================================================================

/// Event names emitted by the realtime service.
pub mod events {
    /// A transaction was created or changed status.
    pub const TRANSACTION_UPDATE: &str = "transaction-update";

    /// A new security alert was raised.
    pub const NEW_ALERT: &str = "new-alert";

    /// Periodic system monitoring snapshot.
    pub const SYSTEM_STATUS: &str = "system-status";

    /// The overall risk level changed.
    pub const RISK_UPDATE: &str = "risk-update";

    /// All known event names.
    pub const ALL: [&str; 4] = [TRANSACTION_UPDATE, NEW_ALERT, SYSTEM_STATUS, RISK_UPDATE];
}

// ============================================================================
// Envelope
// ============================================================================

/// One realtime message.
///
/// # Format
///
/// ```json
/// { "event": "system-status", "data": { ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name.
    pub event: String,

    /// Event payload; absent `data` decodes as `null`.
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Creates an envelope.
    #[inline]
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Decodes an inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the frame is not a JSON object with a
    /// string `event` field.
    pub fn decode(text: &str) -> Result<Self> {
        Ok(from_str(text)?)
    }

    /// Encodes the envelope as a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn encode(&self) -> Result<String> {
        to_string(self).map_err(Error::from)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_decode_alert_frame() {
        let envelope =
            Envelope::decode(r#"{"event":"new-alert","data":{"id":"1","severity":"high"}}"#)
                .expect("valid frame");
        assert_eq!(envelope.event, events::NEW_ALERT);
        assert_eq!(envelope.data, json!({"id": "1", "severity": "high"}));
    }

    #[test]
    fn test_missing_data_is_null() {
        let envelope = Envelope::decode(r#"{"event":"system-status"}"#).expect("valid frame");
        assert!(envelope.data.is_null());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Envelope::decode("not json").is_err());
        assert!(Envelope::decode(r#"{"data":1}"#).is_err());
        assert!(Envelope::decode(r#"{"event":7,"data":1}"#).is_err());
    }

    #[test]
    fn test_encode_shape() {
        let text = Envelope::new("ack", json!({"id": 3}))
            .encode()
            .expect("serializable");
        let value: Value = from_str(&text).expect("valid json");
        assert_eq!(value, json!({"event": "ack", "data": {"id": 3}}));
    }

    #[test]
    fn test_event_names() {
        assert_eq!(events::ALL.len(), 4);
        assert!(events::ALL.contains(&"risk-update"));
    }
}
