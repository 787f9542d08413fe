//! Event dispatch registry.
//!
//! Maps event names to subscriber callbacks and delivers decoded payloads to
//! them. Delivery iterates over a snapshot of the subscriber list, so a
//! callback may subscribe or unsubscribe (itself or others) while it runs.
//!
//! # Example
//!
//! ```
//! use fraudwatch_client::EventRegistry;
//! use serde_json::json;
//!
//! let registry = EventRegistry::new();
//! let subscription = registry.subscribe("new-alert", |data| {
//!     println!("alert: {data}");
//! });
//!
//! assert_eq!(registry.dispatch("new-alert", &json!({"id": "1"})), 1);
//! subscription.unsubscribe();
//! assert_eq!(registry.dispatch("new-alert", &json!({"id": "2"})), 0);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, trace, warn};

use crate::identifiers::SubscriptionId;

// ============================================================================
// Types
// ============================================================================

/// Subscriber callback.
///
/// Runs synchronously on the channel's driver task. Keep it short; hand
/// heavy work to another task.
pub type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Subscribers by event name, in registration order.
type SubscriberMap = FxHashMap<String, Vec<(SubscriptionId, Callback)>>;

// ============================================================================
// EventRegistry
// ============================================================================

/// Registry of event subscribers.
///
/// Cloning is cheap and yields a handle to the same registry.
#[derive(Clone, Default)]
pub struct EventRegistry {
    subscribers: Arc<RwLock<SubscriberMap>>,
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.read();
        f.debug_struct("EventRegistry")
            .field("events", &subscribers.len())
            .field(
                "subscriptions",
                &subscribers.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

impl EventRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `event`.
    ///
    /// Every call creates an independent subscription, even for the same
    /// event; dropping the returned handle does not unsubscribe.
    pub fn subscribe<F>(&self, event: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let event = event.into();
        let id = SubscriptionId::next();

        self.subscribers
            .write()
            .entry(event.clone())
            .or_default()
            .push((id, Arc::new(callback)));

        trace!(%id, event = %event, "Subscribed");

        Subscription {
            id,
            event,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Registers a callback that receives `data` decoded as `T`.
    ///
    /// Payloads that do not decode are logged and skipped for this
    /// subscriber only.
    pub fn subscribe_as<T, F>(&self, event: impl Into<String>, callback: F) -> Subscription
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let event = event.into();
        let event_name = event.clone();

        self.subscribe(event, move |data| match T::deserialize(data) {
            Ok(payload) => callback(payload),
            Err(e) => warn!(event = %event_name, error = %e, "Dropping payload with unexpected shape"),
        })
    }

    /// Delivers `payload` to every subscriber of `event`.
    ///
    /// Callbacks run in registration order on the calling thread. A
    /// panicking callback is logged and does not stop delivery to the rest.
    ///
    /// Returns the number of callbacks that completed normally.
    pub fn dispatch(&self, event: &str, payload: &Value) -> usize {
        let snapshot: Vec<(SubscriptionId, Callback)> = match self.subscribers.read().get(event) {
            Some(list) => list.clone(),
            None => {
                trace!(event, "No subscribers");
                return 0;
            }
        };

        let mut delivered = 0;
        for (id, callback) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback(payload))) {
                Ok(()) => delivered += 1,
                Err(panic) => {
                    error!(
                        %id,
                        event,
                        panic = panic_message(panic.as_ref()),
                        "Subscriber callback panicked"
                    );
                }
            }
        }

        delivered
    }

    /// Removes every subscription.
    pub fn clear(&self) {
        let mut subscribers = self.subscribers.write();
        let count: usize = subscribers.values().map(Vec::len).sum();
        subscribers.clear();
        trace!(count, "Cleared subscriptions");
    }

    /// Returns the number of subscribers for `event`.
    #[must_use]
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.subscribers.read().get(event).map_or(0, Vec::len)
    }

    /// Returns the total number of subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.read().values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle to one registered callback.
///
/// Holds only a weak reference to the registry; unsubscribing after the
/// registry is gone is a no-op.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    event: String,
    registry: Weak<RwLock<SubscriberMap>>,
}

impl Subscription {
    /// Returns the subscription ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the subscribed event name.
    #[inline]
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Removes exactly this callback. Other subscriptions are unaffected.
    pub fn unsubscribe(self) {
        let Some(subscribers) = self.registry.upgrade() else {
            return;
        };

        let mut subscribers = subscribers.write();
        if let Some(list) = subscribers.get_mut(&self.event) {
            list.retain(|(id, _)| *id != self.id);
            if list.is_empty() {
                subscribers.remove(&self.event);
            }
        }

        trace!(id = %self.id, event = %self.event, "Unsubscribed");
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use serde::Deserialize;
    use serde_json::json;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&Value) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move |_: &Value| {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_subscribe_then_dispatch_delivers_once() {
        let registry = EventRegistry::new();
        let (count, callback) = counter();
        let _sub = registry.subscribe("new-alert", callback);

        assert_eq!(registry.dispatch("new-alert", &json!({})), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_before_dispatch_delivers_nothing() {
        let registry = EventRegistry::new();
        let (count, callback) = counter();
        registry.subscribe("new-alert", callback).unsubscribe();

        assert_eq!(registry.dispatch("new-alert", &json!({})), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unsubscribe_leaves_siblings() {
        let registry = EventRegistry::new();
        let (first_count, first) = counter();
        let (second_count, second) = counter();
        let first_sub = registry.subscribe("risk-update", first);
        let _second_sub = registry.subscribe("risk-update", second);

        first_sub.unsubscribe();
        registry.dispatch("risk-update", &json!(1));

        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.subscriber_count("risk-update"), 1);
    }

    #[test]
    fn test_two_subscribers_receive_every_payload_in_order() {
        let registry = EventRegistry::new();
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_b = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen_a);
        let _a = registry.subscribe("transaction-update", move |v| sink.lock().push(v.clone()));
        let sink = Arc::clone(&seen_b);
        let _b = registry.subscribe("transaction-update", move |v| sink.lock().push(v.clone()));

        for n in 0..3 {
            registry.dispatch("transaction-update", &json!(n));
        }

        let expected = vec![json!(0), json!(1), json!(2)];
        assert_eq!(*seen_a.lock(), expected);
        assert_eq!(*seen_b.lock(), expected);
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_sibling() {
        let registry = EventRegistry::new();
        let (count, callback) = counter();
        let _bad = registry.subscribe("new-alert", |_| panic!("subscriber blew up"));
        let _good = registry.subscribe("new-alert", callback);

        assert_eq!(registry.dispatch("new-alert", &json!({})), 1);
        assert_eq!(registry.dispatch("new-alert", &json!({})), 1);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_events_are_isolated() {
        let registry = EventRegistry::new();
        let (count, callback) = counter();
        let _sub = registry.subscribe("system-status", callback);

        assert_eq!(registry.dispatch("new-alert", &json!({})), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_callback_can_unsubscribe_itself_during_dispatch() {
        let registry = EventRegistry::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let (count, callback) = counter();

        let own = Arc::clone(&slot);
        let sub = registry.subscribe("new-alert", move |v| {
            callback(v);
            if let Some(sub) = own.lock().take() {
                sub.unsubscribe();
            }
        });
        *slot.lock() = Some(sub);

        registry.dispatch("new-alert", &json!({}));
        registry.dispatch("new-alert", &json!({}));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.subscriber_count("new-alert"), 0);
    }

    #[test]
    fn test_subscribe_during_dispatch_applies_to_next_message() {
        let registry = EventRegistry::new();
        let (late_count, late) = counter();
        let late = Arc::new(late);

        let inner = registry.clone();
        let _sub = registry.subscribe("new-alert", move |_| {
            let late = Arc::clone(&late);
            let _ = inner.subscribe("new-alert", move |v| late(v));
        });

        registry.dispatch("new-alert", &json!({}));
        assert_eq!(late_count.load(Ordering::SeqCst), 0);

        registry.dispatch("new-alert", &json!({}));
        assert_eq!(late_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let registry = EventRegistry::new();
        let _a = registry.subscribe("a", |_| {});
        let _b = registry.subscribe("b", |_| {});
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.dispatch("a", &json!({})), 0);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped_is_noop() {
        let registry = EventRegistry::new();
        let sub = registry.subscribe("a", |_| {});
        drop(registry);
        sub.unsubscribe();
    }

    #[test]
    fn test_subscribe_as_decodes_payload() {
        #[derive(Deserialize)]
        struct Alert {
            id: String,
            severity: String,
        }

        let registry = EventRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = registry.subscribe_as("new-alert", move |alert: Alert| {
            sink.lock().push(format!("{}:{}", alert.id, alert.severity));
        });

        registry.dispatch("new-alert", &json!({"id": "1", "severity": "high"}));
        registry.dispatch("new-alert", &json!({"unexpected": true}));

        assert_eq!(*seen.lock(), vec!["1:high".to_string()]);
    }
}
