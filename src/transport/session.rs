//! Connection lifecycle state machine.
//!
//! [`Session`] holds no I/O. The driver feeds it connection notifications
//! and acts on what it returns, which keeps every transition testable
//! without a socket or a clock.
//!
//! # States
//!
//! ```text
//!            connect()              open
//!   Idle ─────────────► Dialing ──────────► Open
//!    ▲                   │   ▲                │
//!    │ normal close /    │   │ timer due      │ abnormal close
//!    │ attempts exhausted│   │                ▼
//!    └───────────────────┴── Backoff ◄────────┘
//! ```
//!
//! `disconnect()` returns to `Idle` from anywhere. `Dialing` and `Backoff`
//! are both reported as [`ConnectionState::Connecting`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use crate::identifiers::ConnectionId;

use super::backoff::BackoffPolicy;

// ============================================================================
// Constants
// ============================================================================

/// Close code of an intentional, normal closure.
pub const NORMAL_CLOSURE: u16 = 1000;

// ============================================================================
// ConnectionState
// ============================================================================

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// Not connected and not trying to.
    #[default]
    Idle,
    /// Handshake in flight or waiting to retry.
    Connecting,
    /// Connected.
    Open,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
        })
    }
}

// ============================================================================
// CloseOutcome
// ============================================================================

/// What the driver must do after a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Notification for a superseded connection; nothing to do.
    Stale,
    /// Normal closure; stay idle.
    Idle,
    /// Arm the reconnect timer.
    Reconnect {
        /// One-based attempt number.
        attempt: u32,
        /// Delay before dialing.
        delay: Duration,
    },
    /// Attempt cap reached; stay idle until an explicit connect.
    Exhausted {
        /// Attempts made.
        attempts: u32,
    },
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Dialing,
    Backoff,
    Open,
}

/// Lifecycle state of one transport session.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    retry_count: u32,
    current: ConnectionId,
    policy: BackoffPolicy,
}

impl Session {
    /// Creates an idle session.
    #[must_use]
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            phase: Phase::Idle,
            retry_count: 0,
            current: ConnectionId::default(),
            policy,
        }
    }

    /// Returns the observable state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        match self.phase {
            Phase::Idle => ConnectionState::Idle,
            Phase::Dialing | Phase::Backoff => ConnectionState::Connecting,
            Phase::Open => ConnectionState::Open,
        }
    }

    /// Returns the number of reconnects scheduled since the last open.
    #[inline]
    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns `true` while waiting on the reconnect timer.
    #[inline]
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.phase == Phase::Backoff
    }

    /// Returns the ID of the latest connection attempt.
    #[inline]
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.current
    }

    /// Handles an explicit connect request.
    ///
    /// Returns the ID to dial, or `None` if a handshake is in flight or the
    /// connection is open. From `Backoff` it dials immediately, replacing
    /// the pending timer. From `Idle` the retry budget starts afresh.
    pub fn connect(&mut self) -> Option<ConnectionId> {
        match self.phase {
            Phase::Dialing | Phase::Open => None,
            Phase::Backoff => Some(self.dial()),
            Phase::Idle => {
                self.retry_count = 0;
                Some(self.dial())
            }
        }
    }

    /// Handles expiry of the reconnect timer.
    ///
    /// Returns the ID to dial, or `None` if no reconnect is pending.
    pub fn reconnect_due(&mut self) -> Option<ConnectionId> {
        (self.phase == Phase::Backoff).then(|| self.dial())
    }

    /// Handles a completed handshake.
    ///
    /// Returns `false` if `id` is stale; the caller should drop that socket.
    pub fn on_open(&mut self, id: ConnectionId) -> bool {
        if id != self.current || self.phase != Phase::Dialing {
            return false;
        }
        self.phase = Phase::Open;
        self.retry_count = 0;
        true
    }

    /// Handles the end of connection `id`.
    ///
    /// `code` is the close code, if the peer sent one. Anything but
    /// [`NORMAL_CLOSURE`] counts as abnormal and enters backoff.
    pub fn on_close(&mut self, id: ConnectionId, code: Option<u16>) -> CloseOutcome {
        if id != self.current || !matches!(self.phase, Phase::Dialing | Phase::Open) {
            return CloseOutcome::Stale;
        }

        if code == Some(NORMAL_CLOSURE) {
            self.phase = Phase::Idle;
            return CloseOutcome::Idle;
        }

        self.schedule_reconnect()
    }

    /// Handles a transport failure on connection `id`.
    ///
    /// Treated exactly like an abnormal close.
    pub fn on_failure(&mut self, id: ConnectionId) -> CloseOutcome {
        self.on_close(id, None)
    }

    /// Handles an explicit disconnect.
    ///
    /// Supersedes the current connection ID, so late notifications for it
    /// come back as [`CloseOutcome::Stale`].
    pub fn disconnect(&mut self) {
        self.current = self.current.next();
        self.phase = Phase::Idle;
        self.retry_count = 0;
    }

    fn dial(&mut self) -> ConnectionId {
        self.current = self.current.next();
        self.phase = Phase::Dialing;
        self.current
    }

    fn schedule_reconnect(&mut self) -> CloseOutcome {
        match self.policy.delay_for(self.retry_count) {
            Some(delay) => {
                self.retry_count += 1;
                self.phase = Phase::Backoff;
                CloseOutcome::Reconnect {
                    attempt: self.retry_count,
                    delay,
                }
            }
            None => {
                self.phase = Phase::Idle;
                CloseOutcome::Exhausted {
                    attempts: self.retry_count,
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ABNORMAL: Option<u16> = Some(1006);

    fn session(base_ms: u64, max_attempts: u32) -> Session {
        Session::new(BackoffPolicy::new(Duration::from_millis(base_ms), max_attempts))
    }

    /// Drives `closes` failed attempts and returns the scheduled delays.
    fn fail_repeatedly(session: &mut Session, closes: usize) -> Vec<u128> {
        let mut id = session.connect().expect("idle session dials");
        let mut delays = Vec::new();

        for _ in 0..closes {
            match session.on_close(id, ABNORMAL) {
                CloseOutcome::Reconnect { delay, .. } => {
                    delays.push(delay.as_millis());
                    id = session.reconnect_due().expect("reconnect pending");
                }
                CloseOutcome::Exhausted { .. } => break,
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        delays
    }

    #[test]
    fn test_connect_from_idle() {
        let mut session = session(1000, 10);
        assert_eq!(session.state(), ConnectionState::Idle);

        let id = session.connect().expect("dials");
        assert_eq!(session.state(), ConnectionState::Connecting);
        assert_eq!(session.connection_id(), id);
    }

    #[test]
    fn test_connect_is_noop_while_dialing_or_open() {
        let mut session = session(1000, 10);
        let id = session.connect().expect("dials");
        assert!(session.connect().is_none());

        assert!(session.on_open(id));
        assert!(session.connect().is_none());
        assert_eq!(session.state(), ConnectionState::Open);
    }

    #[test]
    fn test_three_abnormal_closes_schedule_doubling_delays() {
        let mut session = session(1000, 10);
        let delays = fail_repeatedly(&mut session, 3);

        assert_eq!(delays, vec![1000, 2000, 4000]);
        assert_eq!(session.retry_count(), 3);
    }

    #[test]
    fn test_reconnect_count_matches_close_count_up_to_cap() {
        for closes in 0..=5 {
            let mut session = session(10, 5);
            let delays = fail_repeatedly(&mut session, closes);
            assert_eq!(delays.len(), closes);
            for (n, delay) in delays.iter().enumerate() {
                assert_eq!(*delay, 10u128 << n);
            }
        }
    }

    #[test]
    fn test_exhaustion_stops_retrying() {
        let mut session = session(10, 2);
        let mut id = session.connect().expect("dials");

        for _ in 0..2 {
            assert!(matches!(
                session.on_close(id, ABNORMAL),
                CloseOutcome::Reconnect { .. }
            ));
            id = session.reconnect_due().expect("pending");
        }

        assert_eq!(
            session.on_close(id, ABNORMAL),
            CloseOutcome::Exhausted { attempts: 2 }
        );
        assert_eq!(session.state(), ConnectionState::Idle);
        assert!(!session.reconnect_pending());
        assert!(session.reconnect_due().is_none());
    }

    #[test]
    fn test_explicit_connect_after_exhaustion_restores_budget() {
        let mut session = session(10, 1);
        let id = session.connect().expect("dials");
        assert!(matches!(
            session.on_close(id, ABNORMAL),
            CloseOutcome::Reconnect { attempt: 1, .. }
        ));
        let id = session.reconnect_due().expect("pending");
        assert!(matches!(
            session.on_close(id, ABNORMAL),
            CloseOutcome::Exhausted { .. }
        ));

        let id = session.connect().expect("explicit connect dials");
        assert_eq!(session.retry_count(), 0);
        assert!(matches!(
            session.on_close(id, ABNORMAL),
            CloseOutcome::Reconnect { attempt: 1, .. }
        ));
    }

    #[test]
    fn test_open_resets_retry_count() {
        let mut session = session(1000, 10);
        let id = session.connect().expect("dials");
        let _ = session.on_close(id, ABNORMAL);
        let id = session.reconnect_due().expect("pending");
        assert_eq!(session.retry_count(), 1);

        assert!(session.on_open(id));
        assert_eq!(session.retry_count(), 0);

        assert_eq!(
            session.on_close(id, ABNORMAL),
            CloseOutcome::Reconnect {
                attempt: 1,
                delay: Duration::from_millis(1000)
            }
        );
    }

    #[test]
    fn test_normal_close_goes_idle_without_reconnect() {
        let mut session = session(1000, 10);
        let id = session.connect().expect("dials");
        assert!(session.on_open(id));

        assert_eq!(session.on_close(id, Some(NORMAL_CLOSURE)), CloseOutcome::Idle);
        assert_eq!(session.state(), ConnectionState::Idle);
        assert!(!session.reconnect_pending());
    }

    #[test]
    fn test_close_without_code_is_abnormal() {
        let mut session = session(1000, 10);
        let id = session.connect().expect("dials");
        assert!(session.on_open(id));
        assert!(matches!(
            session.on_close(id, None),
            CloseOutcome::Reconnect { .. }
        ));
    }

    #[test]
    fn test_failure_matches_abnormal_close() {
        let mut session = session(250, 10);
        let id = session.connect().expect("dials");
        assert_eq!(
            session.on_failure(id),
            CloseOutcome::Reconnect {
                attempt: 1,
                delay: Duration::from_millis(250)
            }
        );
    }

    #[test]
    fn test_disconnect_from_any_state_goes_idle() {
        let mut session = session(1000, 10);

        let id = session.connect().expect("dials");
        session.disconnect();
        assert_eq!(session.state(), ConnectionState::Idle);
        assert!(!session.on_open(id));

        let id = session.connect().expect("dials");
        assert!(session.on_open(id));
        session.disconnect();
        assert_eq!(session.state(), ConnectionState::Idle);

        let id = session.connect().expect("dials");
        let _ = session.on_close(id, ABNORMAL);
        assert!(session.reconnect_pending());
        session.disconnect();
        assert!(!session.reconnect_pending());
        assert_eq!(session.retry_count(), 0);
        assert!(session.reconnect_due().is_none());
    }

    #[test]
    fn test_late_close_after_disconnect_is_stale() {
        let mut session = session(1000, 10);
        let id = session.connect().expect("dials");
        assert!(session.on_open(id));
        session.disconnect();

        assert_eq!(session.on_close(id, ABNORMAL), CloseOutcome::Stale);
        assert_eq!(session.state(), ConnectionState::Idle);
        assert!(!session.reconnect_pending());
    }

    #[test]
    fn test_connect_during_backoff_dials_immediately() {
        let mut session = session(1000, 10);
        let id = session.connect().expect("dials");
        let _ = session.on_close(id, ABNORMAL);

        let next = session.connect().expect("backoff dials");
        assert!(next > id);
        assert!(!session.reconnect_pending());
        assert_eq!(session.retry_count(), 1);
    }

    #[test]
    fn test_zero_cap_never_reconnects() {
        let mut session = session(1000, 0);
        let id = session.connect().expect("dials");
        assert_eq!(
            session.on_close(id, ABNORMAL),
            CloseOutcome::Exhausted { attempts: 0 }
        );
    }
}
