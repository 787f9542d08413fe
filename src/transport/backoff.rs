//! Exponential reconnect backoff.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// BackoffPolicy
// ============================================================================

/// Capped exponential backoff.
///
/// Attempt `n` (zero-based) waits `base * 2^n`. Attempts at or past
/// `max_attempts` are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
    max_attempts: u32,
}

impl BackoffPolicy {
    /// Creates a policy.
    #[inline]
    #[must_use]
    pub const fn new(base: Duration, max_attempts: u32) -> Self {
        Self { base, max_attempts }
    }

    /// Returns the base interval.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> Duration {
        self.base
    }

    /// Returns the attempt cap.
    #[inline]
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before attempt `attempt`, or `None` past the cap.
    ///
    /// Saturates at [`Duration::MAX`] instead of overflowing.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        let delay = 2u32
            .checked_pow(attempt)
            .and_then(|factor| self.base.checked_mul(factor))
            .unwrap_or(Duration::MAX);

        Some(delay)
    }
}

// ============================================================================
// Tests
// ============================================================================
