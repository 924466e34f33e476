//! Account lockout policy.
//!
//! Pure decision logic over an identity's failed-attempt counter and
//! lock-expiry timestamp. The policy never touches the store; the
//! authenticator applies the returned [`LockoutUpdate`]s through the
//! conditional write on [`crate::store::CredentialStore`].

use chrono::{DateTime, Duration, Utc};

use crate::models::Identity;
use crate::store::LockoutUpdate;

/// Lockout state derived from an identity's counter and lock expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutState {
    /// No failures recorded, no lock.
    Clean,
    /// Some failures below the threshold, no lock.
    Warned,
    /// An unexpired lock stands.
    Locked { until: DateTime<Utc> },
    /// The lock window has passed; the counter is retained until the next
    /// successful login reconciles it.
    ExpiredLock,
}

/// Whether an authentication attempt may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutDecision {
    Permitted,
    Locked { remaining: Duration },
}

/// Policy constants live in configuration; these are the defaults.
pub const DEFAULT_MAX_FAILED_ATTEMPTS: i32 = 5;
pub const DEFAULT_LOCK_DURATION_SECONDS: i64 = 900;

#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    max_failed_attempts: i32,
    lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FAILED_ATTEMPTS,
            Duration::seconds(DEFAULT_LOCK_DURATION_SECONDS),
        )
    }
}

impl LockoutPolicy {
    pub fn new(max_failed_attempts: i32, lock_duration: Duration) -> Self {
        Self {
            max_failed_attempts,
            lock_duration,
        }
    }

    pub fn max_failed_attempts(&self) -> i32 {
        self.max_failed_attempts
    }

    pub fn lock_duration(&self) -> Duration {
        self.lock_duration
    }

    /// Classify the identity's current lockout state.
    pub fn state(&self, identity: &Identity, now: DateTime<Utc>) -> LockoutState {
        match identity.locked_until {
            Some(until) if until > now => LockoutState::Locked { until },
            Some(_) => LockoutState::ExpiredLock,
            None if identity.failed_attempts == 0 => LockoutState::Clean,
            None => LockoutState::Warned,
        }
    }

    /// Decide whether an authentication attempt is permitted.
    ///
    /// An expired lock permits the attempt even though the counter may still
    /// sit at or above the threshold: locks are lazily reconciled on the next
    /// successful login, never swept in the background.
    pub fn evaluate(&self, identity: &Identity, now: DateTime<Utc>) -> LockoutDecision {
        match self.state(identity, now) {
            LockoutState::Locked { until } => LockoutDecision::Locked {
                remaining: until - now,
            },
            _ => LockoutDecision::Permitted,
        }
    }

    /// Transition for a failed verification: the counter advances, and
    /// reaching the threshold trips a lock window. An already-standing,
    /// unexpired lock is kept as-is so concurrent over-threshold failures
    /// establish exactly one window.
    pub fn on_failure(&self, identity: &Identity, now: DateTime<Utc>) -> LockoutUpdate {
        let failed_attempts = identity.failed_attempts.saturating_add(1);

        let locked_until = match identity.locked_until {
            Some(until) if until > now => Some(until),
            _ if failed_attempts >= self.max_failed_attempts => Some(now + self.lock_duration),
            _ => None,
        };

        LockoutUpdate {
            failed_attempts,
            locked_until,
        }
    }

    /// Transition for a successful login: counter and lock are cleared.
    pub fn on_success(&self) -> LockoutUpdate {
        LockoutUpdate {
            failed_attempts: 0,
            locked_until: None,
        }
    }
}
