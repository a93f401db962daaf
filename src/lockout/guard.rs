//! Account lockout state machine.
//!
//! # States
//! - Open: `locked_until` absent, `failed_attempts < max_attempts`
//! - Locked: `locked_until` in the future
//! - Expired: `locked_until` in the past (treated as Open after clearing)
//!
//! # State Transitions
//! ```text
//! Open    → Open:    failure, new count < max_attempts
//! Open    → Locked:  failure, new count >= max_attempts
//! Open    → Open:    success (counter reset)
//! Locked  → Locked:  any attempt before expiry (no mutation)
//! Expired → Open:    next access (counter reset, lock cleared)
//! ```

use chrono::{DateTime, Duration, Utc};

use super::state::AccountSecurityState;

/// Failed logins tolerated before the account locks.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// How long a triggered lock lasts.
pub const LOCKOUT_DURATION_MINUTES: u32 = 15;

/// Lockout thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lockout_minutes: u32,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_LOGIN_ATTEMPTS,
            lockout_minutes: LOCKOUT_DURATION_MINUTES,
        }
    }
}

/// Result of a lock check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    Unlocked,
    Locked { remaining_seconds: u64 },
}

/// Lock status plus the state the caller must keep afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockCheck {
    pub status: LockStatus,
    pub state: AccountSecurityState,
    /// An expired lock was cleared; `state` differs from the input.
    pub expired: bool,
}

/// What the authentication handler should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Credential matched; issue a session.
    Proceed,
    /// Account is locked; the credential was not checked.
    Locked { remaining_seconds: u64 },
    /// Credential rejected, account still open.
    Failed { attempts_remaining: u32 },
    /// Credential rejected and this failure triggered the lock.
    JustLocked { lockout_minutes: u32 },
}

/// Outcome of a full guarded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub state: AccountSecurityState,
    /// `state` must be persisted.
    pub changed: bool,
}

/// Policy object consulted on every authentication attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockoutGuard {
    policy: LockoutPolicy,
}

impl LockoutGuard {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self { policy }
    }

    /// Check whether `state` refuses logins at `now`.
    ///
    /// A lock whose expiry has passed is cleared here and the account is
    /// reported unlocked; the returned state must then be saved.
    pub fn check_locked(&self, state: AccountSecurityState, now: DateTime<Utc>) -> LockCheck {
        match state.locked_until {
            Some(until) if now < until => LockCheck {
                status: LockStatus::Locked {
                    remaining_seconds: remaining_seconds(until, now),
                },
                state,
                expired: false,
            },
            Some(_) => LockCheck {
                status: LockStatus::Unlocked,
                state: AccountSecurityState::new(),
                expired: true,
            },
            None => LockCheck {
                status: LockStatus::Unlocked,
                state,
                expired: false,
            },
        }
    }

    /// Count one failed login. Returns the new state and whether it just locked.
    pub fn record_failure(
        &self,
        state: AccountSecurityState,
        now: DateTime<Utc>,
    ) -> (AccountSecurityState, bool) {
        let failed_attempts = state.failed_attempts.saturating_add(1);
        if failed_attempts >= self.policy.max_attempts {
            let until = now + Duration::minutes(i64::from(self.policy.lockout_minutes));
            (
                AccountSecurityState {
                    failed_attempts,
                    locked_until: Some(until),
                },
                true,
            )
        } else {
            (
                AccountSecurityState {
                    failed_attempts,
                    locked_until: state.locked_until,
                },
                false,
            )
        }
    }

    /// A successful credential check always wipes prior failure history.
    pub fn record_success(&self, _state: AccountSecurityState) -> AccountSecurityState {
        AccountSecurityState::new()
    }

    /// Attempts left before the account locks.
    pub fn attempts_remaining(&self, state: &AccountSecurityState) -> u32 {
        self.policy.max_attempts.saturating_sub(state.failed_attempts)
    }

    /// Run a whole guarded attempt.
    ///
    /// `verify` is only invoked when the account is not locked. Its error is
    /// returned as-is and leaves the stored state untouched.
    pub fn evaluate<E>(
        &self,
        state: AccountSecurityState,
        now: DateTime<Utc>,
        verify: impl FnOnce() -> Result<bool, E>,
    ) -> Result<Verdict, E> {
        let check = self.check_locked(state, now);
        if let LockStatus::Locked { remaining_seconds } = check.status {
            return Ok(Verdict {
                decision: Decision::Locked { remaining_seconds },
                state,
                changed: false,
            });
        }

        if verify()? {
            let next = self.record_success(check.state);
            return Ok(Verdict {
                decision: Decision::Proceed,
                changed: next != state,
                state: next,
            });
        }

        let (next, just_locked) = self.record_failure(check.state, now);
        let decision = if just_locked {
            Decision::JustLocked {
                lockout_minutes: self.policy.lockout_minutes,
            }
        } else {
            Decision::Failed {
                attempts_remaining: self.attempts_remaining(&next),
            }
        };
        Ok(Verdict {
            decision,
            state: next,
            changed: true,
        })
    }
}

// Rounded up so a locked account never reports zero.
fn remaining_seconds(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (until - now).num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}
