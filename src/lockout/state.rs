//! Per-account security state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Failed-attempt counter and lock expiry embedded in each user record.
///
/// Only [`LockoutGuard`](super::LockoutGuard) produces new values of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountSecurityState {
    /// Consecutive failed logins since the last success or unlock.
    pub failed_attempts: u32,
    /// Logins are refused until this instant. `None` means not locked.
    pub locked_until: Option<DateTime<Utc>>,
}

impl AccountSecurityState {
    /// State of a freshly created account.
    pub const fn new() -> Self {
        Self {
            failed_attempts: 0,
            locked_until: None,
        }
    }

    /// True when there is no failure history and no lock.
    pub fn is_clear(&self) -> bool {
        self.failed_attempts == 0 && self.locked_until.is_none()
    }
}
