//! Login throttling and account lockout.
//!
//! # Data Flow
//! ```text
//! login attempt
//!     → store.load_security(user_id)
//!     → guard.rs (check lock, lazily clear an expired one)
//!     → credential check (skipped while locked)
//!     → guard.rs (record failure / success)
//!     → store.save_security(user_id, state') when the state changed
//! ```
//!
//! # Design Decisions
//! - Security state is a plain value; every transition returns a new one
//! - Expired locks are cleared on the next access, never by a sweeper
//! - Policy (5 attempts, 15 minutes) is fixed, not read from config
//! - Load/save is not atomic across concurrent attempts on one account

pub mod guard;
pub mod state;

pub use guard::{
    Decision, LockCheck, LockStatus, LockoutGuard, LockoutPolicy, Verdict,
    LOCKOUT_DURATION_MINUTES, MAX_LOGIN_ATTEMPTS,
};
pub use state::AccountSecurityState;
