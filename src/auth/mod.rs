//! Credential handling and the login flow.
//!
//! # Data Flow
//! ```text
//! POST /auth/login
//!     → service.rs (look up account, consult lockout guard)
//!     → password.rs (argon2 verification, only when unlocked)
//!     → token.rs (HS256 session token on success)
//! ```

pub mod password;
pub mod service;
pub mod token;

use thiserror::Error;

use crate::accounts::StoreError;

pub use service::{AuthService, LoginOutcome, Session};
pub use token::{Claims, TokenIssuer};

/// Errors surfaced by the authentication flow.
///
/// Lock and rejection results are not errors; see [`LoginOutcome`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserExists,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("token lifetime exceeds the representable date range")]
    TokenLifetime,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
