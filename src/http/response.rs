//! Response mapping.
//!
//! # Responsibilities
//! - Turn login outcomes into status codes and JSON bodies
//! - Map service errors to client-safe responses
//!
//! # Design Decisions
//! - Every body carries a human-readable `message`
//! - Remaining minutes are derived from remaining seconds, truncated
//! - Store and crypto failures are logged and reported as a bare 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::{AuthError, LoginOutcome, Session};
use crate::lockout::MAX_LOGIN_ATTEMPTS;

/// Whole minutes left on a lock, as shown to users.
pub fn remaining_minutes(remaining_seconds: u64) -> u64 {
    remaining_seconds / 60
}

impl IntoResponse for LoginOutcome {
    fn into_response(self) -> Response {
        match self {
            LoginOutcome::Authenticated(Session { token, user }) => (
                StatusCode::OK,
                Json(json!({
                    "message": "Login successful",
                    "token": token,
                    "user": user,
                })),
            )
                .into_response(),
            LoginOutcome::Locked { remaining_seconds } => {
                let minutes = remaining_minutes(remaining_seconds);
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "message": format!("Account locked. Try again in {minutes} minutes."),
                        "locked": true,
                        "remaining_minutes": minutes,
                        "remaining_seconds": remaining_seconds,
                    })),
                )
                    .into_response()
            }
            LoginOutcome::JustLocked { lockout_minutes } => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "message": format!(
                        "Account locked after {MAX_LOGIN_ATTEMPTS} failed attempts. Try again in {lockout_minutes} minutes."
                    ),
                    "locked": true,
                    "remaining_minutes": lockout_minutes,
                    "remaining_seconds": u64::from(lockout_minutes) * 60,
                })),
            )
                .into_response(),
            LoginOutcome::Rejected { attempts_remaining } => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "message": format!("Invalid credentials. {attempts_remaining} attempt(s) remaining."),
                    "attempts_remaining": attempts_remaining,
                })),
            )
                .into_response(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::MissingFields(_) => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::UserExists => StatusCode::CONFLICT,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Hashing(_)
            | AuthError::TokenLifetime
            | AuthError::Token(_)
            | AuthError::Store(_) => {
                tracing::error!(error = %self, "Request failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal server error" })),
                )
                    .into_response();
            }
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
