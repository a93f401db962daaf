//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, token lifetime in 1..=MAX_TOKEN_TTL_DAYS)
//! - Check addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// Upper bound on `auth.token_ttl_days` (ten years).
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: i64 },

    #[error("auth.jwt_secret must not be empty")]
    EmptySecret,

    #[error("cors origin is not a valid header value: {0}")]
    InvalidOrigin(String),

    #[error("cors origin \"*\" cannot be combined with credentials; list origins explicitly")]
    WildcardOrigin,
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::NotPositive("timeouts.request_secs"));
    }

    if config.auth.token_ttl_days <= 0 {
        errors.push(ValidationError::NotPositive("auth.token_ttl_days"));
    } else if config.auth.token_ttl_days > MAX_TOKEN_TTL_DAYS {
        errors.push(ValidationError::TooLarge {
            field: "auth.token_ttl_days",
            max: MAX_TOKEN_TTL_DAYS,
        });
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }

    for origin in &config.cors.allowed_origins {
        if origin.trim() == "*" {
            errors.push(ValidationError::WildcardOrigin);
        } else if axum::http::HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
