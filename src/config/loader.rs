//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `auth.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, std::env::var(JWT_SECRET_ENV).ok())
}

/// Load from `path` when given and present, otherwise start from defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    match path {
        Some(p) if p.exists() => load_config(p),
        Some(p) => {
            tracing::warn!(path = %p.display(), "Config file not found, using defaults");
            parse_config("", std::env::var(JWT_SECRET_ENV).ok())
        }
        None => parse_config("", std::env::var(JWT_SECRET_ENV).ok()),
    }
}

/// Parse TOML, apply the secret override and validate.
pub fn parse_config(content: &str, jwt_secret: Option<String>) -> Result<ServiceConfig, ConfigError> {
    let mut config: ServiceConfig = toml::from_str(content)?;
    if let Some(secret) = jwt_secret.filter(|s| !s.is_empty()) {
        config.auth.jwt_secret = secret;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
