//! Account record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lockout::AccountSecurityState;

/// A stored user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    /// Lower-cased and trimmed; unique across the store.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    #[serde(default)]
    pub security: AccountSecurityState,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(name: &str, email: &str, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            security: AccountSecurityState::new(),
            created_at: Utc::now(),
        }
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The subset of a user returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
