//! Session token issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::accounts::UserRecord;
use crate::config::AuthConfig;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and checks HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Lifetimes too large for `Duration` saturate; `issue` then refuses them.
    pub fn from_config(config: &AuthConfig) -> Self {
        let ttl = Duration::try_days(config.token_ttl_days).unwrap_or(Duration::MAX);
        Self::new(&config.jwt_secret, ttl)
    }

    /// Issue a token for `user`, valid from `now` for the configured lifetime.
    pub fn issue(&self, user: &UserRecord, now: DateTime<Utc>) -> Result<String, AuthError> {
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or(AuthError::TokenLifetime)?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserRecord {
        UserRecord::new("Asha", "asha@example.com", "hash".into())
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new("secret", Duration::days(7));
        let user = user();
        let now = Utc::now();
        let token = issuer.issue(&user, now).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "asha@example.com");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenIssuer::new("secret", Duration::days(7))
            .issue(&user(), Utc::now())
            .unwrap();
        let other = TokenIssuer::new("other", Duration::days(7));
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new("secret", Duration::days(1));
        let token = issuer
            .issue(&user(), Utc::now() - Duration::days(2))
            .unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new("secret", Duration::days(1));
        assert!(issuer.verify("not.a.token").is_err());
    }

    #[test]
    fn test_oversized_lifetime_is_an_error() {
        let config = AuthConfig {
            token_ttl_days: i64::MAX,
            ..AuthConfig::default()
        };
        let issuer = TokenIssuer::from_config(&config);
        assert!(matches!(
            issuer.issue(&user(), Utc::now()),
            Err(AuthError::TokenLifetime)
        ));

        let issuer = TokenIssuer::new("secret", Duration::days(100_000_000));
        assert!(matches!(
            issuer.issue(&user(), Utc::now()),
            Err(AuthError::TokenLifetime)
        ));
    }
}
