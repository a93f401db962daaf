//! Registration and guarded login.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::password::{hash_password, verify_password};
use super::token::{Claims, TokenIssuer};
use super::AuthError;
use crate::accounts::{AccountStore, PublicUser, StoreError, UserRecord};
use crate::lockout::{Decision, LockoutGuard};
use crate::observability::metrics;

/// An issued session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

/// Result of a login attempt against an existing account.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Authenticated(Session),
    /// Refused without checking the password.
    Locked { remaining_seconds: u64 },
    /// Wrong password; the account is still open.
    Rejected { attempts_remaining: u32 },
    /// Wrong password, and this attempt locked the account.
    JustLocked { lockout_minutes: u32 },
}

/// Account registration and login on top of an [`AccountStore`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    guard: LockoutGuard,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn AccountStore>, tokens: TokenIssuer) -> Self {
        Self {
            store,
            guard: LockoutGuard::default(),
            tokens,
        }
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    /// Create an account and sign it in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields(
                "Name, email, and password are required",
            ));
        }

        let record = UserRecord::new(name, email, hash_password(password)?);
        let token = self.tokens.issue(&record, Utc::now())?;
        let user = record.public();

        match self.store.insert(record).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(AuthError::UserExists),
            Err(e) => return Err(e.into()),
        }

        metrics::record_registration();
        tracing::info!(user_id = %user.id, "Account registered");
        Ok(Session { token, user })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        self.login_at(email, password, Utc::now()).await
    }

    /// Login with an explicit clock reading.
    pub async fn login_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields("Email and password are required"));
        }

        let Some(user) = self.store.find_by_email(email).await? else {
            metrics::record_login("not_found");
            return Err(AuthError::UserNotFound);
        };

        let state = self.store.load_security(user.id).await?;
        let verdict = self
            .guard
            .evaluate(state, now, || verify_password(password, &user.password_hash))?;

        if verdict.changed {
            if let Err(e) = self.store.save_security(user.id, verdict.state).await {
                tracing::error!(user_id = %user.id, error = %e, "Failed to persist security state");
                return Err(e.into());
            }
        }

        let outcome = match verdict.decision {
            Decision::Proceed => {
                let token = self.tokens.issue(&user, now)?;
                metrics::record_login("success");
                tracing::info!(user_id = %user.id, "Login successful");
                LoginOutcome::Authenticated(Session {
                    token,
                    user: user.public(),
                })
            }
            Decision::Locked { remaining_seconds } => {
                metrics::record_login("locked");
                tracing::info!(user_id = %user.id, remaining_seconds, "Login refused, account locked");
                LoginOutcome::Locked { remaining_seconds }
            }
            Decision::Failed { attempts_remaining } => {
                metrics::record_login("invalid_credentials");
                tracing::info!(
                    user_id = %user.id,
                    failed_attempts = verdict.state.failed_attempts,
                    "Invalid credentials"
                );
                LoginOutcome::Rejected { attempts_remaining }
            }
            Decision::JustLocked { lockout_minutes } => {
                metrics::record_login("invalid_credentials");
                metrics::record_lockout();
                tracing::warn!(
                    user_id = %user.id,
                    failed_attempts = verdict.state.failed_attempts,
                    lockout_minutes,
                    "Account locked after repeated failures"
                );
                LoginOutcome::JustLocked { lockout_minutes }
            }
        };
        Ok(outcome)
    }

    /// Validate a bearer token.
    pub fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{MemoryAccountStore, StoreResult};
    use crate::lockout::AccountSecurityState;
    use async_trait::async_trait;
    use chrono::Duration;
    use uuid::Uuid;

    const EMAIL: &str = "buyer@example.com";
    const PASSWORD: &str = "correct horse";

    async fn service_with_user() -> (AuthService, Arc<MemoryAccountStore>) {
        let store = Arc::new(MemoryAccountStore::default());
        let service = AuthService::new(store.clone(), TokenIssuer::new("test", Duration::days(7)));
        service.register("Buyer", EMAIL, PASSWORD).await.unwrap();
        (service, store)
    }

    async fn security(store: &MemoryAccountStore) -> AccountSecurityState {
        let user = store.find_by_email(EMAIL).await.unwrap().unwrap();
        user.security
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, _) = service_with_user().await;
        match service.login(" BUYER@example.com", PASSWORD).await.unwrap() {
            LoginOutcome::Authenticated(session) => {
                let claims = service.authenticate(&session.token).unwrap();
                assert_eq!(claims.email, EMAIL);
                assert_eq!(claims.sub, session.user.id);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let (service, _) = service_with_user().await;
        let err = service.register("Other", EMAIL, "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::UserExists));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let (service, _) = service_with_user().await;
        assert!(matches!(
            service.register("", "x@example.com", "pw").await,
            Err(AuthError::MissingFields(_))
        ));
        assert!(matches!(
            service.login(EMAIL, "").await,
            Err(AuthError::MissingFields(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let (service, _) = service_with_user().await;
        assert!(matches!(
            service.login("nobody@example.com", PASSWORD).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_lockout_flow() {
        let (service, store) = service_with_user().await;
        let t0 = Utc::now();

        for expected in (1..=4).rev() {
            match service.login_at(EMAIL, "wrong", t0).await.unwrap() {
                LoginOutcome::Rejected { attempts_remaining } => {
                    assert_eq!(attempts_remaining, expected)
                }
                other => panic!("expected rejection, got {other:?}"),
            }
        }

        match service.login_at(EMAIL, "wrong", t0).await.unwrap() {
            LoginOutcome::JustLocked { lockout_minutes } => assert_eq!(lockout_minutes, 15),
            other => panic!("expected lock, got {other:?}"),
        }
        let locked = security(&store).await;
        assert_eq!(locked.failed_attempts, 5);
        assert_eq!(locked.locked_until, Some(t0 + Duration::minutes(15)));

        // Correct password is refused while locked and the state is untouched.
        match service
            .login_at(EMAIL, PASSWORD, t0 + Duration::minutes(5))
            .await
            .unwrap()
        {
            LoginOutcome::Locked { remaining_seconds } => assert_eq!(remaining_seconds, 600),
            other => panic!("expected locked, got {other:?}"),
        }
        assert_eq!(security(&store).await, locked);

        // After expiry the account is usable again and fully reset.
        match service
            .login_at(EMAIL, PASSWORD, t0 + Duration::minutes(16))
            .await
            .unwrap()
        {
            LoginOutcome::Authenticated(_) => {}
            other => panic!("expected success, got {other:?}"),
        }
        assert!(security(&store).await.is_clear());
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let (service, store) = service_with_user().await;
        service.login(EMAIL, "wrong").await.unwrap();
        service.login(EMAIL, "wrong").await.unwrap();
        assert_eq!(security(&store).await.failed_attempts, 2);

        service.login(EMAIL, PASSWORD).await.unwrap();
        assert!(security(&store).await.is_clear());
    }

    /// Reads succeed, every security write fails.
    struct ReadOnlyStore(MemoryAccountStore);

    #[async_trait]
    impl AccountStore for ReadOnlyStore {
        async fn insert(&self, record: UserRecord) -> StoreResult<()> {
            self.0.insert(record).await
        }
        async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
            self.0.find_by_email(email).await
        }
        async fn get(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
            self.0.get(id).await
        }
        async fn load_security(&self, id: Uuid) -> StoreResult<AccountSecurityState> {
            self.0.load_security(id).await
        }
        async fn save_security(&self, _id: Uuid, _state: AccountSecurityState) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
        async fn count(&self) -> StoreResult<usize> {
            self.0.count().await
        }
    }

    #[tokio::test]
    async fn test_store_write_failure_is_fatal() {
        let store = Arc::new(ReadOnlyStore(MemoryAccountStore::default()));
        let service = AuthService::new(store, TokenIssuer::new("test", Duration::days(7)));
        service.register("Buyer", EMAIL, PASSWORD).await.unwrap();

        let err = service.login(EMAIL, "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Store(StoreError::Io(_))));
    }
}
