use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use classroll_auth::{hash_password, verify_password, NewUser, TokenIssuer, User, UserProfile};
use classroll_core::{Clock, UserId};

use super::ServiceError;
use crate::store::{StoreError, UserStore};

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserProfile,
}

/// Signup and login.
pub struct AccountService<S: ?Sized> {
    store: Arc<S>,
    tokens: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for AccountService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tokens: Arc::clone(&self.tokens),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S> AccountService<S>
where
    S: UserStore + ?Sized,
{
    pub fn new(store: Arc<S>, tokens: Arc<dyn TokenIssuer>, clock: Arc<dyn Clock>) -> Self {
        Self { store, tokens, clock }
    }

    #[instrument(skip(self, new_user), fields(role = %new_user.role), err)]
    pub async fn signup(&self, new_user: NewUser) -> Result<UserProfile, ServiceError> {
        let new_user = new_user.normalized()?;
        let password = new_user.password;

        // argon2 is CPU-bound; keep it off the async workers.
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))??;

        let user = User {
            id: UserId::new(),
            name: new_user.name,
            email: new_user.email,
            roll_number: new_user.roll_number,
            role: new_user.role,
            password_hash,
            created_at: self.clock.now(),
        };

        let user = self.store.insert_user(user).await.map_err(|e| match e {
            StoreError::Conflict(key) => ServiceError::Conflict(key),
            other => other.into(),
        })?;

        info!(user_id = %user.id, "user signed up");
        Ok(user.profile())
    }

    #[instrument(skip(self, password), err)]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.store.find_user_by_email(&email).await? else {
            warn!("login for unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        let plain = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&plain, &stored))
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))??;
        if !matches {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, user.role, self.clock.now())?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome {
            token,
            user: user.profile(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use classroll_auth::{Hs256Tokens, Role, TokenValidator};

    use crate::services::fixtures::{t0, Fixture};

    fn service(fx: &Fixture, tokens: Arc<Hs256Tokens>) -> AccountService<crate::InMemoryRecordStore> {
        AccountService::new(fx.store.clone(), tokens, fx.clock.clone())
    }

    fn tokens() -> Arc<Hs256Tokens> {
        Arc::new(Hs256Tokens::new(b"test-secret", Duration::hours(24)))
    }

    fn signup(email: &str, role: Role, roll: Option<&str>) -> NewUser {
        NewUser {
            name: "Asha".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            role,
            roll_number: roll.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn signup_then_login_yields_a_valid_token() {
        let fx = Fixture::new();
        let tokens = tokens();
        let svc = service(&fx, tokens.clone());

        let profile = svc
            .signup(signup("Asha@Example.com", Role::Student, Some("R1")))
            .await
            .unwrap();
        assert_eq!(profile.email, "asha@example.com");
        assert_eq!(profile.roll_number.as_deref(), Some("R1"));

        let outcome = svc.login(" asha@example.com ", "hunter22").await.unwrap();
        assert_eq!(outcome.user, profile);

        let claims = tokens.validate(&outcome.token, t0()).unwrap();
        assert_eq!(claims.sub, profile.id);
        assert_eq!(claims.role, Role::Student);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let fx = Fixture::new();
        let svc = service(&fx, tokens());
        svc.signup(signup("t@example.com", Role::Teacher, None)).await.unwrap();

        assert_eq!(
            svc.login("t@example.com", "nope-nope").await,
            Err(ServiceError::InvalidCredentials)
        );
        assert_eq!(
            svc.login("who@example.com", "hunter22").await,
            Err(ServiceError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn duplicate_email_or_roll_number_conflicts() {
        let fx = Fixture::new();
        let svc = service(&fx, tokens());
        svc.signup(signup("a@example.com", Role::Student, Some("R1")))
            .await
            .unwrap();

        assert_eq!(
            svc.signup(signup("A@example.com", Role::Teacher, None)).await,
            Err(ServiceError::Conflict("a@example.com".to_string()))
        );
        assert_eq!(
            svc.signup(signup("b@example.com", Role::Student, Some("R1"))).await,
            Err(ServiceError::Conflict("R1".to_string()))
        );
    }

    #[tokio::test]
    async fn invalid_signup_is_a_validation_error() {
        let fx = Fixture::new();
        let svc = service(&fx, tokens());
        assert!(matches!(
            svc.signup(signup("a@example.com", Role::Student, None)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.signup(signup("not-an-email", Role::Teacher, None)).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
