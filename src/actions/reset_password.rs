use chrono::Utc;

use crate::actions::ConsumeEmailTokenAction;
use crate::crypto::{hash_blocking, Argon2Hasher, PasswordHasher};
use crate::events::{AuthEvent, EventDispatcher};
use crate::repository::UserRepository;
use crate::token::EmailAction;
use crate::validators::PasswordPolicy;
use crate::{AuthError, ObjectId, SecretString};

/// Sets a new password from a `reset` token.
pub struct ResetPasswordAction<U: UserRepository, H = Argon2Hasher> {
    users: U,
    consumer: ConsumeEmailTokenAction,
    password_policy: PasswordPolicy,
    hasher: H,
    events: EventDispatcher,
}

impl<U: UserRepository> ResetPasswordAction<U, Argon2Hasher> {
    pub fn new(users: U, consumer: ConsumeEmailTokenAction) -> Self {
        Self {
            users,
            consumer,
            password_policy: PasswordPolicy::default(),
            hasher: Argon2Hasher::default(),
            events: EventDispatcher::new(),
        }
    }
}

impl<U: UserRepository, H: PasswordHasher + Clone + 'static> ResetPasswordAction<U, H> {
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> ResetPasswordAction<U, H2> {
        ResetPasswordAction {
            users: self.users,
            consumer: self.consumer,
            password_policy: self.password_policy,
            hasher,
            events: self.events,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, password_policy: PasswordPolicy) -> Self {
        self.password_policy = password_policy;
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// # Errors
    ///
    /// - `Validation` when the new password fails the policy
    /// - `TokenInvalid` for a bad or expired token, or one minted before
    ///   the account's email changed
    /// - `AccessDenied` for a `verify` token
    /// - `UserNotFound` when the account is gone or deactivated
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "reset_password", skip_all, err)
    )]
    pub async fn execute(
        &self,
        token: &str,
        new_password: &SecretString,
    ) -> Result<ObjectId, AuthError> {
        self.password_policy.validate(new_password.expose_secret())?;

        let claims = self.consumer.execute(token, EmailAction::Reset)?;

        let user = self
            .users
            .find_user_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UserNotFound)?;

        if user.email != claims.email {
            return Err(AuthError::TokenInvalid);
        }

        let hashed = hash_blocking(&self.hasher, new_password).await?;
        self.users.update_password(user.id, &hashed).await?;

        log::info!(target: "bastion_auth", "msg=\"password reset\", user_id=\"{}\"", user.id);
        self.events
            .dispatch(AuthEvent::PasswordResetCompleted {
                user_id: user.id,
                at: Utc::now(),
            })
            .await;
        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{fast_hasher, user_with_password, Fixture};
    use crate::validators::ValidationError;

    #[tokio::test]
    async fn test_reset_password_success() {
        let fx = Fixture::new();
        let user = user_with_password("alice", "alice@example.com", "oldpassword1");
        fx.users.insert(user.clone());
        let token = fx.issuer().execute(&user, EmailAction::Reset).await.unwrap();

        let id = fx
            .reset_password()
            .execute(token.expose_secret(), &"newpassword1".into())
            .await
            .unwrap();
        assert_eq!(id, user.id);

        let stored = fx.users.find_user_by_id(user.id).await.unwrap().unwrap();
        assert!(fast_hasher().verify("newpassword1", &stored.hashed_password));
        assert!(!fast_hasher().verify("oldpassword1", &stored.hashed_password));

        fx.sign_in()
            .execute("alice", &"newpassword1".into(), "ip", "ua")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reset_password_rejects_verify_token() {
        let fx = Fixture::new();
        let user = user_with_password("alice", "alice@example.com", "oldpassword1");
        fx.users.insert(user.clone());
        let token = fx.issuer().execute(&user, EmailAction::Verify).await.unwrap();

        assert_eq!(
            fx.reset_password()
                .execute(token.expose_secret(), &"newpassword1".into())
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );
    }

    #[tokio::test]
    async fn test_reset_password_invalid_token() {
        let fx = Fixture::new();
        assert_eq!(
            fx.reset_password()
                .execute("not.a.token", &"newpassword1".into())
                .await
                .unwrap_err(),
            AuthError::TokenInvalid
        );
    }

    #[tokio::test]
    async fn test_reset_password_invalid_password() {
        let fx = Fixture::new();
        assert_eq!(
            fx.reset_password()
                .execute("sometoken", &"short".into())
                .await
                .unwrap_err(),
            AuthError::Validation(ValidationError::PasswordTooShort)
        );
    }

    #[tokio::test]
    async fn test_reset_password_inactive_user() {
        let fx = Fixture::new();
        let mut user = user_with_password("alice", "alice@example.com", "oldpassword1");
        user.is_active = false;
        fx.users.insert(user.clone());
        let token = fx.issuer().execute(&user, EmailAction::Reset).await.unwrap();

        assert_eq!(
            fx.reset_password()
                .execute(token.expose_secret(), &"newpassword1".into())
                .await
                .unwrap_err(),
            AuthError::UserNotFound
        );
    }
}
