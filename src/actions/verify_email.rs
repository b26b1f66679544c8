use chrono::Utc;

use crate::actions::{ConsumeEmailTokenAction, IssueEmailTokenAction};
use crate::events::{AuthEvent, EventDispatcher};
use crate::repository::UserRepository;
use crate::token::EmailAction;
use crate::{AuthError, ObjectId};

/// Marks an account's email as verified from a `verify` token.
pub struct VerifyEmailAction<U: UserRepository> {
    users: U,
    consumer: ConsumeEmailTokenAction,
    events: EventDispatcher,
}

impl<U: UserRepository> VerifyEmailAction<U> {
    pub fn new(users: U, consumer: ConsumeEmailTokenAction) -> Self {
        Self {
            users,
            consumer,
            events: EventDispatcher::new(),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// # Errors
    ///
    /// - `TokenInvalid` for a bad or expired token, or one minted for an
    ///   address the account no longer uses
    /// - `AccessDenied` for a `reset` token
    /// - `UserNotFound` when the account is gone or deactivated
    /// - `AccountAlreadyVerified` on a second use
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "verify_email", skip_all, err)
    )]
    pub async fn execute(&self, token: &str) -> Result<ObjectId, AuthError> {
        let claims = self.consumer.execute(token, EmailAction::Verify)?;

        let user = self
            .users
            .find_user_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UserNotFound)?;

        if user.email != claims.email {
            return Err(AuthError::TokenInvalid);
        }
        if user.is_email_verified {
            return Err(AuthError::AccountAlreadyVerified);
        }

        self.users.mark_email_verified(user.id).await?;

        log::info!(target: "bastion_auth", "msg=\"email verified\", user_id=\"{}\"", user.id);
        self.events
            .dispatch(AuthEvent::EmailVerified {
                user_id: user.id,
                at: Utc::now(),
            })
            .await;
        Ok(user.id)
    }
}

/// Sends a fresh verification link to an unverified address.
pub struct ResendVerificationAction<U: UserRepository> {
    users: U,
    issuer: IssueEmailTokenAction,
}

impl<U: UserRepository> ResendVerificationAction<U> {
    pub fn new(users: U, issuer: IssueEmailTokenAction) -> Self {
        Self { users, issuer }
    }

    /// # Errors
    ///
    /// `UserEmailNotFound` for an unknown address, `AccountAlreadyVerified`
    /// when there is nothing to verify.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "resend_verification", skip_all, err)
    )]
    pub async fn execute(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .users
            .find_user_by_email(&email.to_lowercase())
            .await?
            .ok_or(AuthError::UserEmailNotFound)?;

        if user.is_email_verified {
            return Err(AuthError::AccountAlreadyVerified);
        }

        self.issuer.execute(&user, EmailAction::Verify).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{user_with_password, Fixture};

    #[tokio::test]
    async fn test_verify_once() {
        let fx = Fixture::new();
        let user = user_with_password("alice", "alice@example.com", "password1");
        fx.users.insert(user.clone());
        let token = fx.issuer().execute(&user, EmailAction::Verify).await.unwrap();
        let action = fx.verify_email();

        assert_eq!(action.execute(token.expose_secret()).await.unwrap(), user.id);
        let stored = fx.users.find_user_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.is_email_verified);

        assert_eq!(
            action.execute(token.expose_secret()).await.unwrap_err(),
            AuthError::AccountAlreadyVerified
        );
    }

    #[tokio::test]
    async fn test_reset_token_cannot_verify() {
        let fx = Fixture::new();
        let user = user_with_password("alice", "alice@example.com", "password1");
        fx.users.insert(user.clone());
        let token = fx.issuer().execute(&user, EmailAction::Reset).await.unwrap();

        assert_eq!(
            fx.verify_email()
                .execute(token.expose_secret())
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );
    }

    #[tokio::test]
    async fn test_token_for_old_address_rejected() {
        let fx = Fixture::new();
        let user = user_with_password("alice", "alice@example.com", "password1");
        fx.users.insert(user.clone());
        let token = fx.issuer().execute(&user, EmailAction::Verify).await.unwrap();
        fx.users
            .update_email(user.id, "alice@elsewhere.com")
            .await
            .unwrap();

        assert_eq!(
            fx.verify_email()
                .execute(token.expose_secret())
                .await
                .unwrap_err(),
            AuthError::TokenInvalid
        );
    }

    #[tokio::test]
    async fn test_inactive_user_not_found() {
        let fx = Fixture::new();
        let mut user = user_with_password("alice", "alice@example.com", "password1");
        user.is_active = false;
        fx.users.insert(user.clone());
        let token = fx.issuer().execute(&user, EmailAction::Verify).await.unwrap();

        assert_eq!(
            fx.verify_email()
                .execute(token.expose_secret())
                .await
                .unwrap_err(),
            AuthError::UserNotFound
        );
    }

    #[tokio::test]
    async fn test_resend() {
        let fx = Fixture::new();
        let mut verified = user_with_password("bob", "bob@example.com", "password1");
        verified.is_email_verified = true;
        fx.users.insert(verified);
        fx.users
            .insert(user_with_password("carol", "carol@example.com", "password1"));
        let action = ResendVerificationAction::new(fx.users.clone(), fx.issuer());

        action.execute("Carol@Example.com").await.unwrap();
        assert_eq!(fx.mailer.last().unwrap().to_email, "carol@example.com");

        assert_eq!(
            action.execute("bob@example.com").await.unwrap_err(),
            AuthError::AccountAlreadyVerified
        );
        assert_eq!(
            action.execute("nobody@example.com").await.unwrap_err(),
            AuthError::UserEmailNotFound
        );
        assert_eq!(fx.mailer.count(), 1);
    }
}
