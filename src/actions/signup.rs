use chrono::Utc;

use crate::actions::IssueEmailTokenAction;
use crate::crypto::{hash_blocking, Argon2Hasher, PasswordHasher};
use crate::events::{AuthEvent, EventDispatcher};
use crate::repository::{NewUser, User, UserRepository};
use crate::token::EmailAction;
use crate::validators::{normalize_email, validate_username, PasswordPolicy};
use crate::{AuthError, SecretString};

/// Registers a user and sends the verification link.
///
/// Username and email are stored lower-cased. The account can sign in right
/// away; verification only flips `is_email_verified`.
pub struct SignupAction<U: UserRepository, H = Argon2Hasher> {
    users: U,
    issuer: IssueEmailTokenAction,
    password_policy: PasswordPolicy,
    hasher: H,
    events: EventDispatcher,
}

impl<U: UserRepository> SignupAction<U, Argon2Hasher> {
    pub fn new(users: U, issuer: IssueEmailTokenAction) -> Self {
        Self {
            users,
            issuer,
            password_policy: PasswordPolicy::default(),
            hasher: Argon2Hasher::default(),
            events: EventDispatcher::new(),
        }
    }
}

impl<U: UserRepository, H: PasswordHasher + Clone + 'static> SignupAction<U, H> {
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> SignupAction<U, H2> {
        SignupAction {
            users: self.users,
            issuer: self.issuer,
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

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "signup", skip_all, err)
    )]
    pub async fn execute(
        &self,
        username: &str,
        password: &SecretString,
        email: &str,
    ) -> Result<User, AuthError> {
        validate_username(username)?;
        self.password_policy.validate(password.expose_secret())?;
        let email = normalize_email(email)?;
        let username = username.to_lowercase();

        if self.users.find_user_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameExists);
        }
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let hashed_password = hash_blocking(&self.hasher, password).await?;
        let user = self
            .users
            .create_user(NewUser {
                username,
                email,
                hashed_password,
            })
            .await?;

        log::info!(target: "bastion_auth", "msg=\"user registered\", user_id=\"{}\"", user.id);
        self.events
            .dispatch(AuthEvent::UserRegistered {
                user_id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
                at: Utc::now(),
            })
            .await;

        // the account exists either way; a lost link can be resent
        if let Err(e) = self.issuer.execute(&user, EmailAction::Verify).await {
            log::error!(
                target: "bastion_auth",
                "msg=\"verification token not issued\", user_id=\"{}\", error=\"{e}\"",
                user.id
            );
        }

        Ok(user)
    }
}
