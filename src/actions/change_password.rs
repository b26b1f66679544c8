use chrono::Utc;

use crate::crypto::{hash_blocking, verify_blocking, Argon2Hasher, PasswordHasher};
use crate::events::{AuthEvent, EventDispatcher};
use crate::repository::UserRepository;
use crate::validators::PasswordPolicy;
use crate::{AuthError, ObjectId, SecretString};

/// Password change for a signed-in user. The current password is required.
pub struct ChangePasswordAction<U: UserRepository, H = Argon2Hasher> {
    users: U,
    password_policy: PasswordPolicy,
    hasher: H,
    events: EventDispatcher,
}

impl<U: UserRepository> ChangePasswordAction<U, Argon2Hasher> {
    pub fn new(users: U) -> Self {
        Self {
            users,
            password_policy: PasswordPolicy::default(),
            hasher: Argon2Hasher::default(),
            events: EventDispatcher::new(),
        }
    }
}

impl<U: UserRepository, H: PasswordHasher + Clone + 'static> ChangePasswordAction<U, H> {
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> ChangePasswordAction<U, H2> {
        ChangePasswordAction {
            users: self.users,
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
        tracing::instrument(name = "change_password", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user_id: ObjectId,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UserNotFound)?;

        if !verify_blocking(&self.hasher, current_password, &user.hashed_password).await {
            return Err(AuthError::InvalidCredentials);
        }

        self.password_policy.validate(new_password.expose_secret())?;

        let hashed = hash_blocking(&self.hasher, new_password).await?;
        self.users.update_password(user_id, &hashed).await?;

        log::info!(target: "bastion_auth", "msg=\"password changed\", user_id=\"{user_id}\"");
        self.events
            .dispatch(AuthEvent::PasswordChanged {
                user_id,
                at: Utc::now(),
            })
            .await;
        Ok(())
    }
}
