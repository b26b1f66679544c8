use chrono::Utc;

use crate::crypto::{hash_blocking, Argon2Hasher, PasswordHasher};
use crate::events::{AuthEvent, EventDispatcher};
use crate::pagination::{PageRequest, Paginated};
use crate::repository::{SessionRepository, User, UserRepository};
use crate::session::SessionStore;
use crate::validators::{normalize_email, validate_username, PasswordPolicy};
use crate::{AuthError, ObjectId, SecretString};

/// Account administration on behalf of an authenticated admin.
///
/// Unlike the self-service actions, nothing here filters on `is_active`:
/// admins see and edit deactivated accounts too. Changing the email does not
/// send a verification link.
pub struct ManageUsersAction<U, S, H = Argon2Hasher>
where
    U: UserRepository,
    S: SessionRepository,
{
    users: U,
    sessions: SessionStore<S>,
    password_policy: PasswordPolicy,
    hasher: H,
    events: EventDispatcher,
}

impl<U: UserRepository, S: SessionRepository> ManageUsersAction<U, S, Argon2Hasher> {
    pub fn new(users: U, sessions: SessionStore<S>) -> Self {
        Self {
            users,
            sessions,
            password_policy: PasswordPolicy::default(),
            hasher: Argon2Hasher::default(),
            events: EventDispatcher::new(),
        }
    }
}

impl<U, S, H> ManageUsersAction<U, S, H>
where
    U: UserRepository,
    S: SessionRepository,
    H: PasswordHasher + Clone + 'static,
{
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> ManageUsersAction<U, S, H2> {
        ManageUsersAction {
            users: self.users,
            sessions: self.sessions,
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

    /// Oldest accounts first. An empty store is `UserNotFound`.
    pub async fn list(&self, page: PageRequest) -> Result<Paginated<User>, AuthError> {
        let total = self.users.count_users().await?;
        if total == 0 {
            return Err(AuthError::UserNotFound);
        }

        let users = self.users.list_users(page.offset(), page.limit).await?;
        Ok(Paginated::new(users, total, page))
    }

    pub async fn get(&self, user_id: ObjectId) -> Result<User, AuthError> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "admin_change_username", skip_all, err)
    )]
    pub async fn change_username(
        &self,
        user_id: ObjectId,
        username: &str,
    ) -> Result<(), AuthError> {
        validate_username(username)?;
        let username = username.to_lowercase();

        match self.users.find_user_by_username(&username).await? {
            Some(other) if other.id == user_id => return Ok(()),
            Some(_) => return Err(AuthError::UsernameExists),
            None => {}
        }

        self.users.update_username(user_id, &username).await?;
        log::info!(
            target: "bastion_auth",
            "msg=\"username changed by admin\", user_id=\"{user_id}\""
        );
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "admin_change_password", skip_all, err)
    )]
    pub async fn change_password(
        &self,
        user_id: ObjectId,
        password: &SecretString,
    ) -> Result<(), AuthError> {
        self.password_policy.validate(password.expose_secret())?;
        self.get(user_id).await?;

        let hashed = hash_blocking(&self.hasher, password).await?;
        self.users.update_password(user_id, &hashed).await?;

        log::info!(
            target: "bastion_auth",
            "msg=\"password changed by admin\", user_id=\"{user_id}\""
        );
        self.events
            .dispatch(AuthEvent::PasswordChanged {
                user_id,
                at: Utc::now(),
            })
            .await;
        Ok(())
    }

    /// Leaves the account unverified.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "admin_change_email", skip_all, err)
    )]
    pub async fn change_email(&self, user_id: ObjectId, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email)?;

        match self.users.find_user_by_email(&email).await? {
            Some(other) if other.id == user_id => return Ok(()),
            Some(_) => return Err(AuthError::EmailExists),
            None => {}
        }

        self.users.update_email(user_id, &email).await?;
        log::info!(target: "bastion_auth", "msg=\"email changed by admin\", user_id=\"{user_id}\"");
        Ok(())
    }

    /// Deactivating an account also ends all of its sessions.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "admin_change_user_status", skip_all, err)
    )]
    pub async fn set_status(&self, user_id: ObjectId, is_active: bool) -> Result<(), AuthError> {
        self.users.set_user_active(user_id, is_active).await?;

        log::info!(
            target: "bastion_auth",
            "msg=\"user status changed\", user_id=\"{user_id}\", is_active={is_active}"
        );
        self.events
            .dispatch(AuthEvent::UserStatusChanged {
                user_id,
                is_active,
                at: Utc::now(),
            })
            .await;

        if !is_active {
            let count = self.sessions.terminate_all(user_id).await?;
            self.events
                .dispatch(AuthEvent::SessionsTerminated {
                    user_id,
                    count,
                    at: Utc::now(),
                })
                .await;
        }
        Ok(())
    }
}
