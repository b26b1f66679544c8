use chrono::{Duration, Utc};

use crate::crypto::{verify_blocking, Argon2Hasher, PasswordHasher};
use crate::events::{AuthEvent, EventDispatcher};
use crate::repository::AdminRepository;
use crate::session::DEFAULT_SESSION_TTL_HOURS;
use crate::token::{bearer, IdentityClaims, TokenCodec};
use crate::{AdminSessionStore, AuthError, ObjectId, SecretString};

#[derive(Debug, Clone)]
pub struct AdminSignedIn {
    pub admin_id: ObjectId,
    /// `Bearer <jwt>` signed with the admin secret.
    pub token: SecretString,
}

/// Password sign-in for admins.
///
/// Signing in replaces any session the admin already had. Admin sign-in is
/// not throttled.
pub struct AdminSignInAction<A, H = Argon2Hasher>
where
    A: AdminRepository,
{
    admins: A,
    sessions: AdminSessionStore<A>,
    codec: TokenCodec,
    ttl: Duration,
    hasher: H,
    events: EventDispatcher,
}

impl<A: AdminRepository + Clone> AdminSignInAction<A, Argon2Hasher> {
    /// `codec` must be the admin codec.
    pub fn new(admins: A, codec: TokenCodec) -> Self {
        Self {
            sessions: AdminSessionStore::new(admins.clone()),
            admins,
            codec,
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            hasher: Argon2Hasher::default(),
            events: EventDispatcher::new(),
        }
    }
}

impl<A, H> AdminSignInAction<A, H>
where
    A: AdminRepository,
    H: PasswordHasher + Clone + 'static,
{
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> AdminSignInAction<A, H2> {
        AdminSignInAction {
            admins: self.admins,
            sessions: self.sessions,
            codec: self.codec,
            ttl: self.ttl,
            hasher,
            events: self.events,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// # Errors
    ///
    /// `AdminNotFound` when no active admin has the username,
    /// `InvalidCredentials` on a wrong password.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "admin_sign_in", skip_all, err)
    )]
    pub async fn execute(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AdminSignedIn, AuthError> {
        let admin = self
            .admins
            .find_admin_by_username(&username.to_lowercase())
            .await?
            .filter(|a| a.is_active)
            .ok_or(AuthError::AdminNotFound)?;

        if !verify_blocking(&self.hasher, password, &admin.hashed_password).await {
            log::warn!(
                target: "bastion_auth",
                "msg=\"admin sign in failed\", admin_id=\"{}\"",
                admin.id
            );
            return Err(AuthError::InvalidCredentials);
        }

        let key = self.sessions.set_session(admin.id).await?;
        let token = self
            .codec
            .issue(&IdentityClaims::admin(admin.id, key), self.ttl)?;

        log::info!(
            target: "bastion_auth",
            "msg=\"admin signed in\", admin_id=\"{}\"",
            admin.id
        );
        self.events
            .dispatch(AuthEvent::AdminSignedIn {
                admin_id: admin.id,
                at: Utc::now(),
            })
            .await;

        Ok(AdminSignedIn {
            admin_id: admin.id,
            token: bearer(&token),
        })
    }
}
