use chrono::Utc;

use crate::crypto::{verify_blocking, Argon2Hasher, PasswordHasher};
use crate::events::{AuthEvent, EventDispatcher};
use crate::repository::{AttemptRepository, SessionRepository, User, UserRepository};
use crate::token::{bearer, IdentityClaims, TokenCodec};
use crate::{AttemptThrottle, AuthError, ObjectId, SecretString, SessionStore};

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user_id: ObjectId,
    pub session_id: ObjectId,
    /// `Bearer <jwt>`, ready for an `Authorization` header.
    pub token: SecretString,
}

/// Password sign-in for users.
///
/// The throttle is consulted before any lookup. Every failed lookup or
/// password mismatch is recorded as an attempt against `(ip, username)`.
pub struct SignInAction<U, S, A, H = Argon2Hasher>
where
    U: UserRepository,
    S: SessionRepository,
    A: AttemptRepository,
{
    users: U,
    sessions: SessionStore<S>,
    throttle: AttemptThrottle<A>,
    codec: TokenCodec,
    hasher: H,
    events: EventDispatcher,
}

impl<U, S, A> SignInAction<U, S, A, Argon2Hasher>
where
    U: UserRepository,
    S: SessionRepository,
    A: AttemptRepository,
{
    pub fn new(
        users: U,
        sessions: SessionStore<S>,
        throttle: AttemptThrottle<A>,
        codec: TokenCodec,
    ) -> Self {
        Self {
            users,
            sessions,
            throttle,
            codec,
            hasher: Argon2Hasher::default(),
            events: EventDispatcher::new(),
        }
    }
}

impl<U, S, A, H> SignInAction<U, S, A, H>
where
    U: UserRepository,
    S: SessionRepository,
    A: AttemptRepository,
    H: PasswordHasher + Clone + 'static,
{
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> SignInAction<U, S, A, H2> {
        SignInAction {
            users: self.users,
            sessions: self.sessions,
            throttle: self.throttle,
            codec: self.codec,
            hasher,
            events: self.events,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// `login` is a username, or an email address when it contains `@`.
    /// Both are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// - `AttemptsReached` when either throttle threshold is met
    /// - `UserNotFound` when no active account matches
    /// - `InvalidCredentials` on a wrong password
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sign_in", skip_all, err)
    )]
    pub async fn execute(
        &self,
        login: &str,
        password: &SecretString,
        ip: &str,
        user_agent: &str,
    ) -> Result<SignedIn, AuthError> {
        self.throttle.check_allowed(ip, login).await?;

        let user = match self.find_active(login).await? {
            Some(user) => user,
            None => {
                self.fail(login, ip, "user_not_found").await?;
                return Err(AuthError::UserNotFound);
            }
        };

        if !verify_blocking(&self.hasher, password, &user.hashed_password).await {
            self.fail(login, ip, "invalid_credentials").await?;
            return Err(AuthError::InvalidCredentials);
        }

        let (session_id, key) = self.sessions.create(ip, user.id, user_agent).await?;
        let claims = IdentityClaims::user(user.id, session_id, key);
        let token = self.codec.issue(&claims, self.sessions.ttl())?;

        log::info!(
            target: "bastion_auth",
            "msg=\"sign in succeeded\", user_id=\"{}\", session_id=\"{session_id}\"",
            user.id
        );
        self.events
            .dispatch(AuthEvent::SignedIn {
                user_id: user.id,
                session_id,
                ip: ip.to_owned(),
                at: Utc::now(),
            })
            .await;

        Ok(SignedIn {
            user_id: user.id,
            session_id,
            token: bearer(&token),
        })
    }

    async fn find_active(&self, login: &str) -> Result<Option<User>, AuthError> {
        let login = login.to_lowercase();
        let user = if login.contains('@') {
            self.users.find_user_by_email(&login).await?
        } else {
            self.users.find_user_by_username(&login).await?
        };
        Ok(user.filter(|u| u.is_active))
    }

    async fn fail(&self, login: &str, ip: &str, reason: &'static str) -> Result<(), AuthError> {
        self.throttle.record_attempt(ip, login).await?;

        log::warn!(
            target: "bastion_auth",
            "msg=\"sign in failed\", reason=\"{reason}\", ip=\"{ip}\""
        );
        self.events
            .dispatch(AuthEvent::SignInFailed {
                username: login.to_lowercase(),
                ip: ip.to_owned(),
                reason,
                at: Utc::now(),
            })
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{fast_hasher, user_with_password, Fixture};
    use crate::token::Role;
    use crate::ThrottleConfig;

    #[tokio::test]
    async fn test_sign_in_by_username_and_email() {
        let fx = Fixture::new();
        let user = user_with_password("alice", "alice@example.com", "correct-horse");
        fx.users.insert(user.clone());
        let action = fx.sign_in();

        let signed = action
            .execute("Alice", &"correct-horse".into(), "10.0.0.1", "ua")
            .await
            .unwrap();
        assert_eq!(signed.user_id, user.id);
        assert!(signed.token.expose_secret().starts_with("Bearer "));

        let claims: IdentityClaims = fx
            .config
            .user_codec()
            .unwrap()
            .verify(signed.token.expose_secret())
            .unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.sid, Some(signed.session_id));
        assert_eq!(claims.role, Role::User);

        let by_email = action
            .execute("ALICE@example.com", &"correct-horse".into(), "10.0.0.1", "ua")
            .await
            .unwrap();
        assert_ne!(by_email.session_id, signed.session_id);
        assert_eq!(fx.sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_wrong_password_records_attempt() {
        let fx = Fixture::new();
        fx.users
            .insert(user_with_password("bob", "bob@example.com", "rightpass"));

        let err = fx
            .sign_in()
            .execute("bob", &"wrongpass".into(), "10.0.0.2", "ua")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(fx.attempts.len(), 1);
        assert!(fx.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_are_not_found() {
        let fx = Fixture::new();
        let mut user = user_with_password("carol", "carol@example.com", "password1");
        user.is_active = false;
        fx.users.insert(user);
        let action = fx.sign_in();

        for login in ["nobody", "carol"] {
            assert_eq!(
                action
                    .execute(login, &"password1".into(), "ip", "ua")
                    .await
                    .unwrap_err(),
                AuthError::UserNotFound
            );
        }
        assert_eq!(fx.attempts.len(), 2);
    }

    #[tokio::test]
    async fn test_throttle_short_circuits_before_password_check() {
        let fx = Fixture::with_throttle(ThrottleConfig::new(100, 3));
        fx.users
            .insert(user_with_password("dave", "dave@example.com", "realpassword"));
        let action = fx.sign_in();

        for _ in 0..3 {
            assert_eq!(
                action
                    .execute("dave", &"guess".into(), "10.9.9.9", "ua")
                    .await
                    .unwrap_err(),
                AuthError::InvalidCredentials
            );
        }

        // even the right password is refused now
        assert_eq!(
            action
                .execute("dave", &"realpassword".into(), "10.9.9.9", "ua")
                .await
                .unwrap_err(),
            AuthError::AttemptsReached
        );
        assert_eq!(fx.attempts.len(), 3);

        // a different ip is unaffected
        assert!(action
            .execute("dave", &"realpassword".into(), "10.9.9.8", "ua")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_custom_hasher_is_used() {
        let fx = Fixture::new();
        fx.users
            .insert(user_with_password("erin", "erin@example.com", "password2"));
        let action = fx.sign_in().with_hasher(fast_hasher());
        assert!(action
            .execute("erin", &"password2".into(), "ip", "ua")
            .await
            .is_ok());
    }
}
