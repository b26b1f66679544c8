use chrono::{Duration, Utc};

use crate::crypto::{generate_token, hash_token, token_matches, SESSION_KEY_LENGTH};
use crate::pagination::{PageRequest, Paginated};
use crate::repository::{NewSession, SessionRepository};
use crate::{AuthError, ObjectId, SecretString};

use super::{Session, SessionView};

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// User sessions backed by a [`SessionRepository`].
#[derive(Clone)]
pub struct SessionStore<R: SessionRepository> {
    repository: R,
    ttl: Duration,
}

impl<R: SessionRepository> SessionStore<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Opens a session and returns its id with the raw key. The key cannot
    /// be recovered later.
    pub async fn create(
        &self,
        ip: &str,
        user_id: ObjectId,
        user_agent: &str,
    ) -> Result<(ObjectId, SecretString), AuthError> {
        let key = generate_token(SESSION_KEY_LENGTH);
        let now = Utc::now();

        let session = self
            .repository
            .create_session(NewSession {
                id: ObjectId::new(),
                user_id,
                key_hash: hash_token(&key),
                ip: ip.to_owned(),
                user_agent: user_agent.to_owned(),
                created_at: now,
                expires_at: now + self.ttl,
            })
            .await?;

        log::debug!(
            target: "bastion_auth",
            "msg=\"session created\", session_id=\"{}\", user_id=\"{user_id}\"",
            session.id
        );
        Ok((session.id, SecretString::new(key)))
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Session, AuthError> {
        self.repository
            .find_session_by_id(id)
            .await?
            .ok_or(AuthError::SessionNotFound)
    }

    /// Succeeds when the session exists, has not expired and `raw_key`
    /// hashes to the stored digest. Every failure is `InvalidCredentials`.
    pub async fn verify_credentials(
        &self,
        raw_key: &str,
        id: ObjectId,
    ) -> Result<Session, AuthError> {
        let Some(session) = self.repository.find_session_by_id(id).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if session.is_expired() || !token_matches(raw_key, &session.key_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(session)
    }

    /// Stamps `last_activity` with the current time.
    pub async fn touch_activity(&self, id: ObjectId) -> Result<(), AuthError> {
        if self.repository.touch_session(id, Utc::now()).await? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Sessions of one user without key digests. A user with no sessions at
    /// all yields `SessionNotFound`.
    pub async fn list_by_user(
        &self,
        user_id: ObjectId,
        page: PageRequest,
    ) -> Result<Paginated<SessionView>, AuthError> {
        let total = self.repository.count_sessions_by_user(user_id).await?;
        if total == 0 {
            return Err(AuthError::SessionNotFound);
        }

        let sessions = self
            .repository
            .list_sessions_by_user(user_id, page.offset(), page.limit)
            .await?;

        Ok(Paginated::new(sessions, total, page).map(SessionView::from))
    }

    pub async fn terminate(&self, id: ObjectId) -> Result<(), AuthError> {
        if self.repository.delete_session(id).await? {
            log::debug!(target: "bastion_auth", "msg=\"session terminated\", session_id=\"{id}\"");
            Ok(())
        } else {
            Err(AuthError::SessionNotFound)
        }
    }

    /// Removes every session of the user and returns how many there were.
    pub async fn terminate_all(&self, user_id: ObjectId) -> Result<u64, AuthError> {
        let count = self.repository.delete_sessions_by_user(user_id).await?;
        log::debug!(
            target: "bastion_auth",
            "msg=\"sessions terminated\", user_id=\"{user_id}\", count={count}"
        );
        Ok(count)
    }

    pub async fn prune_expired(&self) -> Result<u64, AuthError> {
        self.repository.delete_expired_sessions(Utc::now()).await
    }
}
