use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::session::Session;
use crate::{AuthError, ObjectId};

/// A session row ready for insertion. `key_hash` is the digest of the raw
/// key handed to the client.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub key_hash: String,
    pub ip: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionRepository {
    /// `last_activity` starts at `created_at`.
    async fn create_session(&self, session: NewSession) -> Result<Session, AuthError>;
    async fn find_session_by_id(&self, id: ObjectId) -> Result<Option<Session>, AuthError>;

    /// Returns `false` when no row has the id.
    async fn touch_session(&self, id: ObjectId, at: DateTime<Utc>) -> Result<bool, AuthError>;

    /// Least recently active first.
    async fn list_sessions_by_user(
        &self,
        user_id: ObjectId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Session>, AuthError>;
    async fn count_sessions_by_user(&self, user_id: ObjectId) -> Result<u64, AuthError>;

    /// Returns `false` when no row has the id.
    async fn delete_session(&self, id: ObjectId) -> Result<bool, AuthError>;
    async fn delete_sessions_by_user(&self, user_id: ObjectId) -> Result<u64, AuthError>;
    /// Deletes rows with `expires_at <= now`.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}
