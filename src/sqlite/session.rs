use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::{database_error, parse_id, sql_int};
use crate::repository::{NewSession, SessionRepository};
use crate::session::Session;
use crate::{AuthError, ObjectId};

const SESSION_COLUMNS: &str =
    "id, user_id, key_hash, ip, user_agent, created_at, last_activity, expires_at";

#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: String,
    user_id: String,
    key_hash: String,
    ip: String,
    user_agent: String,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionRecord {
    fn into_session(self) -> Result<Session, AuthError> {
        Ok(Session {
            id: parse_id("load_session", &self.id)?,
            user_id: parse_id("load_session", &self.user_id)?,
            key_hash: self.key_hash,
            ip: self.ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity: self.last_activity,
            expires_at: self.expires_at,
        })
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn create_session(&self, session: NewSession) -> Result<Session, AuthError> {
        let row: SessionRecord = sqlx::query_as(&format!(
            "INSERT INTO sessions ({SESSION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session.id.to_hex())
        .bind(session.user_id.to_hex())
        .bind(&session.key_hash)
        .bind(&session.ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.created_at)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create_session", &e))?;

        row.into_session()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_session_by_id(&self, id: ObjectId) -> Result<Option<Session>, AuthError> {
        let row: Option<SessionRecord> =
            sqlx::query_as(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?"))
                .bind(id.to_hex())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("find_session_by_id", &e))?;

        row.map(SessionRecord::into_session).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn touch_session(&self, id: ObjectId, at: DateTime<Utc>) -> Result<bool, AuthError> {
        let result = sqlx::query("UPDATE sessions SET last_activity = ? WHERE id = ?")
            .bind(at)
            .bind(id.to_hex())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("touch_session", &e))?;

        Ok(result.rows_affected() > 0)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_sessions_by_user(
        &self,
        user_id: ObjectId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Session>, AuthError> {
        let limit = sql_int("list_sessions_by_user", limit)?;
        let offset = sql_int("list_sessions_by_user", offset)?;
        let rows: Vec<SessionRecord> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = ? ORDER BY last_activity ASC LIMIT ? OFFSET ?"
        ))
        .bind(user_id.to_hex())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list_sessions_by_user", &e))?;

        rows.into_iter().map(SessionRecord::into_session).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_sessions_by_user(&self, user_id: ObjectId) -> Result<u64, AuthError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
            .bind(user_id.to_hex())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("count_sessions_by_user", &e))?;

        Ok(count as u64)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_session(&self, id: ObjectId) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id.to_hex())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete_session", &e))?;

        Ok(result.rows_affected() > 0)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_sessions_by_user(&self, user_id: ObjectId) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id.to_hex())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete_sessions_by_user", &e))?;

        Ok(result.rows_affected())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete_expired_sessions", &e))?;

        Ok(result.rows_affected())
    }
}
