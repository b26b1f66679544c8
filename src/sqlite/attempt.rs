use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::database_error;
use crate::repository::{AttemptRepository, AuthAttempt};
use crate::AuthError;

#[derive(Clone)]
pub struct SqliteAttemptRepository {
    pool: SqlitePool,
}

impl SqliteAttemptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptRepository for SqliteAttemptRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn record_attempt(&self, attempt: AuthAttempt) -> Result<(), AuthError> {
        sqlx::query("INSERT INTO auth_attempts (ip, username, attempted_at) VALUES (?, ?, ?)")
            .bind(&attempt.ip)
            .bind(&attempt.username)
            .bind(attempt.attempted_at)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("record_attempt", &e))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_attempts_by_ip(
        &self,
        ip: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM auth_attempts WHERE ip = ? AND attempted_at > ?",
        )
        .bind(ip)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("count_attempts_by_ip", &e))?;

        Ok(count as u64)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_attempts_by_ip_and_username(
        &self,
        ip: &str,
        username: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM auth_attempts WHERE ip = ? AND username = ? AND attempted_at > ?",
        )
        .bind(ip)
        .bind(username)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("count_attempts_by_ip_and_username", &e))?;

        Ok(count as u64)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_attempts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM auth_attempts WHERE attempted_at <= ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete_attempts_before", &e))?;

        Ok(result.rows_affected())
    }
}
