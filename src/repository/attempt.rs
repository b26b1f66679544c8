use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::AuthError;

/// One failed sign-in. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAttempt {
    pub ip: String,
    pub username: String,
    pub attempted_at: DateTime<Utc>,
}

#[async_trait]
pub trait AttemptRepository {
    async fn record_attempt(&self, attempt: AuthAttempt) -> Result<(), AuthError>;

    /// Rows for `ip` with `attempted_at > since`.
    async fn count_attempts_by_ip(&self, ip: &str, since: DateTime<Utc>)
        -> Result<u64, AuthError>;

    /// Rows for `(ip, username)` with `attempted_at > since`.
    async fn count_attempts_by_ip_and_username(
        &self,
        ip: &str,
        username: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthError>;

    /// Deletes rows with `attempted_at <= cutoff`.
    async fn delete_attempts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError>;
}
