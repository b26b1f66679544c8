#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::AuthError;

use super::attempt::{AttemptRepository, AuthAttempt};

#[derive(Clone, Default)]
pub struct MockAttemptRepository {
    pub attempts: Arc<Mutex<Vec<AuthAttempt>>>,
}

impl MockAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AttemptRepository for MockAttemptRepository {
    async fn record_attempt(&self, attempt: AuthAttempt) -> Result<(), AuthError> {
        self.attempts.lock().unwrap().push(attempt);
        Ok(())
    }

    async fn count_attempts_by_ip(
        &self,
        ip: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthError> {
        let attempts = self.attempts.lock().unwrap();
        Ok(attempts
            .iter()
            .filter(|a| a.ip == ip && a.attempted_at > since)
            .count() as u64)
    }

    async fn count_attempts_by_ip_and_username(
        &self,
        ip: &str,
        username: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthError> {
        let attempts = self.attempts.lock().unwrap();
        Ok(attempts
            .iter()
            .filter(|a| a.ip == ip && a.username == username && a.attempted_at > since)
            .count() as u64)
    }

    async fn delete_attempts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut attempts = self.attempts.lock().unwrap();
        let before = attempts.len();
        attempts.retain(|a| a.attempted_at > cutoff);
        Ok((before - attempts.len()) as u64)
    }
}
