//! Sign-in attempt throttling.
//!
//! Failed sign-ins are recorded per `(ip, username)`. Two independent
//! thresholds apply over a trailing window: one per IP across all usernames,
//! one per IP against a single username. Check-then-record is not atomic, so
//! concurrent requests can overshoot a threshold slightly.

use chrono::Utc;

use crate::config::ThrottleConfig;
use crate::repository::{AttemptRepository, AuthAttempt};
use crate::AuthError;

#[derive(Clone)]
pub struct AttemptThrottle<R: AttemptRepository> {
    repository: R,
    config: ThrottleConfig,
}

impl<R: AttemptRepository> AttemptThrottle<R> {
    pub fn new(repository: R, config: ThrottleConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    pub async fn record_attempt(&self, ip: &str, username: &str) -> Result<(), AuthError> {
        self.repository
            .record_attempt(AuthAttempt {
                ip: ip.to_owned(),
                username: username.to_lowercase(),
                attempted_at: Utc::now(),
            })
            .await
    }

    /// `AttemptsReached` once either count inside the window meets its
    /// threshold.
    pub async fn check_allowed(&self, ip: &str, username: &str) -> Result<(), AuthError> {
        let since = Utc::now() - self.config.window;

        let by_ip = self.repository.count_attempts_by_ip(ip, since).await?;
        if by_ip >= self.config.ip_limit {
            log::warn!(
                target: "bastion_auth",
                "msg=\"ip attempt threshold reached\", ip=\"{ip}\", count={by_ip}"
            );
            return Err(AuthError::AttemptsReached);
        }

        let username = username.to_lowercase();
        let by_pair = self
            .repository
            .count_attempts_by_ip_and_username(ip, &username, since)
            .await?;
        if by_pair >= self.config.ip_username_limit {
            log::warn!(
                target: "bastion_auth",
                "msg=\"username attempt threshold reached\", ip=\"{ip}\", username=\"{username}\", count={by_pair}"
            );
            return Err(AuthError::AttemptsReached);
        }

        Ok(())
    }

    /// Deletes attempts that have left the window.
    pub async fn prune_expired(&self) -> Result<u64, AuthError> {
        self.repository
            .delete_attempts_before(Utc::now() - self.config.window)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::MockAttemptRepository;

    fn throttle(
        ip_limit: u64,
        pair_limit: u64,
    ) -> (AttemptThrottle<MockAttemptRepository>, MockAttemptRepository) {
        let repo = MockAttemptRepository::new();
        (
            AttemptThrottle::new(repo.clone(), ThrottleConfig::new(ip_limit, pair_limit)),
            repo,
        )
    }

    #[tokio::test]
    async fn test_threshold_minus_one_is_allowed() {
        let (throttle, _) = throttle(100, 3);
        for _ in 0..2 {
            throttle.record_attempt("10.0.0.1", "bob").await.unwrap();
        }
        assert!(throttle.check_allowed("10.0.0.1", "bob").await.is_ok());
    }

    #[tokio::test]
    async fn test_threshold_reached() {
        let (throttle, _) = throttle(100, 3);
        for _ in 0..3 {
            throttle.record_attempt("10.0.0.1", "bob").await.unwrap();
        }
        assert_eq!(
            throttle.check_allowed("10.0.0.1", "bob").await,
            Err(AuthError::AttemptsReached)
        );
        // other usernames and other ips are unaffected
        assert!(throttle.check_allowed("10.0.0.1", "alice").await.is_ok());
        assert!(throttle.check_allowed("10.0.0.2", "bob").await.is_ok());
    }

    #[tokio::test]
    async fn test_ip_threshold_spans_usernames() {
        let (throttle, _) = throttle(3, 100);
        for name in ["a1", "b2", "c3"] {
            throttle.record_attempt("10.0.0.9", name).await.unwrap();
        }
        assert_eq!(
            throttle.check_allowed("10.0.0.9", "fresh").await,
            Err(AuthError::AttemptsReached)
        );
    }

    #[tokio::test]
    async fn test_username_case_is_ignored() {
        let (throttle, repo) = throttle(100, 2);
        throttle.record_attempt("ip", "Bob").await.unwrap();
        throttle.record_attempt("ip", "BOB").await.unwrap();

        assert_eq!(repo.attempts.lock().unwrap()[0].username, "bob");
        assert_eq!(
            throttle.check_allowed("ip", "bOb").await,
            Err(AuthError::AttemptsReached)
        );
    }

    #[tokio::test]
    async fn test_old_attempts_fall_out_of_window() {
        let (throttle, repo) = throttle(100, 1);
        repo.record_attempt(AuthAttempt {
            ip: "ip".to_owned(),
            username: "bob".to_owned(),
            attempted_at: Utc::now() - Duration::hours(2),
        })
        .await
        .unwrap();

        assert!(throttle.check_allowed("ip", "bob").await.is_ok());
        assert_eq!(throttle.prune_expired().await.unwrap(), 1);
        assert!(repo.is_empty());
    }
}
