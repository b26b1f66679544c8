use crate::repository::{AttemptRepository, SessionRepository};
use crate::{AttemptThrottle, AuthError, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PruneResult {
    pub sessions: u64,
    pub attempts: u64,
}

/// Deletes expired sessions and attempts older than the throttle window.
///
/// Nothing depends on this running: expired sessions are already rejected
/// and old attempts fall outside the window. It only bounds storage growth.
pub struct PruneExpiredAction<S: SessionRepository, A: AttemptRepository> {
    sessions: SessionStore<S>,
    throttle: AttemptThrottle<A>,
}

impl<S: SessionRepository, A: AttemptRepository> PruneExpiredAction<S, A> {
    pub fn new(sessions: SessionStore<S>, throttle: AttemptThrottle<A>) -> Self {
        Self { sessions, throttle }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "prune_expired", skip_all, err)
    )]
    pub async fn execute(&self) -> Result<PruneResult, AuthError> {
        let result = PruneResult {
            sessions: self.sessions.prune_expired().await?,
            attempts: self.throttle.prune_expired().await?,
        };

        log::info!(
            target: "bastion_auth",
            "msg=\"expired records pruned\", sessions={}, attempts={}",
            result.sessions,
            result.attempts
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::actions::test_support::Fixture;
    use crate::repository::{AuthAttempt, NewSession};
    use crate::ObjectId;

    #[tokio::test]
    async fn test_prune_expired() {
        let fx = Fixture::new();
        let now = Utc::now();
        let user_id = ObjectId::new();

        fx.session_store().create("ip", user_id, "ua").await.unwrap();
        fx.sessions
            .create_session(NewSession {
                id: ObjectId::new(),
                user_id,
                key_hash: "digest".to_owned(),
                ip: "ip".to_owned(),
                user_agent: "ua".to_owned(),
                created_at: now - Duration::hours(48),
                expires_at: now - Duration::hours(24),
            })
            .await
            .unwrap();

        fx.attempts
            .record_attempt(AuthAttempt {
                ip: "ip".to_owned(),
                username: "alice".to_owned(),
                attempted_at: now,
            })
            .await
            .unwrap();
        fx.attempts
            .record_attempt(AuthAttempt {
                ip: "ip".to_owned(),
                username: "alice".to_owned(),
                attempted_at: now - Duration::hours(2),
            })
            .await
            .unwrap();

        let result = fx.prune_expired().execute().await.unwrap();
        assert_eq!(
            result,
            PruneResult {
                sessions: 1,
                attempts: 1
            }
        );
        assert_eq!(fx.sessions.len(), 1);
        assert_eq!(fx.attempts.len(), 1);

        assert_eq!(fx.prune_expired().execute().await.unwrap(), PruneResult::default());
    }
}
