#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::session::Session;
use crate::{AuthError, ObjectId};

use super::session::{NewSession, SessionRepository};

#[derive(Clone, Default)]
pub struct MockSessionRepository {
    pub sessions: Arc<Mutex<Vec<Session>>>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn create_session(&self, new_session: NewSession) -> Result<Session, AuthError> {
        let session = Session {
            id: new_session.id,
            user_id: new_session.user_id,
            key_hash: new_session.key_hash,
            ip: new_session.ip,
            user_agent: new_session.user_agent,
            created_at: new_session.created_at,
            last_activity: new_session.created_at,
            expires_at: new_session.expires_at,
        };
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn find_session_by_id(&self, id: ObjectId) -> Result<Option<Session>, AuthError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn touch_session(&self, id: ObjectId, at: DateTime<Utc>) -> Result<bool, AuthError> {
        let mut sessions = self.sessions.lock().unwrap();
        Ok(match sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.last_activity = at;
                true
            }
            None => false,
        })
    }

    async fn list_sessions_by_user(
        &self,
        user_id: ObjectId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Session>, AuthError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.last_activity);
        Ok(sessions
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_sessions_by_user(&self, user_id: ObjectId) -> Result<u64, AuthError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.iter().filter(|s| s.user_id == user_id).count() as u64)
    }

    async fn delete_session(&self, id: ObjectId) -> Result<bool, AuthError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        Ok(sessions.len() < before)
    }

    async fn delete_sessions_by_user(&self, user_id: ObjectId) -> Result<u64, AuthError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}
