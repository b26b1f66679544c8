//! Stateful sessions.
//!
//! Users can hold any number of [`Session`] rows, each with a random key the
//! client presents inside its identity token. Admins hold a single session
//! stored on the admin record itself, managed by [`AdminSessionStore`].
//!
//! Only the SHA-256 digest of a key is ever persisted. The raw key is
//! returned once, at creation.

mod admin;
mod store;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use admin::AdminSessionStore;
pub use store::{SessionStore, DEFAULT_SESSION_TTL_HOURS};

use crate::ObjectId;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub key_hash: String,
    pub ip: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is usable strictly before `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            user_id: self.user_id,
            ip: self.ip.clone(),
            user_agent: self.user_agent.clone(),
            created_at: self.created_at,
            last_activity: self.last_activity,
            expires_at: self.expires_at,
        }
    }
}

/// A session as shown to its owner: everything except the key digest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub ip: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        session.view()
    }
}
