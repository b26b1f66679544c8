use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{AuthError, ObjectId};

/// An operator account. Holds at most one live session, stored as the
/// digest of its key in `session`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: ObjectId,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    #[serde(skip_serializing)]
    pub session: Option<String>,
    pub login_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }
}

/// The caller picks the id so the root admin can be created with
/// [`ObjectId::ROOT`].
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub id: ObjectId,
    pub username: String,
    pub hashed_password: String,
}

#[cfg(any(test, feature = "mocks"))]
impl Admin {
    pub fn mock(id: ObjectId, username: &str, hashed_password: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.to_owned(),
            hashed_password: hashed_password.to_owned(),
            session: None,
            login_at: None,
            last_activity: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Updates return `AdminNotFound` when no row has the id.
#[async_trait]
pub trait AdminRepository {
    async fn find_admin_by_id(&self, id: ObjectId) -> Result<Option<Admin>, AuthError>;
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, AuthError>;

    /// # Errors
    ///
    /// `UsernameExists` on a duplicate username.
    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin, AuthError>;

    async fn update_admin_password(
        &self,
        id: ObjectId,
        hashed_password: &str,
    ) -> Result<(), AuthError>;
    async fn update_admin_username(&self, id: ObjectId, username: &str) -> Result<(), AuthError>;
    async fn set_admin_active(&self, id: ObjectId, is_active: bool) -> Result<(), AuthError>;

    /// Replaces the session digest. `Some` also stamps `login_at` and
    /// `last_activity` with `at`; `None` signs the admin out.
    async fn set_admin_session(
        &self,
        id: ObjectId,
        session: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError>;
    async fn touch_admin_activity(&self, id: ObjectId, at: DateTime<Utc>)
        -> Result<(), AuthError>;

    /// Oldest first.
    async fn list_admins(&self, offset: u64, limit: u64) -> Result<Vec<Admin>, AuthError>;
    async fn count_admins(&self) -> Result<u64, AuthError>;
}
