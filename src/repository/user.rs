use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{AuthError, ObjectId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_email_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a user about to be inserted. Username and email are already
/// lower-cased.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

#[cfg(any(test, feature = "mocks"))]
impl User {
    pub fn mock(username: &str, email: &str, hashed_password: &str) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            username: username.to_owned(),
            email: email.to_owned(),
            hashed_password: hashed_password.to_owned(),
            is_email_verified: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Updates return `UserNotFound` when no row has the id. None of the methods
/// filter on `is_active`.
#[async_trait]
pub trait UserRepository {
    async fn find_user_by_id(&self, id: ObjectId) -> Result<Option<User>, AuthError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// New users start active and unverified.
    ///
    /// # Errors
    ///
    /// `UsernameExists` / `EmailExists` when the store's uniqueness
    /// constraint rejects the row.
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError>;

    async fn update_password(&self, id: ObjectId, hashed_password: &str) -> Result<(), AuthError>;
    async fn update_username(&self, id: ObjectId, username: &str) -> Result<(), AuthError>;
    /// Also clears `is_email_verified`.
    async fn update_email(&self, id: ObjectId, email: &str) -> Result<(), AuthError>;
    async fn mark_email_verified(&self, id: ObjectId) -> Result<(), AuthError>;
    async fn set_user_active(&self, id: ObjectId, is_active: bool) -> Result<(), AuthError>;

    /// Oldest first.
    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<User>, AuthError>;
    async fn count_users(&self) -> Result<u64, AuthError>;
}
