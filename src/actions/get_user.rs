use serde::Serialize;

use crate::repository::{User, UserRepository};
use crate::{AuthError, ObjectId};

/// What other users get to see about an account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicProfile {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// The signed-in user's own record.
pub struct GetAccountAction<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> GetAccountAction<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub async fn execute(&self, user_id: ObjectId) -> Result<User, AuthError> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UserNotFound)
    }
}

/// Public profile of any active user.
pub struct GetUserAction<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> GetUserAction<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub async fn execute(&self, user_id: ObjectId) -> Result<PublicProfile, AuthError> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .map(PublicProfile::from)
            .ok_or(AuthError::UserNotFound)
    }
}
