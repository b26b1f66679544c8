use chrono::Utc;

use crate::crypto::{generate_token, hash_token, token_matches, SESSION_KEY_LENGTH};
use crate::repository::{Admin, AdminRepository};
use crate::{AuthError, ObjectId, SecretString};

/// The single session slot on each admin record.
///
/// Every operation requires an active admin; a missing or deactivated one is
/// `AdminNotFound`. Signing in again replaces the previous key, which signs
/// out the earlier client.
#[derive(Clone)]
pub struct AdminSessionStore<A: AdminRepository> {
    repository: A,
}

impl<A: AdminRepository> AdminSessionStore<A> {
    pub fn new(repository: A) -> Self {
        Self { repository }
    }

    async fn active_admin(&self, admin_id: ObjectId) -> Result<Admin, AuthError> {
        match self.repository.find_admin_by_id(admin_id).await? {
            Some(admin) if admin.is_active => Ok(admin),
            _ => Err(AuthError::AdminNotFound),
        }
    }

    /// Stores a fresh key digest and returns the raw key.
    pub async fn set_session(&self, admin_id: ObjectId) -> Result<SecretString, AuthError> {
        self.active_admin(admin_id).await?;

        let key = generate_token(SESSION_KEY_LENGTH);
        self.repository
            .set_admin_session(admin_id, Some(&hash_token(&key)), Utc::now())
            .await?;

        Ok(SecretString::new(key))
    }

    /// `InvalidCredentials` when the admin is signed out or the key does not
    /// match.
    pub async fn check(&self, admin_id: ObjectId, raw_key: &str) -> Result<Admin, AuthError> {
        let admin = self.active_admin(admin_id).await?;

        match admin.session.as_deref() {
            Some(stored) if token_matches(raw_key, stored) => Ok(admin),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    pub async fn clear(&self, admin_id: ObjectId) -> Result<(), AuthError> {
        self.active_admin(admin_id).await?;
        self.repository
            .set_admin_session(admin_id, None, Utc::now())
            .await
    }

    pub async fn touch_activity(&self, admin_id: ObjectId) -> Result<(), AuthError> {
        self.active_admin(admin_id).await?;
        self.repository
            .touch_admin_activity(admin_id, Utc::now())
            .await
    }
}
