#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::{AuthError, ObjectId};

use super::admin::{Admin, AdminRepository, NewAdmin};

#[derive(Clone, Default)]
pub struct MockAdminRepository {
    pub admins: Arc<Mutex<Vec<Admin>>>,
}

impl MockAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, admin: Admin) {
        self.admins.lock().unwrap().push(admin);
    }

    fn update(&self, id: ObjectId, f: impl FnOnce(&mut Admin)) -> Result<(), AuthError> {
        let mut admins = self.admins.lock().unwrap();
        let admin = admins
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AuthError::AdminNotFound)?;
        f(admin);
        admin.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl AdminRepository for MockAdminRepository {
    async fn find_admin_by_id(&self, id: ObjectId) -> Result<Option<Admin>, AuthError> {
        let admins = self.admins.lock().unwrap();
        Ok(admins.iter().find(|a| a.id == id).cloned())
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, AuthError> {
        let admins = self.admins.lock().unwrap();
        Ok(admins.iter().find(|a| a.username == username).cloned())
    }

    async fn create_admin(&self, new_admin: NewAdmin) -> Result<Admin, AuthError> {
        let mut admins = self.admins.lock().unwrap();
        if admins.iter().any(|a| a.username == new_admin.username) {
            return Err(AuthError::UsernameExists);
        }
        if admins.iter().any(|a| a.id == new_admin.id) {
            return Err(AuthError::DatabaseError("duplicate admin id".to_owned()));
        }

        let admin = Admin::mock(new_admin.id, &new_admin.username, &new_admin.hashed_password);
        admins.push(admin.clone());
        Ok(admin)
    }

    async fn update_admin_password(
        &self,
        id: ObjectId,
        hashed_password: &str,
    ) -> Result<(), AuthError> {
        self.update(id, |a| hashed_password.clone_into(&mut a.hashed_password))
    }

    async fn update_admin_username(&self, id: ObjectId, username: &str) -> Result<(), AuthError> {
        self.update(id, |a| username.clone_into(&mut a.username))
    }

    async fn set_admin_active(&self, id: ObjectId, is_active: bool) -> Result<(), AuthError> {
        self.update(id, |a| a.is_active = is_active)
    }

    async fn set_admin_session(
        &self,
        id: ObjectId,
        session: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        self.update(id, |a| {
            a.session = session.map(str::to_owned);
            if a.session.is_some() {
                a.login_at = Some(at);
                a.last_activity = Some(at);
            }
        })
    }

    async fn touch_admin_activity(
        &self,
        id: ObjectId,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        self.update(id, |a| a.last_activity = Some(at))
    }

    async fn list_admins(&self, offset: u64, limit: u64) -> Result<Vec<Admin>, AuthError> {
        let mut admins = self.admins.lock().unwrap().clone();
        admins.sort_by_key(|a| a.created_at);
        Ok(admins
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_admins(&self) -> Result<u64, AuthError> {
        Ok(self.admins.lock().unwrap().len() as u64)
    }
}
