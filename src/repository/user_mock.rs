#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::{AuthError, ObjectId};

use super::user::{NewUser, User, UserRepository};

#[derive(Clone, Default)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    fn update(&self, id: ObjectId, f: impl FnOnce(&mut User)) -> Result<(), AuthError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AuthError::UserNotFound)?;
        f(user);
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_user_by_id(&self, id: ObjectId) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(AuthError::UsernameExists);
        }
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AuthError::EmailExists);
        }

        let user = User::mock(
            &new_user.username,
            &new_user.email,
            &new_user.hashed_password,
        );
        users.push(user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: ObjectId, hashed_password: &str) -> Result<(), AuthError> {
        self.update(id, |u| hashed_password.clone_into(&mut u.hashed_password))
    }

    async fn update_username(&self, id: ObjectId, username: &str) -> Result<(), AuthError> {
        self.update(id, |u| username.clone_into(&mut u.username))
    }

    async fn update_email(&self, id: ObjectId, email: &str) -> Result<(), AuthError> {
        self.update(id, |u| {
            email.clone_into(&mut u.email);
            u.is_email_verified = false;
        })
    }

    async fn mark_email_verified(&self, id: ObjectId) -> Result<(), AuthError> {
        self.update(id, |u| u.is_email_verified = true)
    }

    async fn set_user_active(&self, id: ObjectId, is_active: bool) -> Result<(), AuthError> {
        self.update(id, |u| u.is_active = is_active)
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<User>, AuthError> {
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by_key(|u| u.created_at);
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_users(&self) -> Result<u64, AuthError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }
}
