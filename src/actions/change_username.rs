use crate::repository::UserRepository;
use crate::validators::validate_username;
use crate::{AuthError, ObjectId};

/// Renames a signed-in user's account.
pub struct ChangeUsernameAction<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> ChangeUsernameAction<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Returns the stored (lower-cased) username. Renaming to the current
    /// name is a no-op.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "change_username", skip_all, err)
    )]
    pub async fn execute(&self, user_id: ObjectId, username: &str) -> Result<String, AuthError> {
        validate_username(username)?;
        let username = username.to_lowercase();

        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UserNotFound)?;

        if user.username == username {
            return Ok(username);
        }
        if self.users.find_user_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameExists);
        }

        self.users.update_username(user_id, &username).await?;
        log::info!(target: "bastion_auth", "msg=\"username changed\", user_id=\"{user_id}\"");
        Ok(username)
    }
}
