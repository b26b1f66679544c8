use crate::actions::IssueEmailTokenAction;
use crate::repository::UserRepository;
use crate::token::EmailAction;
use crate::validators::normalize_email;
use crate::{AuthError, ObjectId};

/// Moves a signed-in user to a new address.
///
/// The account becomes unverified and a verification link goes to the new
/// address. Links minted for the old address stop working.
pub struct ChangeEmailAction<U: UserRepository> {
    users: U,
    issuer: IssueEmailTokenAction,
}

impl<U: UserRepository> ChangeEmailAction<U> {
    pub fn new(users: U, issuer: IssueEmailTokenAction) -> Self {
        Self { users, issuer }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "change_email", skip_all, err)
    )]
    pub async fn execute(&self, user_id: ObjectId, email: &str) -> Result<String, AuthError> {
        let email = normalize_email(email)?;

        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UserNotFound)?;

        if user.email == email {
            return Ok(email);
        }
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        self.users.update_email(user_id, &email).await?;
        log::info!(target: "bastion_auth", "msg=\"email changed\", user_id=\"{user_id}\"");

        let user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if let Err(e) = self.issuer.execute(&user, EmailAction::Verify).await {
            log::error!(
                target: "bastion_auth",
                "msg=\"verification token not issued\", user_id=\"{user_id}\", error=\"{e}\""
            );
        }
        Ok(email)
    }
}
