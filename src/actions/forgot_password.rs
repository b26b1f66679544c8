use crate::actions::IssueEmailTokenAction;
use crate::repository::UserRepository;
use crate::token::EmailAction;
use crate::AuthError;

/// Mails a password reset link.
pub struct ForgotPasswordAction<U: UserRepository> {
    users: U,
    issuer: IssueEmailTokenAction,
}

impl<U: UserRepository> ForgotPasswordAction<U> {
    pub fn new(users: U, issuer: IssueEmailTokenAction) -> Self {
        Self { users, issuer }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "forgot_password", skip_all, err)
    )]
    pub async fn execute(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .users
            .find_user_by_email(&email.to_lowercase())
            .await?
            .ok_or(AuthError::UserEmailNotFound)?;

        self.issuer.execute(&user, EmailAction::Reset).await?;
        Ok(())
    }
}
