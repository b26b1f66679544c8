//! Use cases. Each action is built once with its collaborators and exposes
//! an `execute` method returning `Result<_, AuthError>`.

mod admin_sign_in;
mod authenticate;
mod change_email;
mod change_password;
mod change_username;
mod email_token;
mod forgot_password;
mod get_user;
mod list_sessions;
mod manage_admins;
mod manage_users;
mod prune_expired;
mod reset_password;
mod sign_in;
mod sign_out;
mod signup;
mod verify_email;

#[cfg(test)]
mod test_support;

pub use admin_sign_in::{AdminSignInAction, AdminSignedIn};
pub use authenticate::{
    AdminAuthenticateAction, AuthenticateAction, AuthenticatedAdmin, AuthenticatedUser,
};
pub use change_email::ChangeEmailAction;
pub use change_password::ChangePasswordAction;
pub use change_username::ChangeUsernameAction;
pub use email_token::{
    ConsumeEmailTokenAction, IssueEmailTokenAction, DEFAULT_EMAIL_TOKEN_TTL_HOURS,
};
pub use forgot_password::ForgotPasswordAction;
pub use get_user::{GetAccountAction, GetUserAction, PublicProfile};
pub use list_sessions::ListSessionsAction;
pub use manage_admins::{EnsureRootAdminAction, ManageAdminsAction, ROOT_USERNAME};
pub use manage_users::ManageUsersAction;
pub use prune_expired::{PruneExpiredAction, PruneResult};
pub use reset_password::ResetPasswordAction;
pub use sign_in::{SignInAction, SignedIn};
pub use sign_out::{AdminSignOutAction, SignOutAction};
pub use signup::SignupAction;
pub use verify_email::{ResendVerificationAction, VerifyEmailAction};
