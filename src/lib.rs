//! Account authentication core.
//!
//! `bastion` covers the credential side of a user-and-admin account backend:
//! password hashing, signed bearer tokens, stateful sessions with expiry,
//! sign-in throttling and short-lived email action tokens. Storage, mail
//! delivery and HTTP routing are collaborators reached through traits.

pub mod actions;
pub mod config;
pub mod crypto;
pub mod events;
pub mod id;
pub mod mailer;
pub mod pagination;
pub mod repository;
mod secret;
pub mod session;
#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;
pub mod throttle;
pub mod token;
pub mod validators;

pub use config::{AuthConfig, ThrottleConfig};
pub use id::ObjectId;
pub use pagination::{PageRequest, Paginated};
pub use repository::{
    Admin, AdminRepository, AttemptRepository, AuthAttempt, NewAdmin, NewSession, NewUser,
    SessionRepository, User, UserRepository,
};
pub use secret::SecretString;
pub use session::{AdminSessionStore, Session, SessionStore, SessionView};
pub use throttle::AttemptThrottle;
pub use token::{ActionClaims, EmailAction, IdentityClaims, Role, TokenCodec};

#[cfg(any(test, feature = "mocks"))]
pub use repository::{
    MockAdminRepository, MockAttemptRepository, MockSessionRepository, MockUserRepository,
};

use std::fmt;

use validators::ValidationError;

/// Coarse error classes callers branch on.
///
/// Every [`AuthError`] maps onto exactly one kind. Transport layers translate
/// kinds into status codes; the core never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidCredentials,
    AttemptsReached,
    TokenInvalid,
    Conflict,
    AccessDenied,
    InvalidInput,
    Internal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// No active user matches. Also returned for deactivated accounts.
    UserNotFound,
    /// No active admin matches. Also returned for deactivated admins.
    AdminNotFound,
    SessionNotFound,
    /// Lookup by email (resend / forgot) found nothing.
    UserEmailNotFound,
    InvalidCredentials,
    AttemptsReached,
    TokenInvalid,
    UsernameExists,
    EmailExists,
    AccountAlreadyVerified,
    AccessDenied,
    InvalidId,
    Validation(ValidationError),
    PasswordHashError,
    /// Signing an outgoing token failed.
    TokenSigningError,
    ConfigurationError(String),
    DatabaseError(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound
            | Self::AdminNotFound
            | Self::SessionNotFound
            | Self::UserEmailNotFound => ErrorKind::NotFound,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::AttemptsReached => ErrorKind::AttemptsReached,
            Self::TokenInvalid => ErrorKind::TokenInvalid,
            Self::UsernameExists | Self::EmailExists => ErrorKind::Conflict,
            Self::AccessDenied => ErrorKind::AccessDenied,
            Self::AccountAlreadyVerified | Self::InvalidId | Self::Validation(_) => {
                ErrorKind::InvalidInput
            }
            Self::PasswordHashError
            | Self::TokenSigningError
            | Self::ConfigurationError(_)
            | Self::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound => write!(f, "Requested user not found"),
            Self::AdminNotFound => write!(f, "Requested admin not found"),
            Self::SessionNotFound => write!(f, "Session not found"),
            Self::UserEmailNotFound => write!(f, "Email address was not found"),
            Self::InvalidCredentials => write!(f, "Credentials are invalid"),
            Self::AttemptsReached => write!(f, "Maximum number of auth attempts reached"),
            Self::TokenInvalid => write!(f, "Invalid token"),
            Self::UsernameExists => write!(f, "Username already exists"),
            Self::EmailExists => write!(f, "An account with this email is already registered"),
            Self::AccountAlreadyVerified => write!(f, "Account has already been verified"),
            Self::AccessDenied => write!(f, "Access to this resource is denied"),
            Self::InvalidId => write!(f, "Invalid object id"),
            Self::Validation(e) => write!(f, "{e}"),
            Self::PasswordHashError => write!(f, "Failed to hash password"),
            Self::TokenSigningError => write!(f, "Failed to sign token"),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variants_share_kind() {
        assert_eq!(AuthError::UserNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(AuthError::AdminNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(AuthError::SessionNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(AuthError::UserEmailNotFound.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_branchable_kinds_are_distinct() {
        assert_eq!(AuthError::AttemptsReached.kind(), ErrorKind::AttemptsReached);
        assert_eq!(AuthError::TokenInvalid.kind(), ErrorKind::TokenInvalid);
        assert_eq!(
            AuthError::InvalidCredentials.kind(),
            ErrorKind::InvalidCredentials
        );
        assert_eq!(AuthError::EmailExists.kind(), ErrorKind::Conflict);
        assert_eq!(
            AuthError::DatabaseError("down".to_owned()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_validation_error_converts() {
        let err: AuthError = ValidationError::PasswordTooShort.into();
        assert_eq!(err, AuthError::Validation(ValidationError::PasswordTooShort));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AuthError::AttemptsReached.to_string(),
            "Maximum number of auth attempts reached"
        );
        assert_eq!(
            AuthError::DatabaseError("boom".to_owned()).to_string(),
            "Database error: boom"
        );
    }
}
