//! Input validation for account fields.
//!
//! Rules apply to signup, admin creation and the change-username /
//! change-password / change-email flows.

pub mod email;
pub mod password;
pub mod username;

pub use email::{normalize_email, validate_email};
pub use password::{validate_password, PasswordPolicy};
pub use username::validate_username;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    PasswordEmpty,
    PasswordTooShort,
    PasswordTooLong,
    PasswordMissingDigit,
    PasswordMissingLetter,
    PasswordCommon,
    UsernameEmpty,
    UsernameTooShort,
    UsernameTooLong,
    UsernameInvalidCharacters,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "Email cannot be empty"),
            Self::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            Self::EmailInvalidFormat => write!(f, "Invalid email format"),
            Self::PasswordEmpty => write!(f, "Password cannot be empty"),
            Self::PasswordTooShort => write!(f, "Password is too short"),
            Self::PasswordTooLong => write!(f, "Password is too long"),
            Self::PasswordMissingDigit => write!(f, "Password must contain a digit"),
            Self::PasswordMissingLetter => write!(f, "Password must contain a letter"),
            Self::PasswordCommon => write!(f, "Password is too common"),
            Self::UsernameEmpty => write!(f, "Username cannot be empty"),
            Self::UsernameTooShort => write!(f, "Username must be at least 3 characters"),
            Self::UsernameTooLong => write!(f, "Username is too long (max 50 characters)"),
            Self::UsernameInvalidCharacters => {
                write!(f, "Username may only contain letters and digits")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
