use super::ValidationError;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;

/// ASCII letters and digits, 3 to 50 characters.
///
/// Case is not checked here; usernames are lower-cased before storage.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }

    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::UsernameInvalidCharacters);
    }

    if username.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username("Alice42").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_rejects_symbols_and_spaces() {
        for name in ["bob smith", "bob@home", "bob_", "böb"] {
            assert_eq!(
                validate_username(name),
                Err(ValidationError::UsernameInvalidCharacters),
                "{name}"
            );
        }
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(validate_username(""), Err(ValidationError::UsernameEmpty));
        assert_eq!(validate_username("ab"), Err(ValidationError::UsernameTooShort));
        assert_eq!(
            validate_username(&"a".repeat(51)),
            Err(ValidationError::UsernameTooLong)
        );
    }
}
