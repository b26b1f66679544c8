use super::ValidationError;

/// Password rules.
///
/// The default accepts 8 to 50 characters with no composition rules.
///
/// ```
/// use bastion::validators::PasswordPolicy;
///
/// let policy = PasswordPolicy::default();
/// assert!(policy.validate("password123").is_ok());
///
/// let stricter = PasswordPolicy::new().min(12).require_digit();
/// assert!(stricter.validate("password1234").is_ok());
/// assert!(stricter.validate("passwordabcd").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_digit: bool,
    pub require_letter: bool,
    /// Compared case-insensitively.
    pub disallowed_passwords: Vec<String>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 50,
            require_digit: false,
            require_letter: false,
            disallowed_passwords: Vec::new(),
        }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    #[must_use]
    pub fn max(mut self, len: usize) -> Self {
        self.max_length = len;
        self
    }

    #[must_use]
    pub fn require_digit(mut self) -> Self {
        self.require_digit = true;
        self
    }

    #[must_use]
    pub fn require_letter(mut self) -> Self {
        self.require_letter = true;
        self
    }

    #[must_use]
    pub fn disallowed_passwords(mut self, passwords: Vec<String>) -> Self {
        self.disallowed_passwords = passwords;
        self
    }

    /// # Errors
    ///
    /// Returns the first rule the password breaks. Length is counted in
    /// characters, not bytes.
    pub fn validate(&self, password: &str) -> Result<(), ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::PasswordEmpty);
        }

        let length = password.chars().count();
        if length < self.min_length {
            return Err(ValidationError::PasswordTooShort);
        }
        if length > self.max_length {
            return Err(ValidationError::PasswordTooLong);
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::PasswordMissingDigit);
        }
        if self.require_letter && !password.chars().any(char::is_alphabetic) {
            return Err(ValidationError::PasswordMissingLetter);
        }

        if self
            .disallowed_passwords
            .iter()
            .any(|p| p.eq_ignore_ascii_case(password))
        {
            return Err(ValidationError::PasswordCommon);
        }

        Ok(())
    }
}

/// Validates against [`PasswordPolicy::default`].
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    PasswordPolicy::default().validate(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"p".repeat(50)).is_ok());
        assert_eq!(validate_password(""), Err(ValidationError::PasswordEmpty));
        assert_eq!(
            validate_password("1234567"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_password(&"p".repeat(51)),
            Err(ValidationError::PasswordTooLong)
        );
    }

    #[test]
    fn test_length_counts_characters() {
        // 8 characters, 16 bytes
        assert!(validate_password("ääääääää").is_ok());
    }

    #[test]
    fn test_composition_rules() {
        let policy = PasswordPolicy::new().require_digit().require_letter();
        assert!(policy.validate("abcdefg1").is_ok());
        assert_eq!(
            policy.validate("abcdefgh"),
            Err(ValidationError::PasswordMissingDigit)
        );
        assert_eq!(
            policy.validate("12345678"),
            Err(ValidationError::PasswordMissingLetter)
        );
    }

    #[test]
    fn test_disallowed_passwords() {
        let policy = PasswordPolicy::new()
            .disallowed_passwords(vec!["password".to_owned(), "qwerty123".to_owned()]);
        assert!(policy.validate("correcthorse").is_ok());
        assert_eq!(
            policy.validate("PASSWORD"),
            Err(ValidationError::PasswordCommon)
        );
    }
}
