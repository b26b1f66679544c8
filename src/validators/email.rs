use regex::Regex;
use std::sync::LazyLock;

use super::ValidationError;

/// Overall address limit from RFC 5321.
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;

#[allow(clippy::expect_used)]
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<local>[a-zA-Z0-9._%+-]+)@(?P<domain>[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,})$")
        .expect("email pattern compiles")
});

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }

    let parts = EMAIL_REGEX
        .captures(email)
        .ok_or(ValidationError::EmailInvalidFormat)?;
    let local = parts.name("local").map_or("", |m| m.as_str());
    if local.len() > MAX_LOCAL_PART_LENGTH || local.starts_with('.') || local.ends_with('.') {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validates `email` and returns the lower-cased form accounts are stored
/// and looked up under.
///
/// ```
/// use bastion::validators::normalize_email;
///
/// assert_eq!(normalize_email("Ada@Example.COM").unwrap(), "ada@example.com");
/// assert!(normalize_email("ada@localhost").is_err());
/// ```
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    validate_email(email)?;
    Ok(email.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_addresses() {
        for email in [
            "ada@example.com",
            "First.Last@Example.COM",
            "ada+signup@mail.example.org",
            "ada_l@my-host.co",
        ] {
            assert!(validate_email(email).is_ok(), "{email}");
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailEmpty));
        for email in [
            "plainaddress",
            "ada@localhost",
            "two words@example.com",
            "@example.com",
            "ada@example..com",
            ".ada@example.com",
            "ada.@example.com",
            "ada@@example.com",
        ] {
            assert_eq!(
                validate_email(email),
                Err(ValidationError::EmailInvalidFormat),
                "{email}"
            );
        }
    }

    #[test]
    fn test_length_limits() {
        let long = format!("{}@example.com", "x".repeat(250));
        assert_eq!(validate_email(&long), Err(ValidationError::EmailTooLong));

        let local = format!("{}@example.com", "x".repeat(MAX_LOCAL_PART_LENGTH + 1));
        assert_eq!(validate_email(&local), Err(ValidationError::EmailInvalidFormat));
        let local = format!("{}@example.com", "x".repeat(MAX_LOCAL_PART_LENGTH));
        assert!(validate_email(&local).is_ok());
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(
            normalize_email("Grace.Hopper@Navy.MIL").unwrap(),
            "grace.hopper@navy.mil"
        );
        assert_eq!(
            normalize_email("not-an-email"),
            Err(ValidationError::EmailInvalidFormat)
        );
    }
}
