//! Runtime configuration.
//!
//! Everything the core needs at construction time lives in [`AuthConfig`]:
//! the two signing secrets, the throttle thresholds and the fixed TTLs.
//! Nothing is read from globals after startup.
//!
//! # Example
//!
//! ```rust
//! use bastion::config::{AuthConfig, ThrottleConfig};
//!
//! let config = AuthConfig::new(
//!     "user-signing-secret-at-least-32-bytes!!",
//!     "admin-signing-secret-at-least-32-bytes!",
//! )
//! .with_throttle(ThrottleConfig::new(20, 5));
//!
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;

use chrono::Duration;

use crate::token::TokenCodec;
use crate::{AuthError, SecretString};

/// Minimum length of a signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

pub const ENV_SIGNING_KEY: &str = "SIGNING_KEY";
pub const ENV_ADMIN_SIGNING_KEY: &str = "ADMIN_SIGNING_KEY";
pub const ENV_ABUSE_IP: &str = "ABUSE_IP";
pub const ENV_ABUSE_IP_USERNAME: &str = "ABUSE_IP_USERNAME";

#[derive(Clone)]
pub struct AuthConfig {
    /// Signs user identity tokens and email action tokens.
    pub user_signing_secret: SecretString,
    /// Signs admin identity tokens. Must differ from the user secret so a
    /// user token never verifies as an admin token.
    pub admin_signing_secret: SecretString,
    pub throttle: ThrottleConfig,
    /// Lifetime of a session row and of the identity token that names it.
    pub session_ttl: Duration,
    pub email_token_ttl: Duration,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("user_signing_secret", &"[REDACTED]")
            .field("admin_signing_secret", &"[REDACTED]")
            .field("throttle", &self.throttle)
            .field("session_ttl", &self.session_ttl)
            .field("email_token_ttl", &self.email_token_ttl)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(
        user_signing_secret: impl Into<SecretString>,
        admin_signing_secret: impl Into<SecretString>,
    ) -> Self {
        Self {
            user_signing_secret: user_signing_secret.into(),
            admin_signing_secret: admin_signing_secret.into(),
            throttle: ThrottleConfig::default(),
            session_ttl: Duration::hours(24),
            email_token_ttl: Duration::hours(24),
        }
    }

    /// Reads `SIGNING_KEY`, `ADMIN_SIGNING_KEY`, `ABUSE_IP` and
    /// `ABUSE_IP_USERNAME`. All four are required.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when a variable is missing, a threshold is not a
    /// positive integer, or [`validate`](Self::validate) fails.
    pub fn from_env() -> Result<Self, AuthError> {
        let user_secret = required_env(ENV_SIGNING_KEY)?;
        let admin_secret = required_env(ENV_ADMIN_SIGNING_KEY)?;
        let ip_limit = threshold_env(ENV_ABUSE_IP)?;
        let ip_username_limit = threshold_env(ENV_ABUSE_IP_USERNAME)?;

        let config = Self::new(user_secret, admin_secret)
            .with_throttle(ThrottleConfig::new(ip_limit, ip_username_limit));
        config.validate()?;

        log::info!(
            target: "bastion_auth",
            "msg=\"configuration loaded\", ip_limit={ip_limit}, ip_username_limit={ip_username_limit}"
        );
        Ok(config)
    }

    /// Codec for user identity tokens and email action tokens.
    pub fn user_codec(&self) -> Result<TokenCodec, AuthError> {
        TokenCodec::new(self.user_signing_secret.clone())
    }

    pub fn admin_codec(&self) -> Result<TokenCodec, AuthError> {
        TokenCodec::new(self.admin_signing_secret.clone())
    }

    #[must_use]
    pub fn with_throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = throttle;
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_email_token_ttl(mut self, ttl: Duration) -> Self {
        self.email_token_ttl = ttl;
        self
    }

    /// # Errors
    ///
    /// `ConfigurationError` when a secret is shorter than
    /// [`MIN_SECRET_LENGTH`], both secrets are equal, a threshold is zero or
    /// a duration is not positive.
    pub fn validate(&self) -> Result<(), AuthError> {
        check_secret("user signing secret", &self.user_signing_secret)?;
        check_secret("admin signing secret", &self.admin_signing_secret)?;

        if self.user_signing_secret == self.admin_signing_secret {
            return Err(AuthError::ConfigurationError(
                "user and admin signing secrets must differ".to_owned(),
            ));
        }

        self.throttle.validate()?;

        if self.session_ttl <= Duration::zero() || self.email_token_ttl <= Duration::zero() {
            return Err(AuthError::ConfigurationError(
                "token lifetimes must be positive".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Attempt thresholds over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Attempts from one IP across all usernames.
    pub ip_limit: u64,
    /// Attempts from one IP against one username.
    pub ip_username_limit: u64,
    pub window: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            ip_limit: 50,
            ip_username_limit: 7,
            window: Duration::hours(1),
        }
    }
}

impl ThrottleConfig {
    pub fn new(ip_limit: u64, ip_username_limit: u64) -> Self {
        Self {
            ip_limit,
            ip_username_limit,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.ip_limit == 0 || self.ip_username_limit == 0 {
            return Err(AuthError::ConfigurationError(
                "attempt thresholds must be at least 1".to_owned(),
            ));
        }
        if self.window <= Duration::zero() {
            return Err(AuthError::ConfigurationError(
                "attempt window must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

fn check_secret(name: &str, secret: &SecretString) -> Result<(), AuthError> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(AuthError::ConfigurationError(format!(
            "{name} must be at least {MIN_SECRET_LENGTH} bytes, got {}",
            secret.len()
        )));
    }
    Ok(())
}

fn required_env(key: &str) -> Result<String, AuthError> {
    std::env::var(key).map_err(|_| AuthError::ConfigurationError(format!("{key} is not set")))
}

fn threshold_env(key: &str) -> Result<u64, AuthError> {
    let raw = required_env(key)?;
    raw.trim().parse::<u64>().map_err(|_| {
        AuthError::ConfigurationError(format!("{key} must be a positive integer, got {raw:?}"))
    })
}
