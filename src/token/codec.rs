use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::MIN_SECRET_LENGTH;
use crate::{AuthError, SecretString};

pub const BEARER_PREFIX: &str = "Bearer ";

/// HS256 signer and verifier bound to one secret.
///
/// ```rust
/// use bastion::token::{EmailAction, ActionClaims, TokenCodec};
/// use bastion::ObjectId;
/// use chrono::Duration;
///
/// let codec = TokenCodec::new("a-signing-secret-of-at-least-32-bytes").unwrap();
/// let claims = ActionClaims {
///     sub: ObjectId::new(),
///     action: EmailAction::Verify,
///     username: "bob".into(),
///     email: "bob@example.com".into(),
/// };
///
/// let token = codec.issue(&claims, Duration::hours(24)).unwrap();
/// let back: ActionClaims = codec.verify(token.expose_secret()).unwrap();
/// assert_eq!(back, claims);
/// ```
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &Algorithm::HS256)
            .finish()
    }
}

#[derive(Serialize)]
struct Envelope<'a, C> {
    #[serde(flatten)]
    claims: &'a C,
    exp: i64,
    iat: i64,
}

impl TokenCodec {
    /// # Errors
    ///
    /// `ConfigurationError` if the secret is shorter than 32 bytes.
    pub fn new(secret: impl Into<SecretString>) -> Result<Self, AuthError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::ConfigurationError(format!(
                "signing secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        })
    }

    /// Signs `claims` with `exp = now + ttl` and `iat = now`.
    pub fn issue<C: Serialize>(
        &self,
        claims: &C,
        ttl: Duration,
    ) -> Result<SecretString, AuthError> {
        let now = Utc::now();
        let envelope = Envelope {
            claims,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &envelope, &self.encoding_key)
            .map(SecretString::from)
            .map_err(|e| {
                log::error!(target: "bastion_auth", "msg=\"token signing failed\", error=\"{e}\"");
                AuthError::TokenSigningError
            })
    }

    /// Checks signature, algorithm and expiry, then decodes the claims.
    ///
    /// A leading `Bearer ` is ignored. Every failure, expiry included, is
    /// `TokenInvalid`.
    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, AuthError> {
        let token = strip_bearer(token);

        jsonwebtoken::decode::<C>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!(target: "bastion_auth", "msg=\"token rejected\", reason=\"{e}\"");
                AuthError::TokenInvalid
            })
    }
}

/// `Bearer <token>` for an `Authorization` header.
pub fn bearer(token: &SecretString) -> SecretString {
    SecretString::new(format!("{BEARER_PREFIX}{}", token.expose_secret()))
}

/// Drops a leading `Bearer ` and surrounding whitespace.
pub fn strip_bearer(header: &str) -> &str {
    let header = header.trim();
    header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim_start()
}
