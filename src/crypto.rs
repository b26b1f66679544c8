//! Credential hashing and random secret generation.
//!
//! Passwords go through a slow salted [`PasswordHasher`]. Session keys are
//! high-entropy random strings, so they are stored as SHA-256 digests
//! ([`hash_token`]) and compared with [`constant_time_eq`].

use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use password_hash::{PasswordHash, PasswordHasher as ArgonPasswordHasher, SaltString};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::{AuthError, SecretString};

/// Length of generated session keys in characters.
pub const SESSION_KEY_LENGTH: usize = 32;

/// One-way password hashing.
///
/// ```rust
/// use bastion::crypto::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new(1024, 1, 1);
/// let hash = hasher.hash("correct horse").unwrap();
/// assert!(hasher.verify("correct horse", &hash));
/// assert!(!hasher.verify("battery staple", &hash));
/// ```
pub trait PasswordHasher: Send + Sync {
    /// Hash a secret with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` only if the computation fails.
    fn hash(&self, secret: &str) -> Result<String, AuthError>;

    /// Returns `false` on mismatch and on a malformed hash.
    fn verify(&self, secret: &str, hash: &str) -> bool;
}

/// Argon2id hasher with fixed cost parameters.
///
/// Verification reads the parameters embedded in the stored hash, so raising
/// the cost only affects newly written hashes.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    #[must_use]
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// 64 MiB, 3 iterations, 4 lanes.
    #[must_use]
    pub fn production() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::PasswordHashError)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    fn verify(&self, secret: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Runs [`PasswordHasher::hash`] on the blocking pool.
pub async fn hash_blocking<H>(hasher: &H, secret: &SecretString) -> Result<String, AuthError>
where
    H: PasswordHasher + Clone + 'static,
{
    let hasher = hasher.clone();
    let secret = secret.clone();
    tokio::task::spawn_blocking(move || hasher.hash(secret.expose_secret()))
        .await
        .map_err(|e| {
            log::error!(target: "bastion_auth", "msg=\"hash task failed\", error=\"{e}\"");
            AuthError::PasswordHashError
        })?
}

/// Runs [`PasswordHasher::verify`] on the blocking pool.
///
/// A panicked or cancelled task counts as a mismatch.
pub async fn verify_blocking<H>(hasher: &H, secret: &SecretString, hash: &str) -> bool
where
    H: PasswordHasher + Clone + 'static,
{
    let hasher = hasher.clone();
    let secret = secret.clone();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || hasher.verify(secret.expose_secret(), &hash))
        .await
        .unwrap_or(false)
}

/// Alphanumeric random string from the thread-local CSPRNG.
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

/// SHA-256 hex digest of a high-entropy token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// True when `token` digests to `stored_hash`. Comparison time does not
/// depend on where the digests differ.
pub fn token_matches(token: &str, stored_hash: &str) -> bool {
    constant_time_eq(hash_token(token).as_bytes(), stored_hash.as_bytes())
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
