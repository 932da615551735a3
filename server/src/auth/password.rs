//! Password hashing.
//!
//! Passwords are hashed with Argon2id using a fixed cost and a random 16-byte
//! salt, and stored as a PHC string. Verification goes through the Argon2
//! verifier, which compares digests in constant time.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Error returned when a password cannot be hashed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// The system random source failed.
    #[error("failed to generate salt: {0}")]
    Salt(String),
    /// Argon2 rejected the input.
    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// A salted one-way password digest in PHC string format.
///
/// `Debug` never prints the digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// The PHC string, for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// The hasher with the service's fixed cost parameters.
fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT)
}

/// Hash `password` with a fresh random salt.
///
/// # Errors
/// Returns `PasswordError` if the salt cannot be generated or hashing fails.
pub fn hash_password(password: &str) -> Result<PasswordDigest, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;

    let phc = hasher()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(PasswordDigest(phc))
}

/// Check `password` against a stored digest.
///
/// Returns `false` for a wrong password and for a digest that cannot be parsed.
#[must_use]
pub fn verify_password(password: &str, digest: &PasswordDigest) -> bool {
    PasswordHash::new(digest.as_str())
        .is_ok_and(|parsed| hasher().verify_password(password.as_bytes(), &parsed).is_ok())
}
