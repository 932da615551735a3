//! Identity token codec.
//!
//! Issues and verifies HS256-signed JSON Web Tokens that carry a principal id
//! in the `sub` claim.
//!
//! # Pre-conditions
//! - The signing secret is non-empty (enforced by `SigningSecret::new`).
//!
//! # Post-conditions
//! - `issue` always produces a token whose expiry is strictly after `now`.
//! - On success, `verify` returns the `sub` claim exactly as it was issued.
//!
//! # Invariants
//! - Encoding and verification are pure: no shared mutable state, the clock is
//!   an explicit argument.
//! - A token is valid only strictly before its expiry.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Lifetime of an issued token, in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Lifetime of an issued token.
#[must_use]
pub fn token_lifetime() -> TimeDelta {
    TimeDelta::seconds(TOKEN_LIFETIME_SECS)
}

/// The HMAC key used to sign and verify tokens.
///
/// Held only by the identity service. `Debug` never prints the key material.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wrap raw key material.
    ///
    /// # Errors
    /// Returns `TokenError::EmptySecret` if `secret` is empty.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self(secret))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Claims carried by an identity token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject claim containing the principal id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    /// Issued-at, seconds since the Unix epoch.
    #[serde(default)]
    iat: i64,
    /// Expiry, seconds since the Unix epoch.
    exp: i64,
}

/// Error returned when issuing or verifying a token fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token cannot be decoded.
    #[error("malformed token")]
    MalformedToken,
    /// The MAC does not match when recomputed with the secret.
    #[error("invalid token signature")]
    BadSignature,
    /// The token is at or past its expiry.
    #[error("token has expired")]
    Expired,
    /// The payload has no (or an empty) `sub` claim.
    #[error("missing 'sub' claim in token")]
    MissingSubject,
    /// The signing secret is empty.
    #[error("signing secret must not be empty")]
    EmptySecret,
    /// The token could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issue a token for `subject`, valid from `now` for `token_lifetime()`.
///
/// # Errors
/// Returns `TokenError::Signing` if encoding fails.
pub fn issue(
    subject: &str,
    secret: &SigningSecret,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let issued_at = now.timestamp();
    let claims = Claims {
        sub: Some(subject.to_string()),
        iat: issued_at,
        exp: issued_at + TOKEN_LIFETIME_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Verify `token` against `secret` at time `now` and return its subject.
///
/// # Errors
/// Returns `TokenError` describing the first check that failed: decoding,
/// signature, expiry, then subject presence.
pub fn verify(
    token: &str,
    secret: &SigningSecret,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    // Expiry is checked below against the caller's clock, not the system clock.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode_claims(token, &key, &validation)?;

    if now.timestamp() >= claims.exp {
        return Err(TokenError::Expired);
    }

    match claims.sub {
        Some(sub) if !sub.is_empty() => Ok(sub),
        _ => Err(TokenError::MissingSubject),
    }
}

/// Length of an unpadded base64url HS256 signature.
const HS256_SIGNATURE_LEN: usize = 43;

/// Decode and check the signature of `token`.
///
/// A signature segment that is not valid base64 still means the MAC does not
/// match, so it is a `BadSignature` as long as the rest of the token decodes.
fn decode_claims(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<Claims, TokenError> {
    use jsonwebtoken::errors::ErrorKind;

    match decode::<Claims>(token, key, validation) {
        Ok(data) => Ok(data.claims),
        Err(error) if matches!(error.kind(), ErrorKind::Base64(_)) => {
            let Some((message, _signature)) = token.rsplit_once('.') else {
                return Err(TokenError::MalformedToken);
            };
            // Swap in a well-formed signature to see which segment is broken.
            let resigned = format!("{message}.{}", "A".repeat(HS256_SIGNATURE_LEN));
            match decode::<Claims>(&resigned, key, validation) {
                Ok(_) => Err(TokenError::BadSignature),
                Err(retry) => Err(map_jwt_error(retry)),
            }
        }
        Err(error) => Err(map_jwt_error(error)),
    }
}

/// Maps jsonwebtoken errors to our `TokenError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => TokenError::MissingSubject,
        _ => TokenError::MalformedToken,
    }
}
