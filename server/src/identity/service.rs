//! Identity service: registration, login and credential verification.
//!
//! # Pre-conditions
//! - Input fields have already been checked for presence by the HTTP layer.
//!
//! # Post-conditions
//! - `register` persists exactly one new principal or none.
//! - `login` returns a token whose subject is the principal id.
//! - `verify_credential` returns the subject exactly as it was issued.
//!
//! # Invariants
//! - Plaintext passwords and password hashes are never logged or returned.
//! - Every store call is bounded by `store_timeout`.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{CredentialStore, Principal, Profile};
use crate::auth::{
    BearerError, PasswordError, SigningSecret, TokenError, hash_password, parse_bearer, token,
    verify_password,
};
use crate::error::ApiError;
use crate::store::{StoreError, bounded};
use crate::types::UserId;

pub const EMAIL_TAKEN: &str = "email already exist";
pub const USER_NOT_FOUND: &str = "user not found";
pub const PASSWORD_INCORRECT: &str = "incorrect credentials";

/// Error returned by an identity operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("email is already registered")]
    EmailTaken,
    #[error("no principal with that email")]
    UserNotFound,
    #[error("password does not match")]
    PasswordIncorrect,
    /// The `Authorization` header does not carry a bearer credential.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] BearerError),
    /// The bearer credential failed verification.
    #[error("token rejected: {0}")]
    Rejected(TokenError),
    /// A token could not be issued.
    #[error("token issue failed: {0}")]
    Issue(TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(StoreError),
    /// A blocking hash task panicked or was cancelled.
    #[error("hashing task failed: {0}")]
    Worker(String),
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::EmailTaken => Self::Conflict(EMAIL_TAKEN.to_string()),
            IdentityError::UserNotFound => Self::Validation(USER_NOT_FOUND.to_string()),
            IdentityError::PasswordIncorrect => Self::Validation(PASSWORD_INCORRECT.to_string()),
            IdentityError::InvalidToken(_) | IdentityError::Rejected(_) => Self::unauthorized(),
            IdentityError::Issue(_)
            | IdentityError::Password(_)
            | IdentityError::Store(_)
            | IdentityError::Worker(_) => Self::Internal(error.to_string()),
        }
    }
}

/// Registration, login and verification over a credential store.
pub struct IdentityService<S> {
    store: S,
    secret: SigningSecret,
    store_timeout: Duration,
}

impl<S: CredentialStore> IdentityService<S> {
    #[must_use]
    pub fn new(store: S, secret: SigningSecret, store_timeout: Duration) -> Self {
        Self {
            store,
            secret,
            store_timeout,
        }
    }

    /// Register a new principal.
    ///
    /// The uniqueness check and the insert are one atomic store operation, so
    /// of two concurrent registrations with the same email exactly one wins.
    ///
    /// # Errors
    /// `EmailTaken` if the email is registered; `Password`, `Worker` or
    /// `Store` on infrastructure failure.
    #[tracing::instrument(skip(self, password, profile))]
    pub async fn register(
        &self,
        email: String,
        password: String,
        profile: Profile,
    ) -> Result<Principal, IdentityError> {
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| IdentityError::Worker(e.to_string()))??;

        let principal = Principal {
            id: UserId::new_random(),
            email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            password_hash,
        };

        match bounded(
            self.store_timeout,
            self.store.insert_if_absent(principal.clone()),
        )
        .await
        {
            Ok(()) => {
                tracing::info!(principal_id = %principal.id, "registered principal");
                Ok(principal)
            }
            Err(StoreError::Duplicate) => {
                tracing::debug!("registration refused: email taken");
                Err(IdentityError::EmailTaken)
            }
            Err(e) => {
                tracing::warn!("credential store failed during registration: {e}");
                Err(IdentityError::Store(e))
            }
        }
    }

    /// Check a password and issue a token for the principal.
    ///
    /// # Errors
    /// `UserNotFound` or `PasswordIncorrect` on bad credentials; `Store`,
    /// `Worker` or `Issue` on infrastructure failure.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: String) -> Result<String, IdentityError> {
        let principal = bounded(self.store_timeout, self.store.find_by_email(email))
            .await
            .map_err(|e| {
                tracing::warn!("credential store failed during login: {e}");
                IdentityError::Store(e)
            })?
            .ok_or(IdentityError::UserNotFound)?;

        let digest = principal.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &digest))
            .await
            .map_err(|e| IdentityError::Worker(e.to_string()))?;
        if !matches {
            tracing::debug!(principal_id = %principal.id, "login refused: wrong password");
            return Err(IdentityError::PasswordIncorrect);
        }

        let token = token::issue(&principal.id.to_string(), &self.secret, Utc::now())
            .map_err(IdentityError::Issue)?;
        tracing::info!(principal_id = %principal.id, "principal logged in");
        Ok(token)
    }

    /// Verify an `Authorization` header value against the wall clock.
    ///
    /// # Errors
    /// `InvalidToken` if the header is not `Bearer <token>`; `Rejected` if the
    /// token fails verification.
    pub fn verify_credential(&self, bearer_header: &str) -> Result<String, IdentityError> {
        self.verify_credential_at(bearer_header, Utc::now())
    }

    /// Verify an `Authorization` header value at time `now`.
    ///
    /// # Errors
    /// See [`IdentityService::verify_credential`].
    pub fn verify_credential_at(
        &self,
        bearer_header: &str,
        now: DateTime<Utc>,
    ) -> Result<String, IdentityError> {
        let raw = parse_bearer(bearer_header)?;
        token::verify(raw, &self.secret, now).map_err(|e| {
            tracing::debug!("credential rejected: {e}");
            IdentityError::Rejected(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_lifetime;
    use crate::identity::InMemoryCredentialStore;
    use chrono::TimeDelta;

    fn service() -> IdentityService<InMemoryCredentialStore> {
        IdentityService::new(
            InMemoryCredentialStore::new(),
            SigningSecret::new("unit-test-secret").expect("valid secret"),
            Duration::from_secs(5),
        )
    }

    fn profile() -> Profile {
        Profile {
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login_then_verify() {
        let service = service();
        let principal = service
            .register("alice@x.com".to_string(), "pw1".to_string(), profile())
            .await
            .expect("registered");

        assert_eq!(principal.email, "alice@x.com");
        assert_eq!(principal.first_name, "Alice");

        let token = service
            .login("alice@x.com", "pw1".to_string())
            .await
            .expect("logged in");
        let subject = service
            .verify_credential(&format!("Bearer {token}"))
            .expect("verified");

        assert_eq!(subject, principal.id.to_string());
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first() {
        let service = service();
        let first = service
            .register("alice@x.com".to_string(), "pw1".to_string(), profile())
            .await
            .expect("registered");

        let second = service
            .register("alice@x.com".to_string(), "other".to_string(), profile())
            .await;
        assert_eq!(second.map(|p| p.id), Err(IdentityError::EmailTaken));

        // The first password still works; the second one never landed.
        assert!(service.login("alice@x.com", "pw1".to_string()).await.is_ok());
        assert_eq!(
            service.login("alice@x.com", "other".to_string()).await,
            Err(IdentityError::PasswordIncorrect)
        );

        let token = service
            .login("alice@x.com", "pw1".to_string())
            .await
            .expect("logged in");
        assert_eq!(
            service.verify_credential(&format!("Bearer {token}")),
            Ok(first.id.to_string())
        );
    }

    #[tokio::test]
    async fn test_login_failures_are_distinct() {
        let service = service();
        service
            .register("alice@x.com".to_string(), "pw1".to_string(), profile())
            .await
            .expect("registered");

        assert_eq!(
            service.login("bob@x.com", "pw1".to_string()).await,
            Err(IdentityError::UserNotFound)
        );
        assert_eq!(
            service.login("alice@x.com", "wrong".to_string()).await,
            Err(IdentityError::PasswordIncorrect)
        );
    }

    #[test]
    fn test_verify_requires_exact_bearer_prefix() {
        let service = service();
        for header in ["", "Bearer ", "bearer abc", "Bearer", "Token abc"] {
            assert!(
                matches!(
                    service.verify_credential(header),
                    Err(IdentityError::InvalidToken(_))
                ),
                "{header:?} must be rejected before verification"
            );
        }
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let service = service();
        let issued_at = Utc::now();
        let token = token::issue("someone", &service.secret, issued_at).expect("issued");
        let header = format!("Bearer {token}");

        assert_eq!(
            service.verify_credential_at(&header, issued_at + TimeDelta::seconds(10)),
            Ok("someone".to_string())
        );
        let past_expiry = issued_at + token_lifetime() + TimeDelta::seconds(1);
        assert_eq!(
            service.verify_credential_at(&header, past_expiry),
            Err(IdentityError::Rejected(TokenError::Expired))
        );
    }

    #[test]
    fn test_api_error_mapping() {
        assert_eq!(
            ApiError::from(IdentityError::EmailTaken),
            ApiError::Conflict("email already exist".to_string())
        );
        assert_eq!(
            ApiError::from(IdentityError::UserNotFound),
            ApiError::Validation("user not found".to_string())
        );
        assert_eq!(
            ApiError::from(IdentityError::PasswordIncorrect),
            ApiError::Validation("incorrect credentials".to_string())
        );
        assert_eq!(
            ApiError::from(IdentityError::Rejected(TokenError::BadSignature)),
            ApiError::unauthorized()
        );
        assert!(matches!(
            ApiError::from(IdentityError::Store(StoreError::Timeout(Duration::from_secs(5)))),
            ApiError::Internal(_)
        ));
    }
}
