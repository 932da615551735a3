//! The principal (registered account) model.

use serde::Serialize;

use crate::auth::PasswordDigest;
use crate::types::UserId;

/// A registered account capable of authenticating.
///
/// # Invariants
/// - `email` is unique across all principals (enforced by the store).
/// - `password_hash` is never the plaintext.
/// - `id` never changes once assigned.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: PasswordDigest,
}

/// Display fields supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
}

/// The public view of a principal. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct PrincipalView {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Principal> for PrincipalView {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            email: principal.email.clone(),
            first_name: principal.first_name.clone(),
            last_name: principal.last_name.clone(),
        }
    }
}
