//! Authentication primitives.
//!
//! Token issuance/verification, password hashing and bearer header parsing.
//! Only the identity service uses `token` and `password`; `bearer` is shared.
//!
//! # Invariants
//! - Nothing in this module holds mutable state; all functions are safe to
//!   call concurrently.

pub mod bearer;
pub mod password;
pub mod token;

pub use bearer::{BEARER_PREFIX, BearerError, parse_bearer};
pub use password::{PasswordDigest, PasswordError, hash_password, verify_password};
pub use token::{SigningSecret, TOKEN_LIFETIME_SECS, TokenError, token_lifetime};
