//! Identity service.
//!
//! Owns the credential store and the signing secret. Registers principals,
//! exchanges credentials for tokens, and verifies bearer headers for other
//! services.

pub mod principal;
pub mod routes;
pub mod service;
pub mod store;

pub use principal::{Principal, PrincipalView, Profile};
pub use routes::routes;
pub use service::{IdentityError, IdentityService};
pub use store::{CredentialStore, InMemoryCredentialStore};
