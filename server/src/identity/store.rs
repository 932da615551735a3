//! Credential store: durable mapping of email to principal.
//!
//! # Invariants
//! - `insert_if_absent` is atomic: of two concurrent inserts with the same
//!   email exactly one succeeds and the other sees `StoreError::Duplicate`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use super::Principal;
use crate::store::StoreError;

/// Persistence contract consumed by the identity service.
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist `principal` unless its email is already taken.
    fn insert_if_absent(
        &self,
        principal: Principal,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Look up a principal by exact (case-sensitive) email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Principal>, StoreError>> + Send;
}

/// In-process credential store.
///
/// Uses `RwLock` so lookups run concurrently; the uniqueness check and the
/// insert happen under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    by_email: RwLock<HashMap<String, Principal>>,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_now(&self, principal: Principal) -> Result<(), StoreError> {
        let mut by_email = self.by_email.write().map_err(|_| poisoned())?;
        match by_email.entry(principal.email.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => Err(StoreError::Duplicate),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(principal);
                Ok(())
            }
        }
    }

    fn find_now(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let by_email = self.by_email.read().map_err(|_| poisoned())?;
        Ok(by_email.get(email).cloned())
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn insert_if_absent(
        &self,
        principal: Principal,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        std::future::ready(self.insert_now(principal))
    }

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Principal>, StoreError>> + Send {
        std::future::ready(self.find_now(email))
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("credential store lock poisoned".to_string())
}
