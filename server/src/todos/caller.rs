//! Authentication of todo requests.
//!
//! `Caller` is extracted before anything else a handler needs, so a request
//! that fails authentication never reaches the store.
//!
//! # Post-conditions
//! - A `Caller` always carries a principal id vouched for by the verifier.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{TodoService, TodoStore};
use crate::error::ApiError;
use crate::types::UserId;
use crate::verification::CredentialVerifier;

/// Shared state of the todo service.
pub struct TodoState<V, S> {
    pub verifier: Arc<V>,
    pub service: Arc<TodoService<S>>,
}

// Derived `Clone` would require `V: Clone` and `S: Clone`.
impl<V, S> Clone for TodoState<V, S> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            service: Arc::clone(&self.service),
        }
    }
}

/// The verified principal making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<V, S> FromRequestParts<TodoState<V, S>> for Caller
where
    V: CredentialVerifier,
    S: TodoStore,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &TodoState<V, S>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if header.is_empty() {
            return Err(ApiError::unauthorized());
        }

        let subject = state.verifier.verify_user(header).await.map_err(|e| {
            tracing::debug!("caller not verified: {e}");
            ApiError::unauthorized()
        })?;

        let id = subject.parse::<UserId>().map_err(|e| {
            tracing::warn!("verified subject is not a principal id: {e}");
            ApiError::unauthorized()
        })?;
        Ok(Self(id))
    }
}
