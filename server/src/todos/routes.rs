//! HTTP surface of the todo service.
//!
//! - `POST /todos` creates a todo owned by the caller.
//! - `GET /todos` lists the caller's todos.
//! - `GET /todos/{id}` reads one todo.
//! - `PATCH /todos/{id}` replaces a todo's text.

use axum::{
    Router,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, request::Parts},
    response::Response,
    routing::get,
};
use serde::Deserialize;

use super::service::INVALID_TODO_ID;
use super::{Caller, TodoState, TodoStore};
use crate::error::ApiError;
use crate::http::{JsonBody, method_not_allowed, respond, route_not_found};
use crate::verification::CredentialVerifier;

pub const TODO_CREATED: &str = "todo created";
pub const TODOS_RETRIEVED: &str = "todos retrieved";
pub const TODO_RETRIEVED: &str = "todo retrieved";
pub const TODO_UPDATED: &str = "todo updated";

/// Body of `POST /todos` and `PATCH /todos/{id}`.
#[derive(Debug, Deserialize)]
pub struct TodoRequest {
    #[serde(default)]
    pub text: String,
}

impl TodoRequest {
    fn into_text(self) -> Result<String, ApiError> {
        if self.text.is_empty() {
            return Err(ApiError::Validation("text required".to_string()));
        }
        Ok(self.text)
    }
}

/// The raw `{id}` path segment. A segment that cannot be decoded is an
/// enveloped 400, like any other unusable id.
pub struct TodoIdParam(pub String);

impl<S: Send + Sync> FromRequestParts<S> for TodoIdParam {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                tracing::debug!("rejected todo id: {rejection}");
                Err(ApiError::Validation(INVALID_TODO_ID.to_string()))
            }
        }
    }
}

/// Routes of the todo service over `state`.
pub fn routes<V, S>(state: TodoState<V, S>) -> Router
where
    V: CredentialVerifier,
    S: TodoStore,
{
    Router::new()
        .route("/todos", get(list::<V, S>).post(create::<V, S>))
        .route("/todos/{id}", get(read::<V, S>).patch(update::<V, S>))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

async fn create<V: CredentialVerifier, S: TodoStore>(
    Caller(caller): Caller,
    State(state): State<TodoState<V, S>>,
    JsonBody(body): JsonBody<TodoRequest>,
) -> Result<Response, ApiError> {
    let text = body.into_text()?;
    let todo = state.service.create(caller, text).await?;
    Ok(respond(StatusCode::OK, TODO_CREATED, todo))
}

async fn list<V: CredentialVerifier, S: TodoStore>(
    Caller(caller): Caller,
    State(state): State<TodoState<V, S>>,
) -> Result<Response, ApiError> {
    let todos = state.service.list(caller).await?;
    Ok(respond(StatusCode::OK, TODOS_RETRIEVED, todos))
}

async fn read<V: CredentialVerifier, S: TodoStore>(
    Caller(caller): Caller,
    State(state): State<TodoState<V, S>>,
    TodoIdParam(id): TodoIdParam,
) -> Result<Response, ApiError> {
    let todo = state.service.get(caller, &id).await?;
    Ok(respond(StatusCode::OK, TODO_RETRIEVED, todo))
}

async fn update<V: CredentialVerifier, S: TodoStore>(
    Caller(caller): Caller,
    State(state): State<TodoState<V, S>>,
    TodoIdParam(id): TodoIdParam,
    JsonBody(body): JsonBody<TodoRequest>,
) -> Result<Response, ApiError> {
    let text = body.into_text()?;
    let todo = state.service.update(caller, &id, text).await?;
    Ok(respond(StatusCode::OK, TODO_UPDATED, todo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unroutable_id_is_validation_error() {
        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/todos/%FF")
            .body(())
            .expect("valid request")
            .into_parts();

        let id = TodoIdParam::from_request_parts(&mut parts, &()).await;
        assert!(matches!(
            id,
            Err(ApiError::Validation(message)) if message == "invalid todo id"
        ));
    }

    #[test]
    fn test_text_is_required() {
        let body: TodoRequest = serde_json::from_str("{}").expect("decodable");
        assert_eq!(
            body.into_text(),
            Err(ApiError::Validation("text required".to_string()))
        );

        let body: TodoRequest =
            serde_json::from_str(r#"{"text":"buy milk"}"#).expect("decodable");
        assert_eq!(body.into_text(), Ok("buy milk".to_string()));
    }
}
