//! HTTP surface of the identity service.
//!
//! - `POST /users` registers a principal (201).
//! - `POST /users/login` exchanges credentials for a token.
//! - `GET /users/auth` verifies a bearer header and returns its subject.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::Response,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{CredentialStore, IdentityService, PrincipalView, Profile};
use crate::error::ApiError;
use crate::http::{JsonBody, method_not_allowed, respond, route_not_found};

pub const USER_CREATED: &str = "user created successfully";
pub const USER_LOGGED_IN: &str = "user logged in successfully";
pub const VERIFIED: &str = "success";

/// Body of `POST /users`. Absent fields decode as empty and fail validation.
///
/// Not `Debug`: it carries the plaintext password.
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require(&self.email, "email required")?;
        require(&self.password, "password required")?;
        require(&self.first_name, "first_name required")?;
        require(&self.last_name, "last_name required")
    }
}

/// Body of `POST /users/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: String,
}

fn require(value: &str, message: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::Validation(message.to_string()));
    }
    Ok(())
}

/// Routes of the identity service over `service`.
pub fn routes<S: CredentialStore>(service: Arc<IdentityService<S>>) -> Router {
    Router::new()
        .route("/users", post(register::<S>))
        .route("/users/login", post(login::<S>))
        .route("/users/auth", get(verify::<S>))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(service)
}

async fn register<S: CredentialStore>(
    State(service): State<Arc<IdentityService<S>>>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<Response, ApiError> {
    body.validate()?;

    let principal = service
        .register(
            body.email,
            body.password,
            Profile {
                first_name: body.first_name,
                last_name: body.last_name,
            },
        )
        .await?;

    Ok(respond(
        StatusCode::CREATED,
        USER_CREATED,
        PrincipalView::from(&principal),
    ))
}

async fn login<S: CredentialStore>(
    State(service): State<Arc<IdentityService<S>>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    require(&body.email, "email required")?;
    require(&body.password, "password required")?;

    let access_token = service.login(&body.email, body.password).await?;
    Ok(respond(
        StatusCode::OK,
        USER_LOGGED_IN,
        LoginResponse { access_token },
    ))
}

async fn verify<S: CredentialStore>(
    State(service): State<Arc<IdentityService<S>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    // A missing or non-UTF-8 header fails the bearer parse like any other.
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let user_id = service.verify_credential(header)?;
    Ok(respond(StatusCode::OK, VERIFIED, AuthResponse { user_id }))
}
