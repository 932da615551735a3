//! Response envelope and request body extraction shared by both services.
//!
//! Every response body has the shape `{status: "ok"|"error", message, data?}`.

use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{ApiError, messages};

pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";

/// The JSON envelope wrapped around every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }

    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: message.to_string(),
            data: None,
        }
    }
}

/// Build a success response.
pub fn respond<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (status, Json(Envelope::ok(message, data))).into_response()
}

/// JSON request body whose rejection is an enveloped 400.
///
/// Must be the last extractor of a handler, since it consumes the body.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!("rejected request body: {rejection}");
                Err(ApiError::Validation(messages::INVALID_JSON.to_string()))
            }
        }
    }
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound(messages::ROUTE_NOT_FOUND.to_string())
}

/// Fallback for a known path called with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed(messages::METHOD_NOT_ALLOWED.to_string())
}
