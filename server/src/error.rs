//! Error taxonomy shared by both services.
//!
//! Every domain failure is converted into an `ApiError` at the HTTP boundary.
//! Validation and ownership failures keep their message; infrastructure
//! failures are logged and replaced by a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::Envelope;

/// Client-facing messages.
pub mod messages {
    pub const SOMETHING_WENT_WRONG: &str = "something went wrong";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const INVALID_JSON: &str = "Invalid JSON";
    pub const ROUTE_NOT_FOUND: &str = "route not found";
    pub const METHOD_NOT_ALLOWED: &str = "method not allowed";
}

/// An error that is turned into an enveloped HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Bad or missing input (400).
    #[error("validation error: {0}")]
    Validation(String),
    /// Missing, invalid or expired credential, or a caller that does not own
    /// the resource (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),
    /// The route exists but not for this method (405).
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
    /// A uniqueness constraint was violated (400 under the current policy).
    #[error("conflict: {0}")]
    Conflict(String),
    /// A store or network failure; the detail is logged, never returned (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The canonical 401 with the generic message.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::Unauthorized(messages::UNAUTHORIZED.to_string())
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client.
    #[must_use]
    pub fn client_message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Unauthorized(message)
            | Self::NotFound(message)
            | Self::MethodNotAllowed(message)
            | Self::Conflict(message) => message,
            Self::Internal(_) => messages::SOMETHING_WENT_WRONG,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!("internal error: {detail}");
        }
        let body = Envelope::<()>::error(self.client_message());
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("email required".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::unauthorized().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("record not found".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("email already exist".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::MethodNotAllowed("method not allowed".to_string()).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Internal("db down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let error = ApiError::Internal("connection refused to 10.0.0.7:5432".to_string());
        assert_eq!(error.client_message(), "something went wrong");
    }

    #[test]
    fn test_domain_messages_are_verbatim() {
        let error = ApiError::Conflict("email already exist".to_string());
        assert_eq!(error.client_message(), "email already exist");
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = ApiError::NotFound("record not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
