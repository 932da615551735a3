//! Credential verification across the service boundary.
//!
//! The todo service depends only on `CredentialVerifier`. `RemoteVerifier`
//! asks the identity service over HTTP; `StaticVerifier` answers from a fixed
//! table and is used in tests.
//!
//! # Invariants
//! - Fail-closed: a rejected credential, a non-2xx status, a transport error,
//!   a timeout and an undecodable body all yield an error. No failure is ever
//!   reported as a verified subject.
//! - One outbound call per verification; dropping the returned future aborts
//!   the call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::http::header::AUTHORIZATION;

use crate::auth::parse_bearer;
use crate::http::Envelope;
use crate::identity::routes::AuthResponse;

/// Path of the verification endpoint on the identity service.
pub const VERIFY_PATH: &str = "/users/auth";

/// Default upper bound for one verification call.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a credential could not be verified.
///
/// Callers treat every variant as "unauthorized"; the variants exist for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("credential rejected with status {0}")]
    Rejected(u16),
    #[error("verification request failed: {0}")]
    Transport(String),
    #[error("undecodable verification response: {0}")]
    Decode(String),
    #[error("verification response carries no subject")]
    MissingSubject,
    #[error("unknown credential")]
    Unknown,
}

/// Turns a raw `Authorization` header value into a verified subject.
pub trait CredentialVerifier: Send + Sync + 'static {
    fn verify_user(
        &self,
        bearer_header: &str,
    ) -> impl Future<Output = Result<String, VerifyError>> + Send;
}

/// Verifies credentials by calling the identity service.
#[derive(Debug, Clone)]
pub struct RemoteVerifier {
    client: reqwest::Client,
    verify_url: String,
}

impl RemoteVerifier {
    /// Build a verifier for the identity service at `base_url`.
    ///
    /// # Errors
    /// Returns `VerifyError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            verify_url: format!("{}{VERIFY_PATH}", base_url.trim_end_matches('/')),
        })
    }

    async fn call(&self, bearer_header: &str) -> Result<String, VerifyError> {
        let response = self
            .client
            .get(&self.verify_url)
            .header(AUTHORIZATION, bearer_header)
            .send()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Rejected(status.as_u16()));
        }

        let envelope: Envelope<AuthResponse> = response
            .json()
            .await
            .map_err(|e| VerifyError::Decode(e.to_string()))?;

        match envelope.data {
            Some(AuthResponse { user_id }) if !user_id.is_empty() => Ok(user_id),
            _ => Err(VerifyError::MissingSubject),
        }
    }
}

impl CredentialVerifier for RemoteVerifier {
    fn verify_user(
        &self,
        bearer_header: &str,
    ) -> impl Future<Output = Result<String, VerifyError>> + Send {
        async move {
            let result = self.call(bearer_header).await;
            if let Err(e) = &result {
                tracing::debug!("remote verification failed: {e}");
            }
            result
        }
    }
}

/// Verifies credentials against a fixed token-to-subject table.
#[derive(Debug, Default)]
pub struct StaticVerifier {
    subjects: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `Bearer {token}` as `subject`.
    #[must_use]
    pub fn with(mut self, token: &str, subject: &str) -> Self {
        self.subjects.insert(token.to_string(), subject.to_string());
        self
    }

    /// How many times `verify_user` has been called.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, bearer_header: &str) -> Result<String, VerifyError> {
        let token = parse_bearer(bearer_header).map_err(|_| VerifyError::Unknown)?;
        self.subjects
            .get(token)
            .cloned()
            .ok_or(VerifyError::Unknown)
    }
}

impl CredentialVerifier for StaticVerifier {
    fn verify_user(
        &self,
        bearer_header: &str,
    ) -> impl Future<Output = Result<String, VerifyError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(self.lookup(bearer_header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        routing::get,
    };

    /// Serve a fake identity service and return its base URL.
    async fn fake_identity(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{addr}")
    }

    fn verifier(base_url: &str) -> RemoteVerifier {
        RemoteVerifier::new(base_url, Duration::from_secs(2)).expect("client")
    }

    #[tokio::test]
    async fn test_remote_returns_subject_and_forwards_header() {
        let app = Router::new().route(
            VERIFY_PATH,
            get(|headers: HeaderMap| async move {
                let header = headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if header == "Bearer good" {
                    (
                        StatusCode::OK,
                        Json(Envelope::ok(
                            "success",
                            AuthResponse {
                                user_id: "subject-1".to_string(),
                            },
                        )),
                    )
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(Envelope::<AuthResponse>::error("unauthorized")),
                    )
                }
            }),
        );
        let base = fake_identity(app).await;
        let verifier = verifier(&format!("{base}/"));

        assert_eq!(
            verifier.verify_user("Bearer good").await,
            Ok("subject-1".to_string())
        );
        assert_eq!(
            verifier.verify_user("Bearer bad").await,
            Err(VerifyError::Rejected(401))
        );
    }

    #[tokio::test]
    async fn test_any_non_success_status_is_rejected() {
        let app = Router::new().route(
            VERIFY_PATH,
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = fake_identity(app).await;

        assert_eq!(
            verifier(&base).verify_user("Bearer good").await,
            Err(VerifyError::Rejected(500))
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_is_rejected() {
        let app = Router::new().route(VERIFY_PATH, get(|| async { "not json" }));
        let base = fake_identity(app).await;

        assert!(matches!(
            verifier(&base).verify_user("Bearer good").await,
            Err(VerifyError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_success_without_subject_is_rejected() {
        let app = Router::new().route(
            VERIFY_PATH,
            get(|| async {
                Json(serde_json::json!({ "status": "ok", "message": "success" }))
            }),
        );
        let base = fake_identity(app).await;

        assert_eq!(
            verifier(&base).verify_user("Bearer good").await,
            Err(VerifyError::MissingSubject)
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_rejected() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        assert!(matches!(
            verifier(&format!("http://{addr}"))
                .verify_user("Bearer good")
                .await,
            Err(VerifyError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let app = Router::new().route(
            VERIFY_PATH,
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "late"
            }),
        );
        let base = fake_identity(app).await;
        let verifier = RemoteVerifier::new(&base, Duration::from_millis(200)).expect("client");

        assert!(matches!(
            verifier.verify_user("Bearer good").await,
            Err(VerifyError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_static_verifier() {
        let verifier = StaticVerifier::new().with("t1", "subject-1");

        assert_eq!(
            verifier.verify_user("Bearer t1").await,
            Ok("subject-1".to_string())
        );
        assert_eq!(
            verifier.verify_user("Bearer t2").await,
            Err(VerifyError::Unknown)
        );
        assert_eq!(verifier.verify_user("t1").await, Err(VerifyError::Unknown));
        assert_eq!(verifier.calls(), 3);
    }
}
