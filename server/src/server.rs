//! Application assembly for both services.
//!
//! Builds the routers with their state and tracing layer, and serves them on a
//! bound listener. The binaries and the end-to-end tests share this code.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{IdentityConfig, TodoConfig};
use crate::identity::{self, CredentialStore, IdentityService, InMemoryCredentialStore};
use crate::todos::{self, InMemoryTodoStore, TodoService, TodoState, TodoStore};
use crate::verification::{CredentialVerifier, RemoteVerifier, VerifyError};

/// Error returned when a service cannot start or stops serving.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build verification client: {0}")]
    Verifier(#[from] VerifyError),
}

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`; defaults to debug logs for this crate and for HTTP traces.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// The identity service router over `store`.
pub fn identity_app<S: CredentialStore>(store: S, config: &IdentityConfig) -> Router {
    let service = IdentityService::new(store, config.secret.clone(), config.store_timeout);
    identity::routes(Arc::new(service)).layer(TraceLayer::new_for_http())
}

/// The todo service router over `verifier` and `store`.
pub fn todo_app<V, S>(verifier: V, store: S, config: &TodoConfig) -> Router
where
    V: CredentialVerifier,
    S: TodoStore,
{
    let state = TodoState {
        verifier: Arc::new(verifier),
        service: Arc::new(TodoService::new(store, config.store_timeout)),
    };
    todos::routes(state).layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener` until the process stops.
///
/// # Errors
/// Returns `ServeError::Io` if the server fails.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServeError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on {addr}");
    }
    axum::serve(listener, app).await?;
    Ok(())
}

async fn bind(port: u16) -> Result<TcpListener, ServeError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })
}

/// Run the identity service with an in-memory credential store.
///
/// # Errors
/// Returns `ServeError` if the port cannot be bound or the server fails.
pub async fn run_identity(config: IdentityConfig) -> Result<(), ServeError> {
    let listener = bind(config.listen_port).await?;
    serve(listener, identity_app(InMemoryCredentialStore::new(), &config)).await
}

/// Run the todo service, verifying callers against the configured identity
/// service.
///
/// # Errors
/// Returns `ServeError` if the client cannot be built, the port cannot be
/// bound or the server fails.
pub async fn run_todos(config: TodoConfig) -> Result<(), ServeError> {
    let verifier = RemoteVerifier::new(&config.users_base_url, config.verify_timeout)?;
    tracing::info!("verifying callers against {}", config.users_base_url);

    let listener = bind(config.listen_port).await?;
    serve(
        listener,
        todo_app(verifier, InMemoryTodoStore::new(), &config),
    )
    .await
}
