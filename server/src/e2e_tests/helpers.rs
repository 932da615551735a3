//! Common helpers for end-to-end tests.

use std::time::Duration;

use axum::Router;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::auth::SigningSecret;
use crate::config::{IdentityConfig, TodoConfig};
use crate::identity::InMemoryCredentialStore;
use crate::server::{identity_app, todo_app};
use crate::todos::{InMemoryTodoStore, TodoStore};
use crate::verification::{CredentialVerifier, RemoteVerifier};

pub const TEST_SECRET: &str = "e2e-test-secret";
pub const PASSWORD: &str = "pw1";

/// Status and decoded body of a response.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

pub fn identity_config() -> IdentityConfig {
    IdentityConfig {
        secret: SigningSecret::new(TEST_SECRET).expect("valid secret"),
        listen_port: 0,
        store_timeout: Duration::from_secs(5),
    }
}

pub fn todo_config(users_base_url: &str) -> TodoConfig {
    TodoConfig {
        users_base_url: users_base_url.to_string(),
        listen_port: 0,
        verify_timeout: Duration::from_secs(5),
        store_timeout: Duration::from_secs(5),
    }
}

/// An email no other test uses.
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@x.com", rand::random::<u64>())
}

/// Both services, wired together over HTTP.
pub struct TestServices {
    pub identity_url: String,
    pub todos_url: String,
    pub http: reqwest::Client,
}

impl TestServices {
    pub async fn start() -> Self {
        let identity_url = spawn(identity_app(
            InMemoryCredentialStore::new(),
            &identity_config(),
        ))
        .await;

        let config = todo_config(&identity_url);
        let verifier =
            RemoteVerifier::new(&config.users_base_url, config.verify_timeout).expect("client");
        let todos_url = spawn(todo_app(verifier, InMemoryTodoStore::new(), &config)).await;

        Self {
            identity_url,
            todos_url,
            http: reqwest::Client::new(),
        }
    }

    /// A todo service over custom collaborators, next to a fresh identity service.
    pub async fn start_with<V, S>(verifier: V, store: S) -> Self
    where
        V: CredentialVerifier,
        S: TodoStore,
    {
        let identity_url = spawn(identity_app(
            InMemoryCredentialStore::new(),
            &identity_config(),
        ))
        .await;
        let todos_url = spawn(todo_app(verifier, store, &todo_config(&identity_url))).await;

        Self {
            identity_url,
            todos_url,
            http: reqwest::Client::new(),
        }
    }

    pub async fn send(&self, request: reqwest::RequestBuilder) -> Reply {
        let response = request.send().await.expect("request sent");
        let status = response.status().as_u16();
        let text = response.text().await.expect("body read");
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Reply { status, body }
    }

    pub async fn register(&self, email: &str, password: &str) -> Reply {
        self.send(self.http.post(format!("{}/users", self.identity_url)).json(&json!({
            "email": email,
            "first_name": "Test",
            "last_name": "User",
            "password": password,
        })))
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Reply {
        self.send(
            self.http
                .post(format!("{}/users/login", self.identity_url))
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn auth(&self, authorization: Option<&str>) -> Reply {
        let mut request = self.http.get(format!("{}/users/auth", self.identity_url));
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }
        self.send(request).await
    }

    /// Register a fresh principal and log in. Returns `(user_id, token)`.
    pub async fn signed_up(&self, prefix: &str) -> (String, String) {
        let email = unique_email(prefix);
        let registered = self.register(&email, PASSWORD).await;
        assert_eq!(registered.status, 201, "{:?}", registered.body);
        let user_id = registered.data()["id"].as_str().expect("id").to_string();

        let logged_in = self.login(&email, PASSWORD).await;
        assert_eq!(logged_in.status, 200, "{:?}", logged_in.body);
        let token = logged_in.data()["access_token"]
            .as_str()
            .expect("access_token")
            .to_string();
        (user_id, token)
    }

    pub async fn create_todo(&self, token: &str, text: &str) -> Reply {
        self.send(
            self.http
                .post(format!("{}/todos", self.todos_url))
                .bearer_auth(token)
                .json(&json!({ "text": text })),
        )
        .await
    }

    pub async fn list_todos(&self, token: &str) -> Reply {
        self.send(
            self.http
                .get(format!("{}/todos", self.todos_url))
                .bearer_auth(token),
        )
        .await
    }

    pub async fn get_todo(&self, token: &str, id: &str) -> Reply {
        self.send(
            self.http
                .get(format!("{}/todos/{id}", self.todos_url))
                .bearer_auth(token),
        )
        .await
    }

    pub async fn patch_todo(&self, token: &str, id: &str, text: &str) -> Reply {
        self.send(
            self.http
                .patch(format!("{}/todos/{id}", self.todos_url))
                .bearer_auth(token)
                .json(&json!({ "text": text })),
        )
        .await
    }
}
