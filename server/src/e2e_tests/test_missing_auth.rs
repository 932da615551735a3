//! Test that unauthenticated requests are refused before touching the store.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use crate::e2e_tests::helpers::{TestServices, spawn, todo_config};
use crate::server::todo_app;
use crate::store::StoreError;
use crate::todos::{InMemoryTodoStore, Todo, TodoStore};
use crate::types::{TodoId, UserId};
use crate::verification::{RemoteVerifier, StaticVerifier};

/// Counts every store call.
struct CountingStore {
    inner: InMemoryTodoStore,
    calls: Arc<AtomicUsize>,
}

impl CountingStore {
    fn bump(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl TodoStore for CountingStore {
    fn insert(&self, todo: Todo) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.bump();
        self.inner.insert(todo)
    }

    fn get(&self, id: TodoId) -> impl Future<Output = Result<Option<Todo>, StoreError>> + Send {
        self.bump();
        self.inner.get(id)
    }

    fn list_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Todo>, StoreError>> + Send {
        self.bump();
        self.inner.list_by_owner(owner)
    }

    fn update(&self, todo: Todo) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.bump();
        self.inner.update(todo)
    }
}

#[tokio::test]
async fn test_unauthenticated_requests_never_reach_store() {
    let calls = Arc::new(AtomicUsize::new(0));
    let store = CountingStore {
        inner: InMemoryTodoStore::new(),
        calls: Arc::clone(&calls),
    };
    let services = TestServices::start_with(StaticVerifier::new(), store).await;
    let base = &services.todos_url;
    let id = TodoId::new_random();

    let requests = [
        services.http.get(format!("{base}/todos")),
        services.http.post(format!("{base}/todos")).json(&json!({ "text": "x" })),
        services.http.get(format!("{base}/todos/{id}")),
        services.http.patch(format!("{base}/todos/{id}")).json(&json!({ "text": "x" })),
        services
            .http
            .get(format!("{base}/todos"))
            .header("Authorization", "Bearer unknown"),
    ];
    for request in requests {
        let reply = services.send(request).await;
        assert_eq!(reply.status, 401);
        assert_eq!(reply.body["status"], "error");
        assert_eq!(reply.message(), "unauthorized");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_identity_service_is_unauthorized() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let dead = format!("http://{}", listener.local_addr().expect("local addr"));
    drop(listener);

    let config = todo_config(&dead);
    let verifier = RemoteVerifier::new(&dead, config.verify_timeout).expect("client");
    let todos_url = spawn(todo_app(verifier, InMemoryTodoStore::new(), &config)).await;

    let reply = reqwest::Client::new()
        .get(format!("{todos_url}/todos"))
        .bearer_auth("anything")
        .send()
        .await
        .expect("request sent");

    assert_eq!(reply.status().as_u16(), 401);
}
