//! Test updating a todo.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::e2e_tests::helpers::TestServices;

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp string")
        .parse()
        .expect("RFC 3339 timestamp")
}

#[tokio::test]
async fn test_patch_replaces_text() {
    let services = TestServices::start().await;
    let (alice_id, token) = services.signed_up("alice").await;
    let created = services.create_todo(&token, "buy milk").await;
    let id = created.data()["id"].as_str().expect("id").to_string();

    let updated = services.patch_todo(&token, &id, "buy oat milk").await;

    assert_eq!(updated.status, 200);
    assert_eq!(updated.message(), "todo updated");
    let data = updated.data();
    assert_eq!(data["id"], json!(id));
    assert_eq!(data["user_id"], json!(alice_id));
    assert_eq!(data["text"], "buy oat milk");
    assert_eq!(data["created_at"], created.data()["created_at"]);
    assert!(timestamp(&data["updated_at"]) >= timestamp(&created.data()["updated_at"]));

    let read = services.get_todo(&token, &id).await;
    assert_eq!(read.data(), data);
}

#[tokio::test]
async fn test_create_and_patch_require_text() {
    let services = TestServices::start().await;
    let (_, token) = services.signed_up("alice").await;

    let created = services.create_todo(&token, "").await;
    assert_eq!(created.status, 400);
    assert_eq!(created.message(), "text required");

    let todo = services.create_todo(&token, "keep").await;
    let id = todo.data()["id"].as_str().expect("id").to_string();

    let patched = services.patch_todo(&token, &id, "").await;
    assert_eq!(patched.status, 400);
    assert_eq!(patched.message(), "text required");

    let garbled = services
        .send(
            services
                .http
                .patch(format!("{}/todos/{id}", services.todos_url))
                .bearer_auth(&token)
                .header("Content-Type", "application/json")
                .body("{text"),
        )
        .await;
    assert_eq!(garbled.status, 400);
    assert_eq!(garbled.message(), "Invalid JSON");

    assert_eq!(services.get_todo(&token, &id).await.data()["text"], "keep");
}
