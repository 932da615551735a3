//! Test registration and email uniqueness.

use serde_json::json;

use crate::e2e_tests::helpers::{PASSWORD, TestServices, unique_email};

#[tokio::test]
async fn test_register_returns_public_view() {
    let services = TestServices::start().await;
    let email = unique_email("alice");

    let reply = services.register(&email, PASSWORD).await;

    assert_eq!(reply.status, 201);
    assert_eq!(reply.body["status"], "ok");
    assert_eq!(reply.message(), "user created successfully");
    let data = reply.data();
    assert_eq!(data["email"], json!(email));
    assert_eq!(data["first_name"], "Test");
    assert_eq!(data["last_name"], "User");
    assert!(data["id"].as_str().is_some_and(|id| id.parse::<uuid::Uuid>().is_ok()));
    assert!(data.get("password").is_none());
    assert!(data.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_same_email_twice() {
    let services = TestServices::start().await;
    let email = unique_email("alice");

    let first = services.register(&email, PASSWORD).await;
    let second = services.register(&email, "another").await;

    assert_eq!(first.status, 201);
    assert_eq!(second.status, 400);
    assert_eq!(second.body["status"], "error");
    assert_eq!(second.message(), "email already exist");
    assert!(services.login(&email, PASSWORD).await.status == 200);
}

#[tokio::test]
async fn test_register_email_is_case_sensitive() {
    let services = TestServices::start().await;
    let suffix = rand::random::<u32>();

    let lower = services.register(&format!("bob{suffix}@x.com"), PASSWORD).await;
    let upper = services.register(&format!("BOB{suffix}@x.com"), PASSWORD).await;

    assert_eq!(lower.status, 201);
    assert_eq!(upper.status, 201);
    assert_ne!(lower.data()["id"], upper.data()["id"]);
}

#[tokio::test]
async fn test_register_validation() {
    let services = TestServices::start().await;
    let url = format!("{}/users", services.identity_url);

    let cases = [
        (json!({}), "email required"),
        (json!({ "email": "a@x.com" }), "password required"),
        (json!({ "email": "a@x.com", "password": "pw" }), "first_name required"),
        (
            json!({ "email": "a@x.com", "password": "pw", "first_name": "A", "last_name": "" }),
            "last_name required",
        ),
    ];
    for (body, expected) in cases {
        let reply = services.send(services.http.post(&url).json(&body)).await;
        assert_eq!(reply.status, 400, "{body}");
        assert_eq!(reply.message(), expected);
    }

    let reply = services
        .send(
            services
                .http
                .post(&url)
                .header("Content-Type", "application/json")
                .body("{not json"),
        )
        .await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.message(), "Invalid JSON");
}
