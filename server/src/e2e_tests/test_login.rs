//! Test login outcomes.

use serde_json::json;

use crate::e2e_tests::helpers::{PASSWORD, TestServices, unique_email};

#[tokio::test]
async fn test_login_issues_token() {
    let services = TestServices::start().await;
    let email = unique_email("alice");
    services.register(&email, PASSWORD).await;

    let reply = services.login(&email, PASSWORD).await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.message(), "user logged in successfully");
    let token = reply.data()["access_token"].as_str().expect("token");
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let services = TestServices::start().await;

    let reply = services.login(&unique_email("nobody"), PASSWORD).await;

    assert_eq!(reply.status, 400);
    assert_eq!(reply.message(), "user not found");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let services = TestServices::start().await;
    let email = unique_email("alice");
    services.register(&email, PASSWORD).await;

    let reply = services.login(&email, "pw2").await;

    assert_eq!(reply.status, 400);
    assert_eq!(reply.message(), "incorrect credentials");
    assert!(reply.data().is_null());
}

#[tokio::test]
async fn test_login_validation() {
    let services = TestServices::start().await;
    let url = format!("{}/users/login", services.identity_url);

    let reply = services.send(services.http.post(&url).json(&json!({}))).await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.message(), "email required");

    let reply = services
        .send(services.http.post(&url).json(&json!({ "email": "a@x.com" })))
        .await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.message(), "password required");
}
