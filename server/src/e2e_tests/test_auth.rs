//! Test bearer verification on the identity service.

use chrono::Utc;

use crate::auth::{SigningSecret, token};
use crate::e2e_tests::helpers::{TEST_SECRET, TestServices};

#[tokio::test]
async fn test_auth_returns_subject() {
    let services = TestServices::start().await;
    let (user_id, token) = services.signed_up("alice").await;

    let reply = services.auth(Some(&format!("Bearer {token}"))).await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.message(), "success");
    assert_eq!(reply.data()["user_id"], serde_json::json!(user_id));
}

#[tokio::test]
async fn test_auth_rejects_bad_headers() {
    let services = TestServices::start().await;
    let (_, token) = services.signed_up("alice").await;

    let headers = [
        None,
        Some(String::new()),
        Some("Bearer ".to_string()),
        Some(format!("bearer {token}")),
        Some(format!("Bearer  {token}")),
        Some(token.clone()),
        Some("Bearer not.a.token".to_string()),
    ];
    for header in headers {
        let reply = services.auth(header.as_deref()).await;
        assert_eq!(reply.status, 401, "{header:?}");
        assert_eq!(reply.message(), "unauthorized");
    }
}

#[tokio::test]
async fn test_auth_rejects_foreign_and_expired_tokens() {
    let services = TestServices::start().await;

    let foreign_secret = SigningSecret::new("some-other-secret").expect("valid secret");
    let foreign = token::issue("someone", &foreign_secret, Utc::now()).expect("issued");
    let reply = services.auth(Some(&format!("Bearer {foreign}"))).await;
    assert_eq!(reply.status, 401);

    let secret = SigningSecret::new(TEST_SECRET).expect("valid secret");
    let stale = token::issue("someone", &secret, Utc::now() - chrono::TimeDelta::hours(2))
        .expect("issued");
    let reply = services.auth(Some(&format!("Bearer {stale}"))).await;
    assert_eq!(reply.status, 401);
}
