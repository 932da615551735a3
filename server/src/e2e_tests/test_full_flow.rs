//! Test the full register, login, verify, create, isolate flow.

use serde_json::json;

use crate::e2e_tests::helpers::{TestServices, unique_email};

#[tokio::test]
async fn test_full_flow() {
    let services = TestServices::start().await;
    let alice_email = unique_email("alice");

    let registered = services.register(&alice_email, "pw1").await;
    assert_eq!(registered.status, 201);
    let alice_id = registered.data()["id"].as_str().expect("id").to_string();

    let logged_in = services.login(&alice_email, "pw1").await;
    assert_eq!(logged_in.status, 200);
    let token = logged_in.data()["access_token"]
        .as_str()
        .expect("token")
        .to_string();

    let verified = services.auth(Some(&format!("Bearer {token}"))).await;
    assert_eq!(verified.status, 200);
    assert_eq!(verified.data(), &json!({ "user_id": alice_id }));

    let created = services.create_todo(&token, "buy milk").await;
    assert_eq!(created.status, 200);
    assert_eq!(created.message(), "todo created");
    assert_eq!(created.data()["user_id"], json!(alice_id));
    assert_eq!(created.data()["text"], "buy milk");
    let todo_id = created.data()["id"].as_str().expect("id").to_string();

    let own = services.get_todo(&token, &todo_id).await;
    assert_eq!(own.status, 200);
    assert_eq!(own.message(), "todo retrieved");
    assert_eq!(own.data(), created.data());

    let (_, bob_token) = services.signed_up("bob").await;
    let foreign = services.get_todo(&bob_token, &todo_id).await;
    assert_eq!(foreign.status, 401);
}

#[tokio::test]
async fn test_owner_is_never_taken_from_body() {
    let services = TestServices::start().await;
    let (alice_id, alice) = services.signed_up("alice").await;
    let (bob_id, _) = services.signed_up("bob").await;

    let reply = services
        .send(
            services
                .http
                .post(format!("{}/todos", services.todos_url))
                .bearer_auth(&alice)
                .json(&json!({ "text": "mine", "user_id": bob_id })),
        )
        .await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.data()["user_id"], json!(alice_id));
}
