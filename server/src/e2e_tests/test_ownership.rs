//! Test that callers only see and change their own todos.

use crate::e2e_tests::helpers::TestServices;

#[tokio::test]
async fn test_other_principal_cannot_read_or_update() {
    let services = TestServices::start().await;
    let (_, alice) = services.signed_up("alice").await;
    let (_, bob) = services.signed_up("bob").await;

    let created = services.create_todo(&alice, "alice's secret").await;
    let id = created.data()["id"].as_str().expect("id").to_string();

    let read = services.get_todo(&bob, &id).await;
    assert_eq!(read.status, 401);
    assert_eq!(read.message(), "unauthorized");

    let patched = services.patch_todo(&bob, &id, "bob was here").await;
    assert_eq!(patched.status, 401);

    let still = services.get_todo(&alice, &id).await;
    assert_eq!(still.status, 200);
    assert_eq!(still.data()["text"], "alice's secret");
}

#[tokio::test]
async fn test_list_is_scoped_to_caller() {
    let services = TestServices::start().await;
    let (alice_id, alice) = services.signed_up("alice").await;
    let (_, bob) = services.signed_up("bob").await;

    services.create_todo(&alice, "a1").await;
    services.create_todo(&alice, "a2").await;

    let alice_list = services.list_todos(&alice).await;
    assert_eq!(alice_list.status, 200);
    assert_eq!(alice_list.message(), "todos retrieved");
    let todos = alice_list.data().as_array().expect("array");
    assert_eq!(todos.len(), 2);
    assert!(todos.iter().all(|todo| todo["user_id"] == serde_json::json!(alice_id)));
    assert_eq!(todos[0]["text"], "a1");
    assert_eq!(todos[1]["text"], "a2");

    let bob_list = services.list_todos(&bob).await;
    assert_eq!(bob_list.status, 200);
    assert_eq!(bob_list.data(), &serde_json::json!([]));
}
