//! Test resolution of the path id.

use crate::e2e_tests::helpers::TestServices;
use crate::types::TodoId;

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let services = TestServices::start().await;
    let (_, token) = services.signed_up("alice").await;

    let read = services.get_todo(&token, "abc").await;
    assert_eq!(read.status, 400);
    assert_eq!(read.message(), "invalid todo id");

    let patched = services.patch_todo(&token, "abc", "x").await;
    assert_eq!(patched.status, 400);
    assert_eq!(patched.message(), "invalid todo id");
}

#[tokio::test]
async fn test_absent_id_is_not_found() {
    let services = TestServices::start().await;
    let (_, token) = services.signed_up("alice").await;
    let ghost = TodoId::new_random().to_string();

    let read = services.get_todo(&token, &ghost).await;
    assert_eq!(read.status, 404);
    assert_eq!(read.message(), "record not found");

    let patched = services.patch_todo(&token, &ghost, "x").await;
    assert_eq!(patched.status, 404);
}

#[tokio::test]
async fn test_authentication_precedes_id_resolution() {
    let services = TestServices::start().await;

    let reply = services
        .send(services.http.get(format!("{}/todos/abc", services.todos_url)))
        .await;

    assert_eq!(reply.status, 401);
}
