//! Test that framework-level rejections still use the response envelope.

use crate::e2e_tests::helpers::TestServices;

#[tokio::test]
async fn test_undecodable_todo_id_is_enveloped() {
    let services = TestServices::start().await;
    let (_, token) = services.signed_up("alice").await;

    let read = services.get_todo(&token, "%FF").await;
    assert_eq!(read.status, 400);
    assert_eq!(read.body["status"], "error");
    assert_eq!(read.message(), "invalid todo id");

    let patched = services.patch_todo(&token, "%FF", "x").await;
    assert_eq!(patched.status, 400);
    assert_eq!(patched.message(), "invalid todo id");
}

#[tokio::test]
async fn test_unknown_route_is_enveloped() {
    let services = TestServices::start().await;

    for base in [&services.identity_url, &services.todos_url] {
        let reply = services
            .send(services.http.get(format!("{base}/no/such/route")))
            .await;
        assert_eq!(reply.status, 404, "{base}");
        assert_eq!(reply.body["status"], "error");
        assert_eq!(reply.message(), "route not found");
    }
}

#[tokio::test]
async fn test_wrong_method_is_enveloped() {
    let services = TestServices::start().await;

    let requests = [
        services.http.get(format!("{}/users", services.identity_url)),
        services.http.delete(format!("{}/users/auth", services.identity_url)),
        services.http.delete(format!("{}/todos", services.todos_url)),
        services.http.put(format!("{}/todos/abc", services.todos_url)),
    ];
    for request in requests {
        let reply = services.send(request).await;
        assert_eq!(reply.status, 405);
        assert_eq!(reply.body["status"], "error");
        assert_eq!(reply.message(), "method not allowed");
    }
}
