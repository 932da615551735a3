//! Test that concurrent registrations of one email admit exactly one principal.

use futures::future::join_all;

use crate::e2e_tests::helpers::{TestServices, unique_email};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_registration() {
    let services = TestServices::start().await;
    let email = unique_email("race");
    let passwords: Vec<String> = (0..8).map(|i| format!("pw-{i}")).collect();

    let replies = join_all(
        passwords
            .iter()
            .map(|password| services.register(&email, password)),
    )
    .await;

    let winners: Vec<usize> = replies
        .iter()
        .enumerate()
        .filter(|(_, reply)| reply.status == 201)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(winners.len(), 1, "exactly one registration must succeed");
    for reply in replies.iter().filter(|reply| reply.status != 201) {
        assert_eq!(reply.status, 400);
        assert_eq!(reply.message(), "email already exist");
    }

    // Only the winner's password was stored.
    let winner = winners[0];
    for (i, password) in passwords.iter().enumerate() {
        let expected = if i == winner { 200 } else { 400 };
        assert_eq!(services.login(&email, password).await.status, expected);
    }
}
