use chrono::Duration;
use morning_call::{CancellationToken, DomainError, ErrorKind, MorningCall, MorningCallId, MorningCallUpdate};

use crate::support::{Harness, t0};

fn assert_cancelled<T: std::fmt::Debug>(result: Result<T, DomainError>) {
    let err = result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert_eq!(err.status_code(), 499);
}

#[tokio::test]
async fn cancelled_operations_leave_state_untouched() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let carol = h.register("carol").await;
    h.befriend(&alice, &bob).await;
    h.app.users.apply_friend(&h.cancel, &carol.id, &alice.id).await.unwrap();
    let call = h.schedule(&alice, &bob, 2).await.unwrap();

    let before_alice = h.app.users.get_user(&h.cancel, &alice.id).await.unwrap();
    let before_relationships = h.relationship_count().await;

    let gone = CancellationToken::new();
    gone.cancel();
    let users = &h.app.users;
    let calls = &h.app.morning_calls;

    assert_cancelled(users.register(&gone, "dave", "dave@example.com").await);
    assert_cancelled(users.login(&gone, "alice@example.com").await);
    assert_cancelled(users.get_user(&gone, &alice.id).await);
    assert_cancelled(users.list_friends(&gone, &alice.id).await);
    assert_cancelled(users.apply_friend(&gone, &bob.id, &carol.id).await);
    assert_cancelled(users.react_friend_apply(&gone, &alice.id, &carol.id, true).await);
    assert_cancelled(users.block_friend(&gone, &alice.id, &bob.id).await);
    assert_cancelled(users.unblock_friend(&gone, &alice.id, &bob.id).await);

    let when = t0() + Duration::hours(4);
    let draft = MorningCall::new(MorningCallId::new("mc-x"), alice.id.clone(), bob.id.clone(), when, "hi");
    assert_cancelled(calls.save_friend_morning_call(&gone, &alice.id, &bob.id, draft).await);
    assert_cancelled(calls.schedule_morning_call(&gone, &alice.id, &bob.id, when, "hi").await);
    assert_cancelled(calls.get_friend_morning_call(&gone, &alice.id, &bob.id, &call.id).await);
    assert_cancelled(calls.list_morning_calls(&gone, &alice.id).await);
    assert_cancelled(
        calls
            .update_morning_call(&gone, &alice.id, MorningCallUpdate::new(call.id.clone()).message("x"))
            .await,
    );
    assert_cancelled(calls.delete_morning_call(&gone, &alice.id, &call.id).await);
    h.clock.advance(Duration::hours(3));
    assert_cancelled(calls.complete_morning_call(&gone, &call.id).await);

    assert!(h.app.users.login(&h.cancel, "dave@example.com").await.is_err());
    assert_eq!(h.relationship_count().await, before_relationships);
    let after_alice = h.app.users.get_user(&h.cancel, &alice.id).await.unwrap();
    assert_eq!(after_alice, before_alice);
    assert_eq!(h.repos.morning_calls.find_by_id(&h.cancel, &call.id).await.unwrap(), call);
}

#[tokio::test]
async fn repositories_refuse_a_cancelled_token() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let gone = CancellationToken::new();
    gone.cancel();

    assert!(h.repos.users.find_by_id(&gone, &alice.id).await.is_err());
    assert!(h.repos.relationships.count(&gone).await.is_err());
    assert!(h.repos.morning_calls.list_by_sender_id(&gone, &alice.id).await.is_err());
}
