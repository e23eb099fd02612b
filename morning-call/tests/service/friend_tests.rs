use morning_call::{ErrorKind, RelatedUserStatus, RelationshipStatus};

use crate::support::{Harness, assert_rejected};

#[tokio::test]
async fn apply_shows_pending_to_both_sides() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;

    let rel = h.app.users.apply_friend(&h.cancel, &alice.id, &bob.id).await.unwrap();
    assert_eq!(rel.status(), RelationshipStatus::Pending);
    assert_eq!(rel.requester_id(), &alice.id);

    assert_eq!(h.view(&alice, &bob).await, Some(RelatedUserStatus::Pending));
    assert_eq!(h.view(&bob, &alice).await, Some(RelatedUserStatus::Pending));
}

#[tokio::test]
async fn approval_makes_friends_both_ways() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.befriend(&alice, &bob).await;

    let alice_friends = h.app.users.list_friends(&h.cancel, &alice.id).await.unwrap();
    let bob_friends = h.app.users.list_friends(&h.cancel, &bob.id).await.unwrap();
    assert_eq!(alice_friends.len(), 1);
    assert_eq!(alice_friends[0].id, bob.id);
    assert_eq!(bob_friends[0].id, alice.id);
    assert_eq!(h.relationship_count().await, 1);
}

#[tokio::test]
async fn requester_cannot_approve_own_request() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.app.users.apply_friend(&h.cancel, &alice.id, &bob.id).await.unwrap();

    let err = h.app.users.react_friend_apply(&h.cancel, &alice.id, &bob.id, true).await.unwrap_err();
    assert_rejected(&err, "not_receiver", 403);
    assert_eq!(h.view(&bob, &alice).await, Some(RelatedUserStatus::Pending));
}

#[tokio::test]
async fn reacting_without_request_is_not_found() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;

    let err = h.app.users.react_friend_apply(&h.cancel, &bob.id, &alice.id, true).await.unwrap_err();
    assert_rejected(&err, "user_not_found", 404);
}

#[tokio::test]
async fn duplicate_requests_conflict() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.app.users.apply_friend(&h.cancel, &alice.id, &bob.id).await.unwrap();

    let again = h.app.users.apply_friend(&h.cancel, &alice.id, &bob.id).await.unwrap_err();
    assert_rejected(&again, "already_requested", 409);
    let reverse = h.app.users.apply_friend(&h.cancel, &bob.id, &alice.id).await.unwrap_err();
    assert_rejected(&reverse, "already_requested", 409);

    h.app.users.react_friend_apply(&h.cancel, &bob.id, &alice.id, true).await.unwrap();
    let friends = h.app.users.apply_friend(&h.cancel, &alice.id, &bob.id).await.unwrap_err();
    assert_rejected(&friends, "already_friend", 409);
    assert_eq!(h.relationship_count().await, 1);
}

#[tokio::test]
async fn self_operations_are_bad_requests() {
    let h = Harness::new();
    let alice = h.register("alice").await;

    let apply = h.app.users.apply_friend(&h.cancel, &alice.id, &alice.id).await.unwrap_err();
    assert_rejected(&apply, "self_operation", 400);
    let block = h.app.users.block_friend(&h.cancel, &alice.id, &alice.id).await.unwrap_err();
    assert_rejected(&block, "self_operation", 400);
}

#[tokio::test]
async fn applying_to_unknown_user_is_not_found() {
    let h = Harness::new();
    let alice = h.register("alice").await;

    let err = h
        .app
        .users
        .apply_friend(&h.cancel, &alice.id, &crate::support::user_id("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(h.relationship_count().await, 0);
}

#[tokio::test]
async fn rejected_request_can_be_reopened_by_either_side() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let original = h.app.users.apply_friend(&h.cancel, &alice.id, &bob.id).await.unwrap();

    let status = h.app.users.react_friend_apply(&h.cancel, &bob.id, &alice.id, false).await.unwrap();
    assert_eq!(status, RelatedUserStatus::Rejected);
    assert_eq!(h.view(&alice, &bob).await, Some(RelatedUserStatus::Rejected));

    let reopened = h.app.users.apply_friend(&h.cancel, &bob.id, &alice.id).await.unwrap();
    assert_eq!(reopened.id(), original.id());
    assert_eq!(reopened.requester_id(), &bob.id);
    assert_eq!(reopened.status(), RelationshipStatus::Pending);
    assert_eq!(h.relationship_count().await, 1);

    let status = h.app.users.react_friend_apply(&h.cancel, &alice.id, &bob.id, true).await.unwrap();
    assert_eq!(status, RelatedUserStatus::Approved);
}

#[tokio::test]
async fn block_is_visible_only_to_the_blocker() {
    let h = Harness::new();
    let bob = h.register("bob").await;
    let carol = h.register("carol").await;

    h.app.users.block_friend(&h.cancel, &bob.id, &carol.id).await.unwrap();
    assert_eq!(h.view(&bob, &carol).await, Some(RelatedUserStatus::Blocked));
    assert_eq!(h.view(&carol, &bob).await, None);

    let apply = h.app.users.apply_friend(&h.cancel, &carol.id, &bob.id).await.unwrap_err();
    assert_rejected(&apply, "blocked", 403);
    let from_blocker = h.app.users.apply_friend(&h.cancel, &bob.id, &carol.id).await.unwrap_err();
    assert_rejected(&from_blocker, "blocked_by_user", 403);
    let twice = h.app.users.block_friend(&h.cancel, &bob.id, &carol.id).await.unwrap_err();
    assert_rejected(&twice, "already_blocked", 409);
    assert_eq!(h.relationship_count().await, 1);
}

#[tokio::test]
async fn blocked_user_can_block_back() {
    let h = Harness::new();
    let bob = h.register("bob").await;
    let carol = h.register("carol").await;
    h.app.users.block_friend(&h.cancel, &bob.id, &carol.id).await.unwrap();

    h.app.users.block_friend(&h.cancel, &carol.id, &bob.id).await.unwrap();

    assert_eq!(h.view(&carol, &bob).await, Some(RelatedUserStatus::Blocked));
    assert_eq!(h.view(&bob, &carol).await, None);
    assert_eq!(h.relationship_count().await, 1);
    let rel = h.repos.relationships.find_by_users(&h.cancel, &carol.id, &bob.id).await.unwrap();
    assert!(rel.is_blocked());

    let apply = h.app.users.apply_friend(&h.cancel, &bob.id, &carol.id).await.unwrap_err();
    assert_rejected(&apply, "blocked", 403);
}

#[tokio::test]
async fn receiver_blocking_a_friend_becomes_requester() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.befriend(&alice, &bob).await;

    h.app.users.block_friend(&h.cancel, &bob.id, &alice.id).await.unwrap();

    let rel = h.repos.relationships.find_by_users(&h.cancel, &bob.id, &alice.id).await.unwrap();
    assert!(rel.is_blocked());
    assert!(h.repos.relationships.find_by_users(&h.cancel, &alice.id, &bob.id).await.is_err());
    assert_eq!(h.view(&bob, &alice).await, Some(RelatedUserStatus::Blocked));
    assert_eq!(h.view(&alice, &bob).await, None);

    let call = h.schedule(&alice, &bob, 2).await.unwrap_err();
    assert_rejected(&call, "blocked", 403);
}

#[tokio::test]
async fn unblock_removes_the_relationship() {
    let h = Harness::new();
    let bob = h.register("bob").await;
    let carol = h.register("carol").await;
    h.app.users.block_friend(&h.cancel, &bob.id, &carol.id).await.unwrap();

    let err = h.app.users.unblock_friend(&h.cancel, &carol.id, &bob.id).await.unwrap_err();
    assert_rejected(&err, "not_blocked", 404);

    h.app.users.unblock_friend(&h.cancel, &bob.id, &carol.id).await.unwrap();
    assert_eq!(h.relationship_count().await, 0);
    assert_eq!(h.view(&bob, &carol).await, None);

    let again = h.app.users.unblock_friend(&h.cancel, &bob.id, &carol.id).await.unwrap_err();
    assert_rejected(&again, "not_blocked", 404);

    h.app.users.apply_friend(&h.cancel, &carol.id, &bob.id).await.unwrap();
    assert_eq!(h.view(&bob, &carol).await, Some(RelatedUserStatus::Pending));
}

#[tokio::test]
async fn registration_normalises_and_rejects_taken_email() {
    let h = Harness::new();
    let alice = h.app.users.register(&h.cancel, "  alice ", " Alice@Example.COM").await.unwrap();
    assert_eq!(alice.username, "alice");
    assert_eq!(alice.email, "alice@example.com");

    let err = h.app.users.register(&h.cancel, "alice2", "ALICE@example.com").await.unwrap_err();
    assert!(err.is_conflict());

    let invalid = h.app.users.register(&h.cancel, "a", "alice@example.com").await.unwrap_err();
    assert!(invalid.is_validation());

    let logged_in = h.app.users.login(&h.cancel, "alice@example.com").await.unwrap();
    assert_eq!(logged_in.id, alice.id);
}
