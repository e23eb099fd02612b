use chrono::Duration;
use morning_call::config::SchedulingConfig;
use morning_call::{CoreConfig, ErrorKind, MorningCall, MorningCallId, MorningCallStatus};

use crate::support::{Harness, assert_rejected, t0};

#[tokio::test]
async fn scheduling_window_is_open_at_now_and_closed_at_horizon() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.befriend(&alice, &bob).await;
    let calls = &h.app.morning_calls;

    let at_now = calls.schedule_morning_call(&h.cancel, &alice.id, &bob.id, t0(), "now").await.unwrap_err();
    assert_rejected(&at_now, "past_time", 400);

    let past = calls
        .schedule_morning_call(&h.cancel, &alice.id, &bob.id, t0() - Duration::minutes(1), "late")
        .await
        .unwrap_err();
    assert_rejected(&past, "past_time", 400);

    let edge = t0() + Duration::days(30);
    let call = calls.schedule_morning_call(&h.cancel, &alice.id, &bob.id, edge, "edge").await.unwrap();
    assert_eq!(call.status, MorningCallStatus::Scheduled);

    let beyond = calls
        .schedule_morning_call(&h.cancel, &alice.id, &bob.id, edge + Duration::seconds(1), "too far")
        .await
        .unwrap_err();
    assert_rejected(&beyond, "too_far_in_future", 400);

    let soonest = calls
        .schedule_morning_call(&h.cancel, &alice.id, &bob.id, t0() + Duration::milliseconds(1), "soon")
        .await
        .unwrap();
    assert_eq!(soonest.time, t0() + Duration::milliseconds(1));
}

#[tokio::test]
async fn horizon_follows_configuration() {
    let config = CoreConfig {
        scheduling: SchedulingConfig {
            max_days_ahead: 7,
            ..SchedulingConfig::default()
        },
        ..CoreConfig::default()
    };
    let h = Harness::with_config(&config);
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.befriend(&alice, &bob).await;

    let err = h.schedule(&alice, &bob, 24 * 8).await.unwrap_err();
    assert_rejected(&err, "too_far_in_future", 400);
    assert!(h.schedule(&alice, &bob, 24 * 7).await.is_ok());
}

#[tokio::test]
async fn message_length_is_counted_in_characters() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.befriend(&alice, &bob).await;
    let when = t0() + Duration::hours(3);

    let fits = "お".repeat(280);
    let call = h.app.morning_calls.schedule_morning_call(&h.cancel, &alice.id, &bob.id, when, &fits).await.unwrap();
    assert_eq!(call.message.chars().count(), 280);

    let too_long = "お".repeat(281);
    let err = h
        .app
        .morning_calls
        .schedule_morning_call(&h.cancel, &alice.id, &bob.id, when + Duration::hours(1), &too_long)
        .await
        .unwrap_err();
    assert_rejected(&err, "message_too_long", 400);
}

#[tokio::test]
async fn only_friends_can_schedule() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let carol = h.register("carol").await;

    let stranger = h.schedule(&carol, &bob, 2).await.unwrap_err();
    assert_rejected(&stranger, "not_friend", 403);

    h.app.users.apply_friend(&h.cancel, &alice.id, &bob.id).await.unwrap();
    let pending = h.schedule(&alice, &bob, 2).await.unwrap_err();
    assert_rejected(&pending, "not_friend", 403);

    h.app.users.react_friend_apply(&h.cancel, &bob.id, &alice.id, true).await.unwrap();
    assert!(h.schedule(&alice, &bob, 2).await.is_ok());
    assert!(h.schedule(&bob, &alice, 2).await.is_ok());

    let own = h.schedule(&alice, &alice, 2).await.unwrap_err();
    assert_rejected(&own, "self_operation", 400);
}

#[tokio::test]
async fn same_sender_receiver_and_time_is_a_duplicate() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.befriend(&alice, &bob).await;

    h.schedule(&alice, &bob, 2).await.unwrap();
    let err = h.schedule(&alice, &bob, 2).await.unwrap_err();
    assert_rejected(&err, "duplicate_schedule", 409);

    assert!(h.schedule(&alice, &bob, 3).await.is_ok());
    assert!(h.schedule(&bob, &alice, 2).await.is_ok());
}

#[tokio::test]
async fn save_requires_matching_participants() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    h.befriend(&alice, &bob).await;
    let when = t0() + Duration::hours(2);

    let reversed = MorningCall::new(MorningCallId::new("mc-1"), bob.id.clone(), alice.id.clone(), when, "hi");
    let err = h
        .app
        .morning_calls
        .save_friend_morning_call(&h.cancel, &alice.id, &bob.id, reversed)
        .await
        .unwrap_err();
    assert_rejected(&err, "invalid_parameter", 400);

    let mut finished = MorningCall::new(MorningCallId::new("mc-2"), alice.id.clone(), bob.id.clone(), when, "hi");
    finished.status = MorningCallStatus::Completed;
    let err = h
        .app
        .morning_calls
        .save_friend_morning_call(&h.cancel, &alice.id, &bob.id, finished)
        .await
        .unwrap_err();
    assert_rejected(&err, "invalid_status", 400);

    let call = MorningCall::new(MorningCallId::new("mc-3"), alice.id.clone(), bob.id.clone(), when, "hi");
    let saved = h.app.morning_calls.save_friend_morning_call(&h.cancel, &alice.id, &bob.id, call).await.unwrap();
    assert_eq!(saved.id, MorningCallId::new("mc-3"));
}

#[tokio::test]
async fn friend_call_lookup_checks_both_parties() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let carol = h.register("carol").await;
    h.befriend(&alice, &bob).await;
    let call = h.schedule(&alice, &bob, 2).await.unwrap();
    let calls = &h.app.morning_calls;

    let by_receiver = calls.get_friend_morning_call(&h.cancel, &bob.id, &alice.id, &call.id).await.unwrap();
    assert_eq!(by_receiver, call);
    let by_sender = calls.get_friend_morning_call(&h.cancel, &alice.id, &bob.id, &call.id).await.unwrap();
    assert_eq!(by_sender, call);

    let outsider = calls.get_friend_morning_call(&h.cancel, &carol.id, &alice.id, &call.id).await.unwrap_err();
    assert_rejected(&outsider, "no_permission", 403);

    let wrong_friend = calls.get_friend_morning_call(&h.cancel, &alice.id, &carol.id, &call.id).await.unwrap_err();
    assert_rejected(&wrong_friend, "invalid_parameter", 400);

    let missing = calls
        .get_friend_morning_call(&h.cancel, &alice.id, &bob.id, &MorningCallId::new("missing"))
        .await
        .unwrap_err();
    assert_eq!(missing.kind, ErrorKind::NotFound);
}
