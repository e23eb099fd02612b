use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use morning_call::{
    CancellationToken, Collaborators, CoreConfig, DomainError, FixedClock, MorningCall, RelatedUserStatus,
    Repositories, SequenceGenerator, User, UserId, Usecases,
};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap()
}

/// Use cases over a fresh in-memory store, a fixed clock and sequential ids.
pub struct Harness {
    pub app: Usecases,
    pub repos: Repositories,
    pub clock: Arc<FixedClock>,
    pub cancel: CancellationToken,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(&CoreConfig::default())
    }

    pub fn with_config(config: &CoreConfig) -> Self {
        Self::build(config, Repositories::in_memory())
    }

    pub fn with_repos(repos: Repositories) -> Self {
        Self::build(&CoreConfig::default(), repos)
    }

    fn build(config: &CoreConfig, repos: Repositories) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let clock = Arc::new(FixedClock::new(t0()));
        let collaborators = Collaborators::from_config(config)
            .with_ids(Arc::new(SequenceGenerator::new("id")))
            .with_clock(clock.clone());
        Self {
            app: Usecases::new(repos.clone(), collaborators, config),
            repos,
            clock,
            cancel: CancellationToken::new(),
        }
    }

    pub async fn register(&self, name: &str) -> User {
        self.app
            .users
            .register(&self.cancel, name, &format!("{name}@example.com"))
            .await
            .expect("registration should succeed")
    }

    pub async fn befriend(&self, requester: &User, receiver: &User) {
        self.app
            .users
            .apply_friend(&self.cancel, &requester.id, &receiver.id)
            .await
            .expect("apply should succeed");
        self.app
            .users
            .react_friend_apply(&self.cancel, &receiver.id, &requester.id, true)
            .await
            .expect("approve should succeed");
    }

    /// Status `viewer` sees for `other`, if any.
    pub async fn view(&self, viewer: &User, other: &User) -> Option<RelatedUserStatus> {
        let user = self.app.users.get_user(&self.cancel, &viewer.id).await.expect("user should load");
        user.related_user(&other.id).map(|related| related.status)
    }

    pub async fn schedule(&self, sender: &User, receiver: &User, hours: i64) -> Result<MorningCall, DomainError> {
        self.app
            .morning_calls
            .schedule_morning_call(&self.cancel, &sender.id, &receiver.id, t0() + Duration::hours(hours), "wake up")
            .await
    }

    pub async fn relationship_count(&self) -> usize {
        self.repos.relationships.count(&self.cancel).await.expect("count should succeed")
    }
}

pub fn assert_rejected(err: &DomainError, reason: &str, status: u16) {
    assert_eq!(err.reason_code(), Some(reason), "unexpected error: {err:?}");
    assert_eq!(err.status_code(), status, "unexpected status for {reason}");
}

pub fn user_id(raw: &str) -> UserId {
    UserId::new(raw)
}
