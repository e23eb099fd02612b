use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use morning_call::repository::{InMemoryRelationshipRepository, RelationshipRepository, RepoResult};
use morning_call::{
    CancellationToken, RelatedUserStatus, Relationship, RelationshipId, RelationshipStatus, Repositories, User, UserId,
};

use crate::support::{Harness, t0};

async fn seed_pending(h: &Harness, id: &str, requester: &User, receiver: &User) {
    let rel = Relationship::new_at(RelationshipId::new(id), requester.id.clone(), receiver.id.clone(), t0());
    h.repos.relationships.create(&h.cancel, rel).await.unwrap();
}

#[tokio::test]
async fn approval_uses_the_request_addressed_to_the_caller() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    seed_pending(&h, "a-1", &bob, &alice).await;
    seed_pending(&h, "z-1", &alice, &bob).await;

    let status = h.app.users.react_friend_apply(&h.cancel, &bob.id, &alice.id, true).await.unwrap();

    assert_eq!(status, RelatedUserStatus::Approved);
    let approved = h.repos.relationships.find_by_id(&h.cancel, &RelationshipId::new("z-1")).await.unwrap();
    assert_eq!(approved.status(), RelationshipStatus::Approved);
}

#[tokio::test]
async fn blocking_with_records_in_both_directions_leaves_one() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    seed_pending(&h, "a-1", &alice, &bob).await;
    seed_pending(&h, "z-1", &bob, &alice).await;

    h.app.users.block_friend(&h.cancel, &bob.id, &alice.id).await.unwrap();

    assert_eq!(h.relationship_count().await, 1);
    let rel = h.repos.relationships.find_by_users(&h.cancel, &bob.id, &alice.id).await.unwrap();
    assert!(rel.is_blocked());
    assert_eq!(h.view(&bob, &alice).await, Some(RelatedUserStatus::Blocked));
    assert_eq!(h.view(&alice, &bob).await, None);
}

/// Relationship store where the counterpart's own request lands just before
/// the first create, as when both users apply at the same moment.
struct CrossingRelationships {
    inner: InMemoryRelationshipRepository,
    crossed: AtomicBool,
}

#[async_trait]
impl RelationshipRepository for CrossingRelationships {
    async fn create(&self, cancel: &CancellationToken, relationship: Relationship) -> RepoResult<()> {
        if !self.crossed.swap(true, Ordering::SeqCst) {
            let (requester, receiver) = relationship.pair();
            let rival = Relationship::new_at(RelationshipId::new("cross-1"), receiver, requester, t0());
            self.inner.create(cancel, rival).await?;
        }
        self.inner.create(cancel, relationship).await
    }

    async fn find_by_id(&self, cancel: &CancellationToken, id: &RelationshipId) -> RepoResult<Relationship> {
        self.inner.find_by_id(cancel, id).await
    }

    async fn find_by_users(
        &self,
        cancel: &CancellationToken,
        requester: &UserId,
        receiver: &UserId,
    ) -> RepoResult<Relationship> {
        self.inner.find_by_users(cancel, requester, receiver).await
    }

    async fn find_all_by_users(
        &self,
        cancel: &CancellationToken,
        a: &UserId,
        b: &UserId,
    ) -> RepoResult<Vec<Relationship>> {
        self.inner.find_all_by_users(cancel, a, b).await
    }

    async fn find_by_user(&self, cancel: &CancellationToken, user: &UserId) -> RepoResult<Vec<Relationship>> {
        self.inner.find_by_user(cancel, user).await
    }

    async fn find_by_user_with_status(
        &self,
        cancel: &CancellationToken,
        user: &UserId,
        status: RelationshipStatus,
    ) -> RepoResult<Vec<Relationship>> {
        self.inner.find_by_user_with_status(cancel, user, status).await
    }

    async fn find_by_requester(&self, cancel: &CancellationToken, user: &UserId) -> RepoResult<Vec<Relationship>> {
        self.inner.find_by_requester(cancel, user).await
    }

    async fn find_by_receiver(&self, cancel: &CancellationToken, user: &UserId) -> RepoResult<Vec<Relationship>> {
        self.inner.find_by_receiver(cancel, user).await
    }

    async fn update(&self, cancel: &CancellationToken, relationship: Relationship) -> RepoResult<()> {
        self.inner.update(cancel, relationship).await
    }

    async fn delete(&self, cancel: &CancellationToken, id: &RelationshipId) -> RepoResult<()> {
        self.inner.delete(cancel, id).await
    }

    async fn delete_by_users(
        &self,
        cancel: &CancellationToken,
        requester: &UserId,
        receiver: &UserId,
    ) -> RepoResult<()> {
        self.inner.delete_by_users(cancel, requester, receiver).await
    }

    async fn exists_by_users(
        &self,
        cancel: &CancellationToken,
        requester: &UserId,
        receiver: &UserId,
    ) -> RepoResult<bool> {
        self.inner.exists_by_users(cancel, requester, receiver).await
    }

    async fn count(&self, cancel: &CancellationToken) -> RepoResult<usize> {
        self.inner.count(cancel).await
    }
}

#[tokio::test]
async fn crossed_requests_settle_on_one_record() {
    let repos = Repositories {
        relationships: Arc::new(CrossingRelationships {
            inner: InMemoryRelationshipRepository::new(),
            crossed: AtomicBool::new(false),
        }),
        ..Repositories::in_memory()
    };
    let h = Harness::with_repos(repos);
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;

    let kept = h.app.users.apply_friend(&h.cancel, &alice.id, &bob.id).await.unwrap();

    assert_eq!(kept.id(), &RelationshipId::new("cross-1"));
    assert_eq!(h.relationship_count().await, 1);
    assert_eq!(h.view(&alice, &bob).await, Some(RelatedUserStatus::Pending));
    assert_eq!(h.view(&bob, &alice).await, Some(RelatedUserStatus::Pending));

    let status = h.app.users.react_friend_apply(&h.cancel, &alice.id, &bob.id, true).await.unwrap();
    assert_eq!(status, RelatedUserStatus::Approved);
    assert_eq!(h.view(&bob, &alice).await, Some(RelatedUserStatus::Approved));
}
