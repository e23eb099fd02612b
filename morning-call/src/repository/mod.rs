//! Storage seams and their in-memory implementations.
//!
//! Each in-memory repository keeps its primary table and secondary indexes
//! behind a single `tokio::sync::RwLock`, so every multi-index mutation is
//! applied under one write guard. Reads hand out clones. Repositories never
//! validate business rules and never lock one another.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::call::MorningCall;
use crate::errors::RepoError;
use crate::id::{MorningCallId, RelationshipId, UserId};
use crate::relationship::Relationship;
use crate::types::RelationshipStatus;
use crate::user::User;

mod morning_call;
mod relationship;
mod user;

pub use morning_call::InMemoryMorningCallRepository;
pub use relationship::InMemoryRelationshipRepository;
pub use user::InMemoryUserRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Fails fast when the caller has already given up.
pub(crate) fn ensure_active(cancel: &CancellationToken) -> RepoResult<()> {
    if cancel.is_cancelled() {
        return Err(RepoError::Cancelled);
    }
    Ok(())
}

pub(crate) fn require_key(entity: &'static str, key: &str) -> RepoResult<()> {
    if key.is_empty() {
        return Err(RepoError::InvalidRequest {
            message: format!("{entity} id is required"),
        });
    }
    Ok(())
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` on a taken id or normalised email.
    async fn create(&self, cancel: &CancellationToken, user: User) -> RepoResult<()>;

    async fn find_by_id(&self, cancel: &CancellationToken, id: &UserId) -> RepoResult<User>;

    async fn find_by_email(&self, cancel: &CancellationToken, email: &str) -> RepoResult<User>;

    async fn update(&self, cancel: &CancellationToken, user: User) -> RepoResult<()>;

    async fn list(&self, cancel: &CancellationToken) -> RepoResult<Vec<User>>;
}

#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the id or the ordered pair is taken.
    async fn create(&self, cancel: &CancellationToken, relationship: Relationship) -> RepoResult<()>;

    async fn find_by_id(&self, cancel: &CancellationToken, id: &RelationshipId) -> RepoResult<Relationship>;

    /// Directional lookup of the `(requester, receiver)` record.
    async fn find_by_users(
        &self,
        cancel: &CancellationToken,
        requester: &UserId,
        receiver: &UserId,
    ) -> RepoResult<Relationship>;

    /// Records between `a` and `b` in either direction.
    async fn find_all_by_users(&self, cancel: &CancellationToken, a: &UserId, b: &UserId)
    -> RepoResult<Vec<Relationship>>;

    async fn find_by_user(&self, cancel: &CancellationToken, user: &UserId) -> RepoResult<Vec<Relationship>>;

    async fn find_by_user_with_status(
        &self,
        cancel: &CancellationToken,
        user: &UserId,
        status: RelationshipStatus,
    ) -> RepoResult<Vec<Relationship>>;

    async fn find_by_requester(&self, cancel: &CancellationToken, user: &UserId) -> RepoResult<Vec<Relationship>>;

    async fn find_by_receiver(&self, cancel: &CancellationToken, user: &UserId) -> RepoResult<Vec<Relationship>>;

    /// Replaces the stored record, re-keying the pair index if the
    /// participants changed.
    async fn update(&self, cancel: &CancellationToken, relationship: Relationship) -> RepoResult<()>;

    async fn delete(&self, cancel: &CancellationToken, id: &RelationshipId) -> RepoResult<()>;

    async fn delete_by_users(&self, cancel: &CancellationToken, requester: &UserId, receiver: &UserId)
    -> RepoResult<()>;

    async fn exists_by_users(&self, cancel: &CancellationToken, requester: &UserId, receiver: &UserId)
    -> RepoResult<bool>;

    async fn count(&self, cancel: &CancellationToken) -> RepoResult<usize>;
}

#[async_trait]
pub trait MorningCallRepository: Send + Sync {
    /// Fails with `InvalidRequest` on an empty id and `AlreadyExists` on a taken one.
    async fn save(&self, cancel: &CancellationToken, call: MorningCall) -> RepoResult<()>;

    async fn find_by_id(&self, cancel: &CancellationToken, id: &MorningCallId) -> RepoResult<MorningCall>;

    async fn update(&self, cancel: &CancellationToken, call: MorningCall) -> RepoResult<()>;

    async fn delete(&self, cancel: &CancellationToken, id: &MorningCallId) -> RepoResult<()>;

    async fn list_by_sender_id(&self, cancel: &CancellationToken, sender: &UserId) -> RepoResult<Vec<MorningCall>>;

    async fn list_by_receiver_id(&self, cancel: &CancellationToken, receiver: &UserId)
    -> RepoResult<Vec<MorningCall>>;
}
