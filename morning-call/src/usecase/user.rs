use tokio_util::sync::CancellationToken;

use super::{Collaborators, Repositories, UsecaseResult, check, ensure_active, reject};
use crate::errors::DomainError;
use crate::id::{RelationshipId, UserId};
use crate::reason::NgReason;
use crate::relationship::Relationship;
use crate::types::RelatedUserStatus;
use crate::user::{RelatedUser, User};

/// Registration and friend management.
#[derive(Clone)]
pub struct UserUsecase {
    repos: Repositories,
    deps: Collaborators,
}

impl UserUsecase {
    pub fn new(repos: Repositories, deps: Collaborators) -> Self {
        Self { repos, deps }
    }

    /// Validates, normalises and stores a new user with a fresh id.
    pub async fn register(&self, cancel: &CancellationToken, username: &str, email: &str) -> UsecaseResult<User> {
        ensure_active(cancel)?;
        let (username, email) = self.deps.validator.validate_registration(username, email)?;

        match self.repos.users.find_by_email(cancel, &email).await {
            Ok(_) => {
                log::warn!("registration rejected: email {email} already registered");
                return Err(DomainError::conflict("user").with_detail("email", &email));
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }

        let user = User::new(self.deps.ids.next_id(), username, email);
        self.repos.users.create(cancel, user.clone()).await?;
        log::info!("user {} registered as {}", user.id, user.username);
        Ok(user)
    }

    pub async fn login(&self, cancel: &CancellationToken, email: &str) -> UsecaseResult<User> {
        ensure_active(cancel)?;
        let user = self.repos.users.find_by_email(cancel, email).await?;
        self.get_user(cancel, &user.id).await
    }

    /// The user with its projected relationships and its morning calls.
    pub async fn get_user(&self, cancel: &CancellationToken, id: &UserId) -> UsecaseResult<User> {
        ensure_active(cancel)?;
        let mut user = self.repos.user_view(cancel, id).await?;
        user.morning_calls = self.repos.calls_for(cancel, id).await?;
        Ok(user)
    }

    pub async fn list_friends(&self, cancel: &CancellationToken, id: &UserId) -> UsecaseResult<Vec<RelatedUser>> {
        ensure_active(cancel)?;
        Ok(self.repos.user_view(cancel, id).await?.friends())
    }

    /// Sends a friend request, or re-opens a rejected one.
    pub async fn apply_friend(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
        target_id: &UserId,
    ) -> UsecaseResult<Relationship> {
        const ACTION: &str = "apply friend";
        ensure_active(cancel)?;
        let user = self.repos.user_view(cancel, user_id).await?;
        check(user.can_add_friend(target_id), ACTION, user_id)?;
        self.require_user(cancel, target_id).await?;

        let existing = self.repos.relationships.find_all_by_users(cancel, user_id, target_id).await?;
        if existing.iter().any(|rel| rel.is_blocked() && rel.requester_id() == target_id) {
            return Err(reject(NgReason::Blocked, ACTION, user_id));
        }

        let now = self.deps.clock.now();
        let reopened = existing
            .iter()
            .filter(|rel| rel.is_rejected())
            .min_by_key(|rel| rel.requester_id() != user_id)
            .cloned();
        let relationship = match reopened {
            Some(mut rel) => {
                check(rel.request_again_at(user_id, now), ACTION, user_id)?;
                self.repos.relationships.update(cancel, rel.clone()).await?;
                rel
            }
            None => {
                let id: RelationshipId = self.deps.ids.next_id();
                let rel = Relationship::new_at(id, user_id.clone(), target_id.clone(), now);
                self.repos.relationships.create(cancel, rel.clone()).await?;
                self.settle_crossed_requests(cancel, rel).await?
            }
        };
        log::info!("{user_id} requested friendship with {target_id} ({})", relationship.id());
        Ok(relationship)
    }

    /// Approves or rejects a pending request from `applicant_id`, returning the
    /// status both users now see.
    pub async fn react_friend_apply(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
        applicant_id: &UserId,
        approve: bool,
    ) -> UsecaseResult<RelatedUserStatus> {
        let action = if approve { "approve friend" } else { "reject friend" };
        ensure_active(cancel)?;
        let user = self.repos.user_view(cancel, user_id).await?;
        check(user.can_approve_friend(applicant_id), action, user_id)?;

        let existing = self.repos.relationships.find_all_by_users(cancel, user_id, applicant_id).await?;
        let addressed = existing.iter().find(|rel| rel.is_pending() && rel.receiver_id() == user_id);
        let Some(mut rel) = addressed.or_else(|| existing.iter().find(|rel| rel.is_pending())).cloned() else {
            return Err(reject(NgReason::UserNotFound, action, user_id));
        };

        let now = self.deps.clock.now();
        let decided = if approve { rel.approve_at(user_id, now) } else { rel.reject_at(user_id, now) };
        check(decided, action, user_id)?;
        self.repos.relationships.update(cancel, rel.clone()).await?;
        log::info!("{user_id} {action}: {applicant_id} is now {}", rel.status());
        Ok(rel.status().into())
    }

    /// Blocks `target_id`. Only the blocker sees the block, so blocking someone
    /// who blocked you first takes their record over.
    pub async fn block_friend(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
        target_id: &UserId,
    ) -> UsecaseResult<()> {
        const ACTION: &str = "block user";
        ensure_active(cancel)?;
        let user = self.repos.user_view(cancel, user_id).await?;
        check(user.can_block_user(target_id), ACTION, user_id)?;
        self.require_user(cancel, target_id).await?;

        let mut existing = self.repos.relationships.find_all_by_users(cancel, user_id, target_id).await?;
        // The caller's own direction first, so the swap in `block` never collides.
        existing.sort_by_key(|rel| rel.requester_id() != user_id);

        let now = self.deps.clock.now();
        let mut records = existing.into_iter();
        match records.next() {
            Some(mut rel) => {
                check(rel.block_at(user_id, now), ACTION, user_id)?;
                self.repos.relationships.update(cancel, rel).await?;
                for stale in records {
                    self.remove_if_present(cancel, stale.id()).await?;
                }
            }
            None => {
                let id: RelationshipId = self.deps.ids.next_id();
                let rel = Relationship::new_blocked_at(id, user_id.clone(), target_id.clone(), now);
                self.repos.relationships.create(cancel, rel).await?;
            }
        }
        log::info!("{user_id} blocked {target_id}");
        Ok(())
    }

    /// Lifts a block, leaving no relationship between the pair.
    pub async fn unblock_friend(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
        target_id: &UserId,
    ) -> UsecaseResult<()> {
        const ACTION: &str = "unblock user";
        ensure_active(cancel)?;
        let user = self.repos.user_view(cancel, user_id).await?;
        check(user.can_unblock_user(target_id), ACTION, user_id)?;
        self.repos.relationships.delete_by_users(cancel, user_id, target_id).await?;
        log::info!("{user_id} unblocked {target_id}");
        Ok(())
    }

    /// Two users who applied to each other at the same time each create a
    /// pending record. Every racer keeps the one with the smallest id and
    /// removes the rest, so they all converge on the same record.
    async fn settle_crossed_requests(
        &self,
        cancel: &CancellationToken,
        created: Relationship,
    ) -> UsecaseResult<Relationship> {
        let (requester, receiver) = created.pair();
        let pending: Vec<Relationship> = self
            .repos
            .relationships
            .find_all_by_users(cancel, &requester, &receiver)
            .await?
            .into_iter()
            .filter(Relationship::is_pending)
            .collect();
        let Some(kept) = pending.iter().min_by(|a, b| a.id().cmp(b.id())).cloned() else {
            return Ok(created);
        };
        for rel in pending.iter().filter(|rel| rel.id() != kept.id()) {
            log::debug!("dropping crossed request {} in favour of {}", rel.id(), kept.id());
            self.remove_if_present(cancel, rel.id()).await?;
        }
        Ok(kept)
    }

    async fn remove_if_present(&self, cancel: &CancellationToken, id: &RelationshipId) -> UsecaseResult<()> {
        match self.repos.relationships.delete(cancel, id).await {
            Err(err) if err.is_not_found() => Ok(()),
            other => Ok(other?),
        }
    }

    async fn require_user(&self, cancel: &CancellationToken, id: &UserId) -> UsecaseResult<()> {
        self.repos.users.find_by_id(cancel, id).await?;
        Ok(())
    }
}
