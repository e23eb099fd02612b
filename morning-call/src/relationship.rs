//! Directed friend-request edge and its state machine.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::id::{RelationshipId, UserId};
use crate::reason::{Check, NgReason};
use crate::types::RelationshipStatus;

/// One friend request between two users.
///
/// Fields are private: every change goes through a transition method that
/// either applies completely or reports an [`NgReason`] and leaves the record
/// untouched, `updated_at` included.
///
/// For a `Blocked` record the requester is always the user who blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    id: RelationshipId,
    requester_id: UserId,
    receiver_id: UserId,
    status: RelationshipStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Relationship {
    /// New `Pending` request.
    pub fn new(id: RelationshipId, requester_id: UserId, receiver_id: UserId) -> Self {
        Self::new_at(id, requester_id, receiver_id, Utc::now())
    }

    pub fn new_at(id: RelationshipId, requester_id: UserId, receiver_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            requester_id,
            receiver_id,
            status: RelationshipStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// A record that starts out `Blocked`, used when a user blocks someone
    /// they have no relationship with yet.
    pub fn new_blocked_at(id: RelationshipId, blocker_id: UserId, blocked_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            status: RelationshipStatus::Blocked,
            ..Self::new_at(id, blocker_id, blocked_id, now)
        }
    }

    pub fn id(&self) -> &RelationshipId {
        &self.id
    }

    pub fn requester_id(&self) -> &UserId {
        &self.requester_id
    }

    pub fn receiver_id(&self) -> &UserId {
        &self.receiver_id
    }

    pub fn status(&self) -> RelationshipStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Ordered pair key used by the repository's pair index.
    pub fn pair(&self) -> (UserId, UserId) {
        (self.requester_id.clone(), self.receiver_id.clone())
    }

    pub fn involves_user(&self, user: &UserId) -> bool {
        &self.requester_id == user || &self.receiver_id == user
    }

    /// The counterpart of `user`, or an empty id when `user` is not a participant.
    pub fn other_user_id(&self, user: &UserId) -> UserId {
        if &self.requester_id == user {
            self.receiver_id.clone()
        } else if &self.receiver_id == user {
            self.requester_id.clone()
        } else {
            UserId::empty()
        }
    }

    pub fn is_friend(&self) -> bool {
        self.status == RelationshipStatus::Approved
    }

    pub fn is_pending(&self) -> bool {
        self.status == RelationshipStatus::Pending
    }

    pub fn is_blocked(&self) -> bool {
        self.status == RelationshipStatus::Blocked
    }

    pub fn is_rejected(&self) -> bool {
        self.status == RelationshipStatus::Rejected
    }

    pub fn can_approve(&self, actor: &UserId) -> Check {
        self.check_receiver_decision(actor, RelationshipStatus::Approved)
    }

    pub fn can_reject(&self, actor: &UserId) -> Check {
        self.check_receiver_decision(actor, RelationshipStatus::Rejected)
    }

    fn check_receiver_decision(&self, actor: &UserId, target: RelationshipStatus) -> Check {
        if &self.receiver_id != actor {
            return Err(NgReason::NotReceiver);
        }
        if self.status != RelationshipStatus::Pending || !self.status.can_transition_to(target) {
            return Err(NgReason::InvalidStatusTransition);
        }
        Ok(())
    }

    pub fn approve(&mut self, actor: &UserId) -> Check {
        self.approve_at(actor, Utc::now())
    }

    pub fn approve_at(&mut self, actor: &UserId, now: DateTime<Utc>) -> Check {
        self.can_approve(actor)?;
        self.transition_to_at(RelationshipStatus::Approved, now)
    }

    pub fn reject(&mut self, actor: &UserId) -> Check {
        self.reject_at(actor, Utc::now())
    }

    pub fn reject_at(&mut self, actor: &UserId, now: DateTime<Utc>) -> Check {
        self.can_reject(actor)?;
        self.transition_to_at(RelationshipStatus::Rejected, now)
    }

    /// Blocks the counterpart of `actor`.
    ///
    /// Allowed from any status, including `Blocked`. When the receiver blocks,
    /// the participants are swapped so the blocker becomes the requester.
    pub fn block(&mut self, actor: &UserId) -> Check {
        self.block_at(actor, Utc::now())
    }

    pub fn block_at(&mut self, actor: &UserId, now: DateTime<Utc>) -> Check {
        if !self.involves_user(actor) {
            return Err(NgReason::NoPermission);
        }
        if &self.receiver_id == actor {
            std::mem::swap(&mut self.requester_id, &mut self.receiver_id);
        }
        self.status = RelationshipStatus::Blocked;
        self.updated_at = now;
        Ok(())
    }

    /// Re-opens a rejected request with `applicant` as the requester.
    pub fn request_again(&mut self, applicant: &UserId) -> Check {
        self.request_again_at(applicant, Utc::now())
    }

    pub fn request_again_at(&mut self, applicant: &UserId, now: DateTime<Utc>) -> Check {
        if !self.involves_user(applicant) {
            return Err(NgReason::NoPermission);
        }
        if self.status != RelationshipStatus::Rejected {
            return Err(NgReason::InvalidStatusTransition);
        }
        self.transition_to_at(RelationshipStatus::Pending, now)?;
        if &self.receiver_id == applicant {
            std::mem::swap(&mut self.requester_id, &mut self.receiver_id);
        }
        Ok(())
    }

    /// Moves to `target` if the transition table allows it.
    pub fn transition_to(&mut self, target: RelationshipStatus) -> Check {
        self.transition_to_at(target, Utc::now())
    }

    pub fn transition_to_at(&mut self, target: RelationshipStatus, now: DateTime<Utc>) -> Check {
        if !self.status.can_transition_to(target) {
            return Err(NgReason::InvalidStatusTransition);
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}
