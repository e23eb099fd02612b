//! User aggregate and the friend-policy rules evaluated on its view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::call::MorningCall;
use crate::id::UserId;
use crate::reason::{Check, NgReason};
use crate::relationship::Relationship;
use crate::types::RelatedUserStatus;

/// One counterpart in a user's view of its relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedUser {
    pub id: UserId,
    pub status: RelatedUserStatus,
}

impl RelatedUser {
    pub fn new(id: UserId, status: RelatedUserStatus) -> Self {
        Self { id, status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub related_users: Vec<RelatedUser>,
    #[serde(default)]
    pub morning_calls: Vec<MorningCall>,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            related_users: Vec::new(),
            morning_calls: Vec::new(),
        }
    }

    /// Replaces `related_users` with the view derived from `relationships`.
    pub fn with_relationships(mut self, relationships: &[Relationship]) -> Self {
        self.related_users = project_related_users(&self.id, relationships);
        self
    }

    pub fn related_user(&self, id: &UserId) -> Option<&RelatedUser> {
        self.related_users.iter().find(|related| &related.id == id)
    }

    fn status_of(&self, id: &UserId) -> Option<RelatedUserStatus> {
        self.related_user(id).map(|related| related.status)
    }

    /// Approved counterparts.
    pub fn friends(&self) -> Vec<RelatedUser> {
        self.related_users
            .iter()
            .filter(|related| related.status == RelatedUserStatus::Approved)
            .cloned()
            .collect()
    }

    /// Whether `friend` may send this user a morning call.
    ///
    /// Missing, pending and rejected entries all report `NotFriend`.
    pub fn can_accept_morning_call(&self, friend: &UserId) -> Check {
        match self.status_of(friend) {
            Some(RelatedUserStatus::Approved) => Ok(()),
            Some(RelatedUserStatus::Blocked) => Err(NgReason::Blocked),
            _ => Err(NgReason::NotFriend),
        }
    }

    pub fn can_add_friend(&self, target: &UserId) -> Check {
        if &self.id == target {
            return Err(NgReason::SelfOperation);
        }
        match self.status_of(target) {
            Some(RelatedUserStatus::Approved) => Err(NgReason::AlreadyFriend),
            Some(RelatedUserStatus::Pending) => Err(NgReason::AlreadyRequested),
            Some(RelatedUserStatus::Blocked) => Err(NgReason::BlockedByUser),
            Some(RelatedUserStatus::Rejected) | None => Ok(()),
        }
    }

    pub fn can_approve_friend(&self, requester: &UserId) -> Check {
        match self.status_of(requester) {
            Some(RelatedUserStatus::Pending) => Ok(()),
            Some(RelatedUserStatus::Approved) => Err(NgReason::AlreadyFriend),
            Some(RelatedUserStatus::Blocked) => Err(NgReason::Blocked),
            Some(RelatedUserStatus::Rejected) => Err(NgReason::InvalidStatus),
            None => Err(NgReason::UserNotFound),
        }
    }

    pub fn can_block_user(&self, target: &UserId) -> Check {
        if &self.id == target {
            return Err(NgReason::SelfOperation);
        }
        match self.status_of(target) {
            Some(RelatedUserStatus::Blocked) => Err(NgReason::AlreadyBlocked),
            _ => Ok(()),
        }
    }

    pub fn can_unblock_user(&self, target: &UserId) -> Check {
        if &self.id == target {
            return Err(NgReason::SelfOperation);
        }
        match self.status_of(target) {
            Some(RelatedUserStatus::Blocked) => Ok(()),
            _ => Err(NgReason::NotBlocked),
        }
    }
}

/// Derives `user`'s view from the relationship records it participates in.
///
/// A `Blocked` record is visible only to its requester (the blocker). Every
/// other status is visible to both participants. When several records link
/// the same pair, the most recently updated one wins.
pub fn project_related_users(user: &UserId, relationships: &[Relationship]) -> Vec<RelatedUser> {
    let mut latest: HashMap<UserId, &Relationship> = HashMap::new();
    for rel in relationships.iter().filter(|rel| rel.involves_user(user)) {
        if rel.is_blocked() && rel.requester_id() != user {
            continue;
        }
        let other = rel.other_user_id(user);
        let newer = latest
            .get(&other)
            .is_none_or(|seen| (seen.updated_at(), seen.id()) < (rel.updated_at(), rel.id()));
        if newer {
            latest.insert(other, rel);
        }
    }

    let mut view: Vec<(&Relationship, RelatedUser)> = latest
        .into_iter()
        .map(|(other, rel)| (rel, RelatedUser::new(other, rel.status().into())))
        .collect();
    view.sort_by(|(a, _), (b, _)| (a.created_at(), a.id()).cmp(&(b.created_at(), b.id())));
    view.into_iter().map(|(_, related)| related).collect()
}
