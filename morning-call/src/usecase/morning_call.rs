use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use super::{Collaborators, Repositories, UsecaseResult, check, ensure_active, reject};
use crate::call::{MorningCall, MorningCallUpdate};
use crate::config::SchedulingConfig;
use crate::id::{MorningCallId, UserId};
use crate::reason::{Check, NgReason};
use crate::types::MorningCallStatus;

/// Scheduling and lifecycle of morning calls between friends.
#[derive(Clone)]
pub struct MorningCallUsecase {
    repos: Repositories,
    deps: Collaborators,
    config: SchedulingConfig,
}

impl MorningCallUsecase {
    pub fn new(repos: Repositories, deps: Collaborators, config: SchedulingConfig) -> Self {
        Self { repos, deps, config }
    }

    fn validate_content(&self, call: &MorningCall) -> Check {
        call.validate_scheduled_time_within(self.deps.clock.now(), self.config.horizon())?;
        call.validate_message(self.config.max_message_chars)
    }

    /// Another scheduled call from the same sender to the same receiver at the same instant.
    async fn check_duplicate(&self, cancel: &CancellationToken, call: &MorningCall) -> UsecaseResult<Check> {
        let sent = self.repos.morning_calls.list_by_sender_id(cancel, &call.sender_id).await?;
        let taken = sent.iter().any(|other| {
            other.id != call.id
                && other.receiver_id == call.receiver_id
                && other.time == call.time
                && other.status == MorningCallStatus::Scheduled
        });
        Ok(if taken { Err(NgReason::DuplicateSchedule) } else { Ok(()) })
    }

    /// Stores `call` from `user_id` to `friend_id` once the friend accepts calls from the user.
    pub async fn save_friend_morning_call(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
        friend_id: &UserId,
        call: MorningCall,
    ) -> UsecaseResult<MorningCall> {
        const ACTION: &str = "schedule morning call";
        ensure_active(cancel)?;
        if !call.is_sender(user_id) || !call.is_receiver(friend_id) {
            return Err(reject(NgReason::InvalidParameter, ACTION, user_id).with_detail("morning_call", &call.id));
        }
        if user_id == friend_id {
            return Err(reject(NgReason::SelfOperation, ACTION, user_id));
        }
        if call.status != MorningCallStatus::Scheduled {
            return Err(reject(NgReason::InvalidStatus, ACTION, user_id));
        }
        check(self.validate_content(&call), ACTION, user_id)?;

        self.repos.users.find_by_id(cancel, user_id).await?;
        let friend = self.repos.user_view(cancel, friend_id).await?;
        check(friend.can_accept_morning_call(user_id), ACTION, user_id)?;
        check(self.check_duplicate(cancel, &call).await?, ACTION, user_id)?;

        self.repos.morning_calls.save(cancel, call.clone()).await?;
        log::info!("{user_id} scheduled morning call {} for {friend_id} at {}", call.id, call.time);
        Ok(call)
    }

    /// Builds a call with a fresh id and stores it.
    pub async fn schedule_morning_call(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
        friend_id: &UserId,
        time: DateTime<Utc>,
        message: &str,
    ) -> UsecaseResult<MorningCall> {
        let call = MorningCall::new(self.deps.ids.next_id(), user_id.clone(), friend_id.clone(), time, message);
        self.save_friend_morning_call(cancel, user_id, friend_id, call).await
    }

    /// A call between `user_id` and `friend_id`, in either direction.
    pub async fn get_friend_morning_call(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
        friend_id: &UserId,
        id: &MorningCallId,
    ) -> UsecaseResult<MorningCall> {
        const ACTION: &str = "view morning call";
        ensure_active(cancel)?;
        let call = self.repos.morning_calls.find_by_id(cancel, id).await?;
        if !call.involves_user(user_id) {
            return Err(reject(NgReason::NoPermission, ACTION, user_id));
        }
        let other = if call.is_sender(user_id) { &call.receiver_id } else { &call.sender_id };
        if other != friend_id {
            return Err(reject(NgReason::InvalidParameter, ACTION, user_id).with_detail("friend", friend_id));
        }
        Ok(call)
    }

    /// Sent and received calls, ordered by time.
    pub async fn list_morning_calls(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
    ) -> UsecaseResult<Vec<MorningCall>> {
        ensure_active(cancel)?;
        self.repos.users.find_by_id(cancel, user_id).await?;
        self.repos.calls_for(cancel, user_id).await
    }

    /// Sender-only edit of a scheduled call; the result is re-validated.
    pub async fn update_morning_call(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
        update: MorningCallUpdate,
    ) -> UsecaseResult<MorningCall> {
        const ACTION: &str = "update morning call";
        ensure_active(cancel)?;
        let mut call = self.repos.morning_calls.find_by_id(cancel, &update.id).await?;
        check(call.can_update(user_id), ACTION, user_id)?;

        call.apply(&update);
        check(self.validate_content(&call), ACTION, user_id)?;
        if update.time.is_some() {
            check(self.check_duplicate(cancel, &call).await?, ACTION, user_id)?;
        }

        self.repos.morning_calls.update(cancel, call.clone()).await?;
        log::info!("{user_id} updated morning call {}", call.id);
        Ok(call)
    }

    /// Removes a scheduled call. Either party may delete.
    pub async fn delete_morning_call(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
        id: &MorningCallId,
    ) -> UsecaseResult<()> {
        const ACTION: &str = "delete morning call";
        ensure_active(cancel)?;
        let call = self.repos.morning_calls.find_by_id(cancel, id).await?;
        check(call.can_delete(user_id), ACTION, user_id)?;
        self.repos.morning_calls.delete(cancel, id).await?;
        log::info!("{user_id} deleted morning call {id}");
        Ok(())
    }

    /// Marks a call whose time has passed as completed.
    pub async fn complete_morning_call(
        &self,
        cancel: &CancellationToken,
        id: &MorningCallId,
    ) -> UsecaseResult<MorningCall> {
        ensure_active(cancel)?;
        let mut call = self.repos.morning_calls.find_by_id(cancel, id).await?;
        let completed = call.complete_at(self.deps.clock.now());
        check(completed, "complete morning call", &call.sender_id)?;
        self.repos.morning_calls.update(cancel, call.clone()).await?;
        log::info!("morning call {id} completed");
        Ok(call)
    }
}
