//! Scheduled wake-up call and its lifecycle rules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{MorningCallId, UserId};
use crate::reason::{Check, NgReason};
use crate::types::MorningCallStatus;

/// Default scheduling horizon in days.
pub const DEFAULT_MAX_DAYS_AHEAD: i64 = 30;
/// Default message length limit, counted in characters.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 280;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorningCall {
    pub id: MorningCallId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub time: DateTime<Utc>,
    pub message: String,
    pub status: MorningCallStatus,
}

/// Sender-side edit of a scheduled call. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorningCallUpdate {
    pub id: MorningCallId,
    pub time: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl MorningCallUpdate {
    pub fn new(id: MorningCallId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_none() && self.message.is_none()
    }
}

impl MorningCall {
    /// New call in `Scheduled` status.
    pub fn new(
        id: MorningCallId,
        sender_id: UserId,
        receiver_id: UserId,
        time: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id,
            sender_id,
            receiver_id,
            time,
            message: message.into(),
            status: MorningCallStatus::Scheduled,
        }
    }

    pub fn is_sender(&self, user: &UserId) -> bool {
        &self.sender_id == user
    }

    pub fn is_receiver(&self, user: &UserId) -> bool {
        &self.receiver_id == user
    }

    pub fn involves_user(&self, user: &UserId) -> bool {
        self.is_sender(user) || self.is_receiver(user)
    }

    /// Only the sender edits, and only while the call is scheduled.
    pub fn can_update(&self, user: &UserId) -> Check {
        if !self.is_sender(user) {
            return Err(NgReason::NotSender);
        }
        self.status.locked_reason().map_or(Ok(()), Err)
    }

    /// Either party may delete a scheduled call.
    pub fn can_delete(&self, user: &UserId) -> Check {
        if !self.involves_user(user) {
            return Err(NgReason::NoPermission);
        }
        self.status.locked_reason().map_or(Ok(()), Err)
    }

    pub fn validate_scheduled_time(&self) -> Check {
        self.validate_scheduled_time_at(Utc::now())
    }

    /// `time` must fall in `(now, now + 30 days]`.
    pub fn validate_scheduled_time_at(&self, now: DateTime<Utc>) -> Check {
        self.validate_scheduled_time_within(now, Duration::days(DEFAULT_MAX_DAYS_AHEAD))
    }

    pub fn validate_scheduled_time_within(&self, now: DateTime<Utc>, horizon: Duration) -> Check {
        if self.time <= now {
            return Err(NgReason::PastTime);
        }
        if self.time > now + horizon {
            return Err(NgReason::TooFarInFuture);
        }
        Ok(())
    }

    pub fn validate_message(&self, max_chars: usize) -> Check {
        if self.message.chars().count() > max_chars {
            return Err(NgReason::MessageTooLong);
        }
        Ok(())
    }

    pub fn can_complete(&self) -> Check {
        self.can_complete_at(Utc::now())
    }

    pub fn can_complete_at(&self, now: DateTime<Utc>) -> Check {
        if let Some(reason) = self.status.locked_reason() {
            return Err(reason);
        }
        if self.time > now {
            return Err(NgReason::InvalidTime);
        }
        Ok(())
    }

    pub fn complete(&mut self) -> Check {
        self.complete_at(Utc::now())
    }

    pub fn complete_at(&mut self, now: DateTime<Utc>) -> Check {
        self.can_complete_at(now)?;
        self.status = MorningCallStatus::Completed;
        Ok(())
    }

    /// Applies an update after [`can_update`](Self::can_update) has passed.
    /// Time and message still need validating afterwards.
    pub fn apply(&mut self, update: &MorningCallUpdate) {
        if let Some(time) = update.time {
            self.time = time;
        }
        if let Some(message) = &update.message {
            self.message.clone_from(message);
        }
    }
}
