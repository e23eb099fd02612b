//! Closed set of reasons a business rule can refuse an operation.
//!
//! Entity predicates return `Result<(), NgReason>`: `Ok(())` means the
//! operation is allowed, `Err(reason)` names why it is not. They never panic
//! and never mutate on refusal.

use thiserror::Error;

use crate::errors::ErrorKind;

/// Outcome of a business-rule check.
pub type Check = Result<(), NgReason>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum NgReason {
    // Friend policy
    #[error("not a friend")]
    NotFriend,
    #[error("already friends")]
    AlreadyFriend,
    #[error("friend request already sent")]
    AlreadyRequested,
    #[error("user is already blocked")]
    AlreadyBlocked,
    #[error("blocked by this user")]
    Blocked,
    #[error("you are blocking this user")]
    BlockedByUser,
    #[error("user is not blocked")]
    NotBlocked,
    #[error("user not found")]
    UserNotFound,
    #[error("cannot operate on yourself")]
    SelfOperation,
    #[error("no permission")]
    NoPermission,
    #[error("invalid status")]
    InvalidStatus,

    // Relationship state machine
    #[error("invalid relationship status")]
    InvalidRelationshipStatus,
    #[error("invalid status transition")]
    InvalidStatusTransition,
    #[error("not the receiver")]
    NotReceiver,

    // Morning calls
    #[error("scheduled time has not passed yet")]
    InvalidTime,
    #[error("cannot schedule in the past")]
    PastTime,
    #[error("scheduled time is too far in the future")]
    TooFarInFuture,
    #[error("already completed")]
    AlreadyCompleted,
    #[error("already deleted")]
    AlreadyDeleted,
    #[error("not the sender")]
    NotSender,
    #[error("a morning call is already scheduled at this time")]
    DuplicateSchedule,
    #[error("message is too long")]
    MessageTooLong,

    // Input validation
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid username")]
    InvalidUsername,
    #[error("username is too short")]
    UsernameTooShort,
    #[error("username is too long")]
    UsernameTooLong,
    #[error("invalid parameter")]
    InvalidParameter,
}

impl NgReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            NgReason::NotFriend => "not_friend",
            NgReason::AlreadyFriend => "already_friend",
            NgReason::AlreadyRequested => "already_requested",
            NgReason::AlreadyBlocked => "already_blocked",
            NgReason::Blocked => "blocked",
            NgReason::BlockedByUser => "blocked_by_user",
            NgReason::NotBlocked => "not_blocked",
            NgReason::UserNotFound => "user_not_found",
            NgReason::SelfOperation => "self_operation",
            NgReason::NoPermission => "no_permission",
            NgReason::InvalidStatus => "invalid_status",
            NgReason::InvalidRelationshipStatus => "invalid_relationship_status",
            NgReason::InvalidStatusTransition => "invalid_status_transition",
            NgReason::NotReceiver => "not_receiver",
            NgReason::InvalidTime => "invalid_time",
            NgReason::PastTime => "past_time",
            NgReason::TooFarInFuture => "too_far_in_future",
            NgReason::AlreadyCompleted => "already_completed",
            NgReason::AlreadyDeleted => "already_deleted",
            NgReason::NotSender => "not_sender",
            NgReason::DuplicateSchedule => "duplicate_schedule",
            NgReason::MessageTooLong => "message_too_long",
            NgReason::InvalidEmail => "invalid_email",
            NgReason::InvalidUsername => "invalid_username",
            NgReason::UsernameTooShort => "username_too_short",
            NgReason::UsernameTooLong => "username_too_long",
            NgReason::InvalidParameter => "invalid_parameter",
        }
    }

    /// Error kind a use case reports when it refuses with this reason.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NgReason::NotFriend
            | NgReason::Blocked
            | NgReason::BlockedByUser
            | NgReason::NoPermission
            | NgReason::NotSender
            | NgReason::NotReceiver => ErrorKind::Authorization,
            NgReason::AlreadyFriend
            | NgReason::AlreadyRequested
            | NgReason::AlreadyBlocked
            | NgReason::AlreadyCompleted
            | NgReason::AlreadyDeleted
            | NgReason::DuplicateSchedule => ErrorKind::Conflict,
            NgReason::UserNotFound | NgReason::NotBlocked => ErrorKind::NotFound,
            NgReason::SelfOperation | NgReason::InvalidParameter => ErrorKind::BadRequest,
            NgReason::InvalidStatus
            | NgReason::InvalidRelationshipStatus
            | NgReason::InvalidStatusTransition
            | NgReason::InvalidTime
            | NgReason::PastTime
            | NgReason::TooFarInFuture
            | NgReason::MessageTooLong
            | NgReason::InvalidEmail
            | NgReason::InvalidUsername
            | NgReason::UsernameTooShort
            | NgReason::UsernameTooLong => ErrorKind::Validation,
        }
    }
}
