//! Core of the morning-call service.
//!
//! Friend relationships and scheduled wake-up calls between users, kept in
//! concurrent in-memory repositories and driven through the use cases in
//! [`usecase`].

extern crate self as morning_call;

pub mod call;
pub mod clock;
pub mod config;
pub mod errors;
pub mod id;
pub mod reason;
pub mod relationship;
pub mod repository;
pub mod types;
pub mod usecase;
pub mod user;
pub mod validators;

pub use morning_call_macros::EntityId;

pub use call::{MorningCall, MorningCallUpdate};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CoreConfig;
pub use errors::{DomainError, ErrorKind, RepoError, ValidationError, ValidationIssue};
pub use id::{EntityId, IdGenerator, MorningCallId, RelationshipId, SequenceGenerator, UserId, UuidGenerator};
pub use reason::{Check, NgReason};
pub use relationship::Relationship;
pub use types::{MorningCallStatus, RelatedUserStatus, RelationshipStatus};
pub use usecase::{Collaborators, MorningCallUsecase, Repositories, UserUsecase, Usecases};
pub use user::{RelatedUser, User};
pub use validators::{DefaultValidator, InputValidator};

pub use tokio_util::sync::CancellationToken;
