//! Multi-aggregate operations.
//!
//! A use case loads aggregates from the repositories, asks the entities
//! whether an operation is legal, mutates, and writes back. The relationship
//! repository is the only record of friendship; `User::related_users` is
//! projected from it on every read.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::call::MorningCall;
use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::errors::DomainError;
use crate::id::{IdGenerator, UserId, UuidGenerator};
use crate::reason::{Check, NgReason};
use crate::repository::{
    InMemoryMorningCallRepository, InMemoryRelationshipRepository, InMemoryUserRepository, MorningCallRepository,
    RelationshipRepository, UserRepository,
};
use crate::user::User;
use crate::validators::{DefaultValidator, InputValidator};

mod morning_call;
mod user;

pub use morning_call::MorningCallUsecase;
pub use user::UserUsecase;

pub type UsecaseResult<T> = Result<T, DomainError>;

/// Repository handles shared by every use case.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub relationships: Arc<dyn RelationshipRepository>,
    pub morning_calls: Arc<dyn MorningCallRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            relationships: Arc::new(InMemoryRelationshipRepository::new()),
            morning_calls: Arc::new(InMemoryMorningCallRepository::new()),
        }
    }

    /// Loads a user with `related_users` projected from its relationships.
    pub(crate) async fn user_view(&self, cancel: &CancellationToken, id: &UserId) -> UsecaseResult<User> {
        let user = self.users.find_by_id(cancel, id).await?;
        let relationships = self.relationships.find_by_user(cancel, id).await?;
        Ok(user.with_relationships(&relationships))
    }

    /// Sent and received calls of `user_id`, ordered by time then id.
    pub(crate) async fn calls_for(
        &self,
        cancel: &CancellationToken,
        user_id: &UserId,
    ) -> UsecaseResult<Vec<MorningCall>> {
        let mut calls = self.morning_calls.list_by_sender_id(cancel, user_id).await?;
        for call in self.morning_calls.list_by_receiver_id(cancel, user_id).await? {
            if !calls.iter().any(|seen| seen.id == call.id) {
                calls.push(call);
            }
        }
        calls.sort_by(|a, b| (a.time, &a.id).cmp(&(b.time, &b.id)));
        Ok(calls)
    }
}

/// Outbound collaborators injected into the use cases.
#[derive(Clone)]
pub struct Collaborators {
    pub validator: Arc<dyn InputValidator>,
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            validator: Arc::new(DefaultValidator::new(&config.users)),
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn InputValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}

/// Both use cases over one set of repositories.
#[derive(Clone)]
pub struct Usecases {
    pub users: UserUsecase,
    pub morning_calls: MorningCallUsecase,
}

impl Usecases {
    pub fn new(repos: Repositories, collaborators: Collaborators, config: &CoreConfig) -> Self {
        Self {
            users: UserUsecase::new(repos.clone(), collaborators.clone()),
            morning_calls: MorningCallUsecase::new(repos, collaborators, config.scheduling.clone()),
        }
    }

    /// Fresh in-memory store with the default collaborators.
    pub fn in_memory(config: &CoreConfig) -> Self {
        Self::new(Repositories::in_memory(), Collaborators::from_config(config), config)
    }
}

pub(crate) fn ensure_active(cancel: &CancellationToken) -> UsecaseResult<()> {
    if cancel.is_cancelled() {
        return Err(DomainError::cancelled());
    }
    Ok(())
}

/// Turns a refused business rule into a `DomainError`, logging the refusal.
pub(crate) fn check(result: Check, action: &str, actor: &UserId) -> UsecaseResult<()> {
    result.map_err(|reason| reject(reason, action, actor))
}

pub(crate) fn reject(reason: NgReason, action: &str, actor: &UserId) -> DomainError {
    log::warn!("{action} by {actor} rejected: {}", reason.code());
    DomainError::rejected(reason, action).with_detail("actor", actor)
}
