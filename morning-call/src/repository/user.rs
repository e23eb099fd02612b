use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::{RepoResult, UserRepository, ensure_active, require_key};
use crate::errors::RepoError;
use crate::id::{EntityId, UserId};
use crate::user::User;
use crate::validators::normalize_email;

const ENTITY: &str = UserId::ENTITY;

#[derive(Default)]
struct Tables {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
}

/// Users keyed by id with a unique index on the normalised email.
///
/// Stored users never carry `related_users` or `morning_calls`; those are
/// projected by the use cases on read.
#[derive(Default)]
pub struct InMemoryUserRepository {
    tables: RwLock<Tables>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn stripped(mut user: User) -> User {
    user.related_users.clear();
    user.morning_calls.clear();
    user
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, cancel: &CancellationToken, user: User) -> RepoResult<()> {
        ensure_active(cancel)?;
        require_key(ENTITY, user.id.as_str())?;
        let email = normalize_email(&user.email);

        let mut tables = self.tables.write().await;
        if tables.by_id.contains_key(&user.id) {
            return Err(RepoError::already_exists(ENTITY, &user.id));
        }
        if tables.by_email.contains_key(&email) {
            return Err(RepoError::already_exists(ENTITY, &email));
        }
        tables.by_email.insert(email, user.id.clone());
        log::debug!("user {} created", user.id);
        tables.by_id.insert(user.id.clone(), stripped(user));
        Ok(())
    }

    async fn find_by_id(&self, cancel: &CancellationToken, id: &UserId) -> RepoResult<User> {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        tables.by_id.get(id).cloned().ok_or_else(|| RepoError::not_found(ENTITY, id))
    }

    async fn find_by_email(&self, cancel: &CancellationToken, email: &str) -> RepoResult<User> {
        ensure_active(cancel)?;
        let email = normalize_email(email);
        let tables = self.tables.read().await;
        tables
            .by_email
            .get(&email)
            .and_then(|id| tables.by_id.get(id))
            .cloned()
            .ok_or_else(|| RepoError::not_found(ENTITY, &email))
    }

    async fn update(&self, cancel: &CancellationToken, user: User) -> RepoResult<()> {
        ensure_active(cancel)?;
        let email = normalize_email(&user.email);

        let mut tables = self.tables.write().await;
        let Some(previous_email) = tables.by_id.get(&user.id).map(|existing| normalize_email(&existing.email)) else {
            return Err(RepoError::not_found(ENTITY, &user.id));
        };
        if previous_email != email {
            if tables.by_email.get(&email).is_some_and(|holder| holder != &user.id) {
                return Err(RepoError::already_exists(ENTITY, &email));
            }
            tables.by_email.remove(&previous_email);
            tables.by_email.insert(email, user.id.clone());
        }
        log::debug!("user {} updated", user.id);
        tables.by_id.insert(user.id.clone(), stripped(user));
        Ok(())
    }

    async fn list(&self, cancel: &CancellationToken) -> RepoResult<Vec<User>> {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.by_id.values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }
}
