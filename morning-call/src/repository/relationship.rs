use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::{RelationshipRepository, RepoResult, ensure_active, require_key};
use crate::errors::RepoError;
use crate::id::{EntityId, RelationshipId, UserId};
use crate::relationship::Relationship;
use crate::types::RelationshipStatus;

const ENTITY: &str = RelationshipId::ENTITY;

#[derive(Default)]
struct Tables {
    by_id: HashMap<RelationshipId, Relationship>,
    by_pair: HashMap<(UserId, UserId), RelationshipId>,
    by_user: HashMap<UserId, BTreeSet<RelationshipId>>,
}

impl Tables {
    fn index(&mut self, rel: &Relationship) {
        self.by_pair.insert(rel.pair(), rel.id().clone());
        for user in [rel.requester_id(), rel.receiver_id()] {
            self.by_user.entry(user.clone()).or_default().insert(rel.id().clone());
        }
    }

    fn unindex(&mut self, rel: &Relationship) {
        if self.by_pair.get(&rel.pair()) == Some(rel.id()) {
            self.by_pair.remove(&rel.pair());
        }
        for user in [rel.requester_id(), rel.receiver_id()] {
            if let Some(ids) = self.by_user.get_mut(user) {
                ids.remove(rel.id());
                if ids.is_empty() {
                    self.by_user.remove(user);
                }
            }
        }
    }

    fn remove(&mut self, id: &RelationshipId) -> Option<Relationship> {
        let rel = self.by_id.remove(id)?;
        self.unindex(&rel);
        Some(rel)
    }

    fn for_user(&self, user: &UserId) -> impl Iterator<Item = &Relationship> {
        self.by_user
            .get(user)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }
}

/// Ordered by creation time, then id.
fn sorted(mut rels: Vec<Relationship>) -> Vec<Relationship> {
    rels.sort_by(|a, b| (a.created_at(), a.id()).cmp(&(b.created_at(), b.id())));
    rels
}

fn pair_key(requester: &UserId, receiver: &UserId) -> String {
    format!("{requester}:{receiver}")
}

#[derive(Default)]
pub struct InMemoryRelationshipRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRelationshipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn collect<F>(&self, cancel: &CancellationToken, user: &UserId, keep: F) -> RepoResult<Vec<Relationship>>
    where
        F: Fn(&Relationship) -> bool + Send,
    {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        let rels = tables.for_user(user).filter(|rel| keep(rel)).cloned().collect();
        Ok(sorted(rels))
    }
}

#[async_trait]
impl RelationshipRepository for InMemoryRelationshipRepository {
    async fn create(&self, cancel: &CancellationToken, relationship: Relationship) -> RepoResult<()> {
        ensure_active(cancel)?;
        require_key(ENTITY, relationship.id().as_str())?;
        if relationship.requester_id().is_empty() || relationship.receiver_id().is_empty() {
            return Err(RepoError::InvalidRequest {
                message: "relationship participants are required".into(),
            });
        }

        let mut tables = self.tables.write().await;
        if tables.by_id.contains_key(relationship.id()) {
            return Err(RepoError::already_exists(ENTITY, relationship.id()));
        }
        if tables.by_pair.contains_key(&relationship.pair()) {
            return Err(RepoError::already_exists(
                ENTITY,
                pair_key(relationship.requester_id(), relationship.receiver_id()),
            ));
        }
        tables.index(&relationship);
        log::debug!(
            "relationship {} created: {} -> {} ({})",
            relationship.id(),
            relationship.requester_id(),
            relationship.receiver_id(),
            relationship.status()
        );
        tables.by_id.insert(relationship.id().clone(), relationship);
        Ok(())
    }

    async fn find_by_id(&self, cancel: &CancellationToken, id: &RelationshipId) -> RepoResult<Relationship> {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        tables.by_id.get(id).cloned().ok_or_else(|| RepoError::not_found(ENTITY, id))
    }

    async fn find_by_users(
        &self,
        cancel: &CancellationToken,
        requester: &UserId,
        receiver: &UserId,
    ) -> RepoResult<Relationship> {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        tables
            .by_pair
            .get(&(requester.clone(), receiver.clone()))
            .and_then(|id| tables.by_id.get(id))
            .cloned()
            .ok_or_else(|| RepoError::not_found(ENTITY, pair_key(requester, receiver)))
    }

    async fn find_all_by_users(
        &self,
        cancel: &CancellationToken,
        a: &UserId,
        b: &UserId,
    ) -> RepoResult<Vec<Relationship>> {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        let mut pairs = vec![(a.clone(), b.clone())];
        if a != b {
            pairs.push((b.clone(), a.clone()));
        }
        let rels = pairs
            .iter()
            .filter_map(|pair| tables.by_pair.get(pair))
            .filter_map(|id| tables.by_id.get(id))
            .cloned()
            .collect();
        Ok(sorted(rels))
    }

    async fn find_by_user(&self, cancel: &CancellationToken, user: &UserId) -> RepoResult<Vec<Relationship>> {
        self.collect(cancel, user, |_| true).await
    }

    async fn find_by_user_with_status(
        &self,
        cancel: &CancellationToken,
        user: &UserId,
        status: RelationshipStatus,
    ) -> RepoResult<Vec<Relationship>> {
        self.collect(cancel, user, |rel| rel.status() == status).await
    }

    async fn find_by_requester(&self, cancel: &CancellationToken, user: &UserId) -> RepoResult<Vec<Relationship>> {
        self.collect(cancel, user, |rel| rel.requester_id() == user).await
    }

    async fn find_by_receiver(&self, cancel: &CancellationToken, user: &UserId) -> RepoResult<Vec<Relationship>> {
        self.collect(cancel, user, |rel| rel.receiver_id() == user).await
    }

    async fn update(&self, cancel: &CancellationToken, relationship: Relationship) -> RepoResult<()> {
        ensure_active(cancel)?;
        let mut tables = self.tables.write().await;
        let Some(previous) = tables.by_id.get(relationship.id()).cloned() else {
            return Err(RepoError::not_found(ENTITY, relationship.id()));
        };

        if previous.pair() != relationship.pair()
            && let Some(holder) = tables.by_pair.get(&relationship.pair())
            && holder != relationship.id()
        {
            return Err(RepoError::already_exists(
                ENTITY,
                pair_key(relationship.requester_id(), relationship.receiver_id()),
            ));
        }

        tables.unindex(&previous);
        tables.index(&relationship);
        log::debug!(
            "relationship {} updated: {} -> {} ({} -> {})",
            relationship.id(),
            relationship.requester_id(),
            relationship.receiver_id(),
            previous.status(),
            relationship.status()
        );
        tables.by_id.insert(relationship.id().clone(), relationship);
        Ok(())
    }

    async fn delete(&self, cancel: &CancellationToken, id: &RelationshipId) -> RepoResult<()> {
        ensure_active(cancel)?;
        let mut tables = self.tables.write().await;
        match tables.remove(id) {
            Some(_) => {
                log::debug!("relationship {id} deleted");
                Ok(())
            }
            None => Err(RepoError::not_found(ENTITY, id)),
        }
    }

    async fn delete_by_users(
        &self,
        cancel: &CancellationToken,
        requester: &UserId,
        receiver: &UserId,
    ) -> RepoResult<()> {
        ensure_active(cancel)?;
        let mut tables = self.tables.write().await;
        let Some(id) = tables.by_pair.get(&(requester.clone(), receiver.clone())).cloned() else {
            return Err(RepoError::not_found(ENTITY, pair_key(requester, receiver)));
        };
        tables.remove(&id);
        log::debug!("relationship {id} deleted ({requester} -> {receiver})");
        Ok(())
    }

    async fn exists_by_users(
        &self,
        cancel: &CancellationToken,
        requester: &UserId,
        receiver: &UserId,
    ) -> RepoResult<bool> {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        Ok(tables.by_pair.contains_key(&(requester.clone(), receiver.clone())))
    }

    async fn count(&self, cancel: &CancellationToken) -> RepoResult<usize> {
        ensure_active(cancel)?;
        Ok(self.tables.read().await.by_id.len())
    }
}
