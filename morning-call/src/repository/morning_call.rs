use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::{MorningCallRepository, RepoResult, ensure_active, require_key};
use crate::call::MorningCall;
use crate::errors::RepoError;
use crate::id::{EntityId, MorningCallId, UserId};

const ENTITY: &str = MorningCallId::ENTITY;

#[derive(Default)]
struct Tables {
    by_id: HashMap<MorningCallId, MorningCall>,
    by_sender: HashMap<UserId, BTreeSet<MorningCallId>>,
    by_receiver: HashMap<UserId, BTreeSet<MorningCallId>>,
}

fn link(index: &mut HashMap<UserId, BTreeSet<MorningCallId>>, user: &UserId, id: &MorningCallId) {
    index.entry(user.clone()).or_default().insert(id.clone());
}

fn unlink(index: &mut HashMap<UserId, BTreeSet<MorningCallId>>, user: &UserId, id: &MorningCallId) {
    if let Some(ids) = index.get_mut(user) {
        ids.remove(id);
        if ids.is_empty() {
            index.remove(user);
        }
    }
}

impl Tables {
    fn index(&mut self, call: &MorningCall) {
        link(&mut self.by_sender, &call.sender_id, &call.id);
        link(&mut self.by_receiver, &call.receiver_id, &call.id);
    }

    fn unindex(&mut self, call: &MorningCall) {
        unlink(&mut self.by_sender, &call.sender_id, &call.id);
        unlink(&mut self.by_receiver, &call.receiver_id, &call.id);
    }

    fn listed(&self, index: &HashMap<UserId, BTreeSet<MorningCallId>>, user: &UserId) -> Vec<MorningCall> {
        let mut calls: Vec<MorningCall> = index
            .get(user)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
            .cloned()
            .collect();
        calls.sort_by(|a, b| (a.time, &a.id).cmp(&(b.time, &b.id)));
        calls
    }
}

/// Morning calls keyed by id, indexed by sender and by receiver.
#[derive(Default)]
pub struct InMemoryMorningCallRepository {
    tables: RwLock<Tables>,
}

impl InMemoryMorningCallRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MorningCallRepository for InMemoryMorningCallRepository {
    async fn save(&self, cancel: &CancellationToken, call: MorningCall) -> RepoResult<()> {
        ensure_active(cancel)?;
        require_key(ENTITY, call.id.as_str())?;

        let mut tables = self.tables.write().await;
        if tables.by_id.contains_key(&call.id) {
            return Err(RepoError::already_exists(ENTITY, &call.id));
        }
        tables.index(&call);
        log::debug!("morning call {} saved: {} -> {} at {}", call.id, call.sender_id, call.receiver_id, call.time);
        tables.by_id.insert(call.id.clone(), call);
        Ok(())
    }

    async fn find_by_id(&self, cancel: &CancellationToken, id: &MorningCallId) -> RepoResult<MorningCall> {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        tables.by_id.get(id).cloned().ok_or_else(|| RepoError::not_found(ENTITY, id))
    }

    async fn update(&self, cancel: &CancellationToken, call: MorningCall) -> RepoResult<()> {
        ensure_active(cancel)?;
        let mut tables = self.tables.write().await;
        let Some(previous) = tables.by_id.get(&call.id).cloned() else {
            return Err(RepoError::not_found(ENTITY, &call.id));
        };
        tables.unindex(&previous);
        tables.index(&call);
        log::debug!("morning call {} updated ({} -> {})", call.id, previous.status, call.status);
        tables.by_id.insert(call.id.clone(), call);
        Ok(())
    }

    async fn delete(&self, cancel: &CancellationToken, id: &MorningCallId) -> RepoResult<()> {
        ensure_active(cancel)?;
        let mut tables = self.tables.write().await;
        let Some(call) = tables.by_id.remove(id) else {
            return Err(RepoError::not_found(ENTITY, id));
        };
        tables.unindex(&call);
        log::debug!("morning call {id} deleted");
        Ok(())
    }

    async fn list_by_sender_id(&self, cancel: &CancellationToken, sender: &UserId) -> RepoResult<Vec<MorningCall>> {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        Ok(tables.listed(&tables.by_sender, sender))
    }

    async fn list_by_receiver_id(
        &self,
        cancel: &CancellationToken,
        receiver: &UserId,
    ) -> RepoResult<Vec<MorningCall>> {
        ensure_active(cancel)?;
        let tables = self.tables.read().await;
        Ok(tables.listed(&tables.by_receiver, receiver))
    }
}
