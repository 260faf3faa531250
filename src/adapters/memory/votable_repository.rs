//! In-memory votable entity store.
//!
//! `apply_delta` runs under a single write guard, so the membership change
//! and the brightness step land together.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::canvas::{EntityKindTag, VotableEntity};
use crate::domain::foundation::{DomainError, EntityId, UserId};
use crate::domain::voting::LedgerDelta;
use crate::ports::{AppliedDelta, VotableRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemoryVotableRepository {
    entities: Arc<RwLock<HashMap<EntityId, VotableEntity>>>,
}

impl InMemoryVotableRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

#[async_trait]
impl VotableRepository for InMemoryVotableRepository {
    async fn save(&self, entity: &VotableEntity) -> Result<(), DomainError> {
        self.entities
            .write()
            .await
            .insert(*entity.id(), entity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<VotableEntity>, DomainError> {
        Ok(self.entities.read().await.get(id).cloned())
    }

    async fn list(&self, kind: Option<EntityKindTag>) -> Result<Vec<VotableEntity>, DomainError> {
        let entities = self.entities.read().await;
        let mut listed: Vec<VotableEntity> = entities
            .values()
            .filter(|e| kind.map_or(true, |k| e.kind_tag() == k))
            .cloned()
            .collect();
        listed.sort_by(|a, b| {
            a.created_at()
                .cmp(b.created_at())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });
        Ok(listed)
    }

    async fn apply_delta(
        &self,
        id: &EntityId,
        delta: &LedgerDelta,
    ) -> Result<Option<AppliedDelta>, DomainError> {
        let mut entities = self.entities.write().await;
        Ok(entities.get_mut(id).map(|entity| {
            let brightness_before = entity.brightness();
            entity.apply_delta(delta);
            AppliedDelta {
                brightness_before,
                entity: entity.clone(),
            }
        }))
    }

    async fn delete(&self, id: &EntityId) -> Result<bool, DomainError> {
        Ok(self.entities.write().await.remove(id).is_some())
    }

    async fn find_voted_by(&self, voter: &UserId) -> Result<Vec<VotableEntity>, DomainError> {
        let entities = self.entities.read().await;
        Ok(entities
            .values()
            .filter(|e| e.ledger().contains(voter))
            .cloned()
            .collect())
    }
}
