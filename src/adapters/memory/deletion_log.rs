//! In-memory deletion log.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::canvas::DeletionRecord;
use crate::domain::foundation::{DeletionRecordId, DomainError, EntityId, Timestamp};
use crate::ports::DeletionLog;

/// Records keyed by original entity id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeletionLog {
    records: Arc<RwLock<HashMap<EntityId, DeletionRecord>>>,
}

impl InMemoryDeletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DeletionLog for InMemoryDeletionLog {
    async fn record(&self, record: &DeletionRecord) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(record.original_id()) {
            return Ok(false);
        }
        records.insert(*record.original_id(), record.clone());
        Ok(true)
    }

    async fn find_by_id(
        &self,
        id: &DeletionRecordId,
    ) -> Result<Option<DeletionRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.values().find(|r| r.id() == id).cloned())
    }

    async fn find_by_original_id(
        &self,
        original_id: &EntityId,
    ) -> Result<Option<DeletionRecord>, DomainError> {
        Ok(self.records.read().await.get(original_id).cloned())
    }

    async fn list(&self) -> Result<Vec<DeletionRecord>, DomainError> {
        let records = self.records.read().await;
        let mut listed: Vec<DeletionRecord> = records.values().cloned().collect();
        listed.sort_by(|a, b| b.deleted_at().cmp(a.deleted_at()));
        Ok(listed)
    }

    async fn mark_restored(
        &self,
        id: &DeletionRecordId,
        restored_as: &EntityId,
        at: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        let Some(record) = records.values_mut().find(|r| r.id() == id) else {
            return Ok(false);
        };
        if record.is_restored() {
            return Ok(false);
        }
        *record = DeletionRecord::reconstitute(
            *record.id(),
            *record.original_id(),
            record.entity_snapshot().clone(),
            record.reason(),
            record.deleted_by().clone(),
            *record.deleted_at(),
            Some(at),
            Some(*restored_as),
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::canvas::{EntityKind, TextBlock, VotableEntity};
    use crate::domain::foundation::UserId;

    fn record() -> DeletionRecord {
        let entity = VotableEntity::new(
            EntityKind::TextBlock(TextBlock::new("gone", 0.0, 0.0).unwrap()),
            UserId::new("author").unwrap(),
        );
        DeletionRecord::for_vote(&entity, UserId::new("v").unwrap())
    }

    #[tokio::test]
    async fn record_is_idempotent_per_original_id() {
        let log = InMemoryDeletionLog::new();
        let first = record();
        let dup = DeletionRecord::for_vote(first.entity_snapshot(), UserId::new("w").unwrap());

        assert!(log.record(&first).await.unwrap());
        assert!(!log.record(&dup).await.unwrap());
        assert_eq!(log.len().await, 1);
        let stored = log.find_by_original_id(first.original_id()).await.unwrap().unwrap();
        assert_eq!(stored.id(), first.id());
    }

    #[tokio::test]
    async fn mark_restored_succeeds_once() {
        let log = InMemoryDeletionLog::new();
        let r = record();
        log.record(&r).await.unwrap();
        let new_id = EntityId::new();

        assert!(log.mark_restored(r.id(), &new_id, Timestamp::now()).await.unwrap());
        assert!(!log.mark_restored(r.id(), &new_id, Timestamp::now()).await.unwrap());

        let stored = log.find_by_id(r.id()).await.unwrap().unwrap();
        assert_eq!(stored.restored_as(), Some(&new_id));
    }
}
