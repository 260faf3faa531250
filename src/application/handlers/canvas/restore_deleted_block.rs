//! Admin operations on the deletion log: listing records and restoring a
//! deleted text block as a new entity.

use std::sync::Arc;

use crate::domain::canvas::{CanvasError, DeletionRecord, EntityKindTag, EntityRestored, VotableEntity};
use crate::domain::foundation::{
    AdminRoster, CommandMetadata, DeletionRecordId, EventEnvelope, EventId, Timestamp, UserId,
};
use crate::ports::{DeletionLog, EventPublisher, VotableRepository};

/// Command to restore a deleted text block.
#[derive(Debug, Clone)]
pub struct RestoreDeletedBlockCommand {
    pub record_id: DeletionRecordId,
    pub restored_by: UserId,
}

#[derive(Debug, Clone)]
pub struct RestoreDeletedBlockResult {
    /// The new entity: fresh id, brightness 50, empty ledger.
    pub entity: VotableEntity,
    pub record: DeletionRecord,
    pub event: EntityRestored,
}

/// Handler for restoring deleted text blocks. Admin only.
///
/// A record can be restored once. Two concurrent restores race on
/// `mark_restored`; the loser removes the entity it created.
pub struct RestoreDeletedBlockHandler {
    repository: Arc<dyn VotableRepository>,
    deletion_log: Arc<dyn DeletionLog>,
    event_publisher: Arc<dyn EventPublisher>,
    admins: Arc<AdminRoster>,
}

impl RestoreDeletedBlockHandler {
    pub fn new(
        repository: Arc<dyn VotableRepository>,
        deletion_log: Arc<dyn DeletionLog>,
        event_publisher: Arc<dyn EventPublisher>,
        admins: Arc<AdminRoster>,
    ) -> Self {
        Self {
            repository,
            deletion_log,
            event_publisher,
            admins,
        }
    }

    pub async fn handle(
        &self,
        cmd: RestoreDeletedBlockCommand,
        metadata: CommandMetadata,
    ) -> Result<RestoreDeletedBlockResult, CanvasError> {
        // 1. Authorize
        self.admins.require_admin(&cmd.restored_by).map_err(|err| {
            tracing::warn!(user_id = %cmd.restored_by, "restore denied");
            CanvasError::from(err)
        })?;

        // 2. Load record
        let mut record = self
            .deletion_log
            .find_by_id(&cmd.record_id)
            .await?
            .ok_or(CanvasError::RecordNotFound(cmd.record_id))?;

        if record.entity_snapshot().kind_tag() != EntityKindTag::TextBlock {
            return Err(CanvasError::invalid_state(
                "only text blocks can be restored from the deletion log",
            ));
        }

        // 3. Build the replacement (fails if already restored)
        let entity = record.restore(cmd.restored_by.clone())?;
        let restored_at = record.restored_at().copied().unwrap_or_else(Timestamp::now);

        // 4. Persist entity, then claim the record
        self.repository.save(&entity).await?;
        let claimed = self
            .deletion_log
            .mark_restored(record.id(), entity.id(), restored_at)
            .await?;
        if !claimed {
            self.repository.delete(entity.id()).await?;
            return Err(CanvasError::invalid_state(format!(
                "Deletion record {} was already restored",
                cmd.record_id
            )));
        }

        // 5. Publish
        let event = EntityRestored {
            event_id: EventId::new(),
            entity_id: *entity.id(),
            original_id: *record.original_id(),
            deletion_record_id: *record.id(),
            restored_by: cmd.restored_by,
            restored_at,
        };
        self.event_publisher
            .publish(metadata.stamp(EventEnvelope::from_event(&event)))
            .await?;

        tracing::info!(
            entity_id = %entity.id(),
            original_id = %record.original_id(),
            "text block restored"
        );

        Ok(RestoreDeletedBlockResult {
            entity,
            record,
            event,
        })
    }
}

/// Lists the deletion log, most recent first. Admin only.
#[derive(Debug, Clone)]
pub struct ListDeletionsQuery {
    pub requested_by: UserId,
}

pub struct ListDeletionsHandler {
    deletion_log: Arc<dyn DeletionLog>,
    admins: Arc<AdminRoster>,
}

impl ListDeletionsHandler {
    pub fn new(deletion_log: Arc<dyn DeletionLog>, admins: Arc<AdminRoster>) -> Self {
        Self {
            deletion_log,
            admins,
        }
    }

    pub async fn handle(&self, query: ListDeletionsQuery) -> Result<Vec<DeletionRecord>, CanvasError> {
        self.admins.require_admin(&query.requested_by)?;
        Ok(self.deletion_log.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryDeletionLog, InMemoryVotableRepository};
    use crate::domain::canvas::{ContentState, EntityKind, TextBlock};
    use crate::domain::foundation::{DomainError, EntityId};

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    struct Fixture {
        repo: Arc<InMemoryVotableRepository>,
        log: Arc<InMemoryDeletionLog>,
        bus: Arc<InMemoryEventBus>,
        handler: RestoreDeletedBlockHandler,
        record: DeletionRecord,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryVotableRepository::new());
        let log = Arc::new(InMemoryDeletionLog::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let admins = Arc::new(AdminRoster::new([uid("root")]));

        let gone = VotableEntity::new(
            EntityKind::TextBlock(TextBlock::new("bring me back", 3.0, 4.0).unwrap()),
            uid("author"),
        );
        let record = DeletionRecord::for_vote(&gone, uid("voter"));
        log.record(&record).await.unwrap();

        let handler =
            RestoreDeletedBlockHandler::new(repo.clone(), log.clone(), bus.clone(), admins);
        Fixture {
            repo,
            log,
            bus,
            handler,
            record,
        }
    }

    fn restore_cmd(f: &Fixture, by: &str) -> RestoreDeletedBlockCommand {
        RestoreDeletedBlockCommand {
            record_id: *f.record.id(),
            restored_by: uid(by),
        }
    }

    #[tokio::test]
    async fn admin_restores_as_fresh_entity() {
        let f = fixture().await;
        let result = f
            .handler
            .handle(restore_cmd(&f, "root"), CommandMetadata::new(uid("root")))
            .await
            .unwrap();

        assert_ne!(result.entity.id(), f.record.original_id());
        assert_eq!(result.entity.brightness().value(), 50);
        assert!(result.entity.ledger().is_empty());
        assert_eq!(result.entity.state(), ContentState::Visible);
        assert_eq!(result.entity.kind(), f.record.entity_snapshot().kind());
        assert!(f.repo.find_by_id(result.entity.id()).await.unwrap().is_some());

        let stored = f.log.find_by_id(f.record.id()).await.unwrap().unwrap();
        assert!(stored.is_restored());
        assert_eq!(stored.restored_as(), Some(result.entity.id()));
        assert!(f.bus.has_event("entity.restored.v1"));
    }

    #[tokio::test]
    async fn second_restore_is_refused() {
        let f = fixture().await;
        let meta = CommandMetadata::new(uid("root"));
        f.handler.handle(restore_cmd(&f, "root"), meta.clone()).await.unwrap();

        let err = f.handler.handle(restore_cmd(&f, "root"), meta).await.unwrap_err();
        assert!(matches!(err, CanvasError::InvalidState(_)));
        assert_eq!(f.repo.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let f = fixture().await;
        let err = f
            .handler
            .handle(restore_cmd(&f, "guest"), CommandMetadata::new(uid("guest")))
            .await
            .unwrap_err();
        assert_eq!(err, CanvasError::Forbidden);
    }

    #[tokio::test]
    async fn unknown_record_is_not_found() {
        let f = fixture().await;
        let err = f
            .handler
            .handle(
                RestoreDeletedBlockCommand {
                    record_id: DeletionRecordId::new(),
                    restored_by: uid("root"),
                },
                CommandMetadata::new(uid("root")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CanvasError::RecordNotFound(_)));
    }

    /// Log whose claim always loses the race.
    struct LosingLog(InMemoryDeletionLog);

    #[async_trait::async_trait]
    impl DeletionLog for LosingLog {
        async fn record(&self, record: &DeletionRecord) -> Result<bool, DomainError> {
            self.0.record(record).await
        }
        async fn find_by_id(
            &self,
            id: &DeletionRecordId,
        ) -> Result<Option<DeletionRecord>, DomainError> {
            self.0.find_by_id(id).await
        }
        async fn find_by_original_id(
            &self,
            id: &EntityId,
        ) -> Result<Option<DeletionRecord>, DomainError> {
            self.0.find_by_original_id(id).await
        }
        async fn list(&self) -> Result<Vec<DeletionRecord>, DomainError> {
            self.0.list().await
        }
        async fn mark_restored(
            &self,
            _: &DeletionRecordId,
            _: &EntityId,
            _: Timestamp,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn losing_the_claim_removes_the_new_entity() {
        let f = fixture().await;
        let losing = LosingLog(InMemoryDeletionLog::new());
        losing.record(&f.record).await.unwrap();
        let handler = RestoreDeletedBlockHandler::new(
            f.repo.clone(),
            Arc::new(losing),
            f.bus.clone(),
            Arc::new(AdminRoster::new([uid("root")])),
        );

        let err = handler
            .handle(restore_cmd(&f, "root"), CommandMetadata::new(uid("root")))
            .await
            .unwrap_err();
        assert!(matches!(err, CanvasError::InvalidState(_)));
        assert!(f.repo.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_requires_admin() {
        let f = fixture().await;
        let admins = Arc::new(AdminRoster::new([uid("root")]));
        let handler = ListDeletionsHandler::new(f.log.clone(), admins);

        let records = handler
            .handle(ListDeletionsQuery {
                requested_by: uid("root"),
            })
            .await
            .unwrap();
        assert_eq!(records.len(), 1);

        let err = handler
            .handle(ListDeletionsQuery {
                requested_by: uid("guest"),
            })
            .await
            .unwrap_err();
        assert_eq!(err, CanvasError::Forbidden);
    }
}
