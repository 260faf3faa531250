//! ReconcileEntityHandler - Re-runs the threshold check for one entity.
//!
//! Safe to repeat: the deletion log keeps one record per original id and
//! a visible or archived entity is left untouched.

use std::sync::Arc;

use super::{ThresholdAction, ThresholdEnforcer};
use crate::domain::canvas::CanvasError;
use crate::domain::foundation::{CommandMetadata, EntityId};
use crate::ports::VotableRepository;

#[derive(Debug, Clone)]
pub struct ReconcileEntityCommand {
    pub entity_id: EntityId,
}

pub struct ReconcileEntityHandler {
    repository: Arc<dyn VotableRepository>,
    thresholds: Arc<ThresholdEnforcer>,
}

impl ReconcileEntityHandler {
    pub fn new(repository: Arc<dyn VotableRepository>, thresholds: Arc<ThresholdEnforcer>) -> Self {
        Self {
            repository,
            thresholds,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileEntityCommand,
        metadata: CommandMetadata,
    ) -> Result<ThresholdAction, CanvasError> {
        let entity = self
            .repository
            .find_by_id(&cmd.entity_id)
            .await?
            .ok_or(CanvasError::NotFound(cmd.entity_id))?;

        let action = self.thresholds.enforce(&entity, None, &metadata).await?;
        tracing::debug!(entity_id = %cmd.entity_id, state = %action.state(), "entity reconciled");
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryDeletionLog, InMemoryVotableRepository};
    use crate::domain::canvas::{ContentState, EntityKind, TextBlock, VotableEntity};
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::voting::{Brightness, VoteLedger};
    use crate::ports::DeletionLog;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[tokio::test]
    async fn finishes_an_interrupted_deletion() {
        let repo = Arc::new(InMemoryVotableRepository::new());
        let log = Arc::new(InMemoryDeletionLog::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let thresholds = Arc::new(ThresholdEnforcer::new(repo.clone(), log.clone(), bus));
        let handler = ReconcileEntityHandler::new(repo.clone(), thresholds);

        // Vote write landed at zero but the delete never ran.
        let stuck = VotableEntity::reconstitute(
            EntityId::new(),
            EntityKind::TextBlock(TextBlock::new("stuck", 0.0, 0.0).unwrap()),
            Brightness::new(0).unwrap(),
            VoteLedger::new(),
            uid("author"),
            Timestamp::now(),
            Timestamp::now(),
        );
        repo.save(&stuck).await.unwrap();

        let metadata = CommandMetadata::new(uid("admin"));
        let action = handler
            .handle(
                ReconcileEntityCommand {
                    entity_id: *stuck.id(),
                },
                metadata.clone(),
            )
            .await
            .unwrap();
        assert_eq!(action.state(), ContentState::Deleted);
        assert!(repo.find_by_id(stuck.id()).await.unwrap().is_none());

        let again = handler
            .handle(
                ReconcileEntityCommand {
                    entity_id: *stuck.id(),
                },
                metadata,
            )
            .await;
        assert!(matches!(again, Err(CanvasError::NotFound(_))));
        assert_eq!(log.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn visible_entity_is_unchanged() {
        let repo = Arc::new(InMemoryVotableRepository::new());
        let thresholds = Arc::new(ThresholdEnforcer::new(
            repo.clone(),
            Arc::new(InMemoryDeletionLog::new()),
            Arc::new(InMemoryEventBus::new()),
        ));
        let entity = VotableEntity::new(
            EntityKind::TextBlock(TextBlock::new("fine", 0.0, 0.0).unwrap()),
            uid("author"),
        );
        repo.save(&entity).await.unwrap();

        let action = ReconcileEntityHandler::new(repo, thresholds)
            .handle(
                ReconcileEntityCommand {
                    entity_id: *entity.id(),
                },
                CommandMetadata::new(uid("x")),
            )
            .await
            .unwrap();
        assert_eq!(action, ThresholdAction::Unchanged(ContentState::Visible));
    }
}
