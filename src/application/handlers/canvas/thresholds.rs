//! ThresholdEnforcer - Acts on the lifecycle state an entity's brightness
//! calls for.
//!
//! Archiving is derived state and needs no write; only the crossing is
//! announced. Deletion writes the deletion log first (idempotent per
//! original id) and then removes the entity, so a failure between the two
//! steps leaves the entity in place for a later reconcile.

use std::sync::Arc;

use crate::domain::canvas::{
    CanvasError, ContentState, DeletionRecord, EntityArchived, EntityDeleted, VotableEntity,
};
use crate::domain::foundation::{CommandMetadata, EventEnvelope, EventId, Timestamp};
use crate::ports::{DeletionLog, EventPublisher, VotableRepository};

/// What the enforcer did for one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdAction {
    /// Nothing to do; the entity is in this state.
    Unchanged(ContentState),
    /// The entity just crossed into the archive band.
    Archived,
    /// The entity was removed; this is its deletion log entry.
    Deleted(DeletionRecord),
}

impl ThresholdAction {
    pub fn state(&self) -> ContentState {
        match self {
            ThresholdAction::Unchanged(state) => *state,
            ThresholdAction::Archived => ContentState::Archived,
            ThresholdAction::Deleted(_) => ContentState::Deleted,
        }
    }

    pub fn deletion_record(&self) -> Option<&DeletionRecord> {
        match self {
            ThresholdAction::Deleted(record) => Some(record),
            _ => None,
        }
    }
}

/// Shared by the vote, reconcile and voter-removal paths.
pub struct ThresholdEnforcer {
    repository: Arc<dyn VotableRepository>,
    deletion_log: Arc<dyn DeletionLog>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ThresholdEnforcer {
    pub fn new(
        repository: Arc<dyn VotableRepository>,
        deletion_log: Arc<dyn DeletionLog>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            deletion_log,
            event_publisher,
        }
    }

    /// Enforce thresholds on `entity` as currently stored.
    ///
    /// `previous` is the state before the write that triggered this check,
    /// if known; an archive event is published only on a visible to
    /// archived crossing.
    pub async fn enforce(
        &self,
        entity: &VotableEntity,
        previous: Option<ContentState>,
        metadata: &CommandMetadata,
    ) -> Result<ThresholdAction, CanvasError> {
        match entity.state() {
            ContentState::Deleted => self.delete(entity, metadata).await,
            ContentState::Archived if previous == Some(ContentState::Visible) => {
                let event = EntityArchived {
                    event_id: EventId::new(),
                    entity_id: *entity.id(),
                    brightness: entity.brightness().value(),
                    archived_at: Timestamp::now(),
                };
                self.event_publisher
                    .publish(metadata.stamp(EventEnvelope::from_event(&event)))
                    .await?;
                tracing::info!(
                    entity_id = %entity.id(),
                    brightness = entity.brightness().value(),
                    "entity archived"
                );
                Ok(ThresholdAction::Archived)
            }
            state => Ok(ThresholdAction::Unchanged(state)),
        }
    }

    async fn delete(
        &self,
        entity: &VotableEntity,
        metadata: &CommandMetadata,
    ) -> Result<ThresholdAction, CanvasError> {
        let candidate = DeletionRecord::for_vote(entity, metadata.user_id.clone());
        let record = if self.deletion_log.record(&candidate).await? {
            candidate
        } else {
            // Logged by an earlier attempt; keep that record.
            self.deletion_log
                .find_by_original_id(entity.id())
                .await?
                .unwrap_or(candidate)
        };

        if self.repository.delete(entity.id()).await? {
            let event = EntityDeleted {
                event_id: EventId::new(),
                entity_id: *entity.id(),
                deletion_record_id: *record.id(),
                reason: record.reason(),
                deleted_by: record.deleted_by().clone(),
                deleted_at: *record.deleted_at(),
            };
            self.event_publisher
                .publish(metadata.stamp(EventEnvelope::from_event(&event)))
                .await?;
            tracing::info!(
                entity_id = %entity.id(),
                deletion_record_id = %record.id(),
                "text block deleted by vote"
            );
        } else {
            tracing::debug!(entity_id = %entity.id(), "entity already removed");
        }

        Ok(ThresholdAction::Deleted(record))
    }
}
