//! CastEntityVoteHandler - Command handler for voting on a text block or
//! rental property.
//!
//! Flow:
//! 1. Load the entity (NotFound if absent)
//! 2. Compute the ledger delta from the caller's current vote
//! 3. Apply the delta atomically in the store
//! 4. Enforce thresholds on the stored result
//!
//! Steps 3 and 4 are separate writes. If step 4 fails the vote stands and
//! `ReconcileEntityHandler` can finish the job.

use std::sync::Arc;

use super::{ThresholdAction, ThresholdEnforcer};
use crate::domain::canvas::{CanvasError, ContentState, EntityVoteRecorded, VotableEntity};
use crate::domain::foundation::{CommandMetadata, EntityId, EventEnvelope, EventId, Timestamp, UserId};
use crate::domain::voting::{Brightness, VoteDirection, VoteTransition};
use crate::ports::{EventPublisher, VotableRepository};

/// Command to vote on an entity.
#[derive(Debug, Clone)]
pub struct CastEntityVoteCommand {
    pub entity_id: EntityId,
    pub voter: UserId,
    pub direction: VoteDirection,
}

/// Result of a recorded vote.
#[derive(Debug, Clone)]
pub struct CastEntityVoteResult {
    pub entity_id: EntityId,
    pub transition: VoteTransition,
    pub brightness_before: Brightness,
    pub brightness_after: Brightness,
    /// The entity as stored after the vote; `None` once deleted.
    pub entity: Option<VotableEntity>,
    pub action: ThresholdAction,
}

impl CastEntityVoteResult {
    pub fn state(&self) -> ContentState {
        self.action.state()
    }

    /// The caller's direction after this vote.
    pub fn current_vote(&self) -> Option<VoteDirection> {
        self.transition.resulting_direction()
    }
}

/// Handler for entity votes.
pub struct CastEntityVoteHandler {
    repository: Arc<dyn VotableRepository>,
    thresholds: Arc<ThresholdEnforcer>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CastEntityVoteHandler {
    pub fn new(
        repository: Arc<dyn VotableRepository>,
        thresholds: Arc<ThresholdEnforcer>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            thresholds,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CastEntityVoteCommand,
        metadata: CommandMetadata,
    ) -> Result<CastEntityVoteResult, CanvasError> {
        // 1. Load
        let entity = self
            .repository
            .find_by_id(&cmd.entity_id)
            .await?
            .ok_or(CanvasError::NotFound(cmd.entity_id))?;

        // A block left at zero by an interrupted deletion is finished off
        // rather than voted on.
        if entity.state().is_deleted() {
            self.thresholds.enforce(&entity, None, &metadata).await?;
            return Err(CanvasError::not_found(cmd.entity_id));
        }

        // 2. Delta
        let (transition, delta) = entity.prepare_vote(&cmd.voter, cmd.direction);

        // 3. Atomic write; the prior brightness comes from the store, not
        // from the read in step 1
        let applied = self
            .repository
            .apply_delta(&cmd.entity_id, &delta)
            .await?
            .ok_or(CanvasError::NotFound(cmd.entity_id))?;
        let state_before = applied.state_before();
        let brightness_before = applied.brightness_before;
        let updated = applied.entity;

        let event = EntityVoteRecorded {
            event_id: EventId::new(),
            entity_id: cmd.entity_id,
            voter: cmd.voter.clone(),
            transition,
            brightness_before: brightness_before.value(),
            brightness_after: updated.brightness().value(),
            recorded_at: Timestamp::now(),
        };
        self.event_publisher
            .publish(metadata.stamp(EventEnvelope::from_event(&event)))
            .await?;

        tracing::info!(
            entity_id = %cmd.entity_id,
            voter = %cmd.voter,
            transition = ?transition,
            brightness = updated.brightness().value(),
            "entity vote applied"
        );

        // 4. Thresholds
        let action = self
            .thresholds
            .enforce(&updated, Some(state_before), &metadata)
            .await
            .map_err(|err| {
                tracing::warn!(
                    entity_id = %cmd.entity_id,
                    error = %err,
                    "threshold step failed after vote write"
                );
                err
            })?;

        let brightness_after = updated.brightness();
        let entity = match action {
            ThresholdAction::Deleted(_) => None,
            _ => Some(updated),
        };

        Ok(CastEntityVoteResult {
            entity_id: cmd.entity_id,
            transition,
            brightness_before,
            brightness_after,
            entity,
            action,
        })
    }
}
