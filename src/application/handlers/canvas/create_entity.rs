//! CreateEntityHandler - Command handler for posting a text block or
//! suggesting a rental property.

use std::sync::Arc;

use crate::domain::canvas::{CanvasError, EntityCreated, EntityKind, VotableEntity};
use crate::domain::foundation::{CommandMetadata, EventEnvelope, EventId, UserId};
use crate::ports::{EventPublisher, VotableRepository};

/// Command to create a new votable entity.
///
/// `kind` is already validated by its constructor.
#[derive(Debug, Clone)]
pub struct CreateEntityCommand {
    pub kind: EntityKind,
    pub created_by: UserId,
}

/// Result of successful entity creation.
#[derive(Debug, Clone)]
pub struct CreateEntityResult {
    pub entity: VotableEntity,
    pub event: EntityCreated,
}

/// Handler for creating entities.
pub struct CreateEntityHandler {
    repository: Arc<dyn VotableRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreateEntityHandler {
    pub fn new(
        repository: Arc<dyn VotableRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateEntityCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateEntityResult, CanvasError> {
        // 1. Build the aggregate at default brightness
        let entity = VotableEntity::new(cmd.kind, cmd.created_by);

        // 2. Persist
        self.repository.save(&entity).await?;

        // 3. Publish
        let event = EntityCreated {
            event_id: EventId::new(),
            entity_id: *entity.id(),
            kind: entity.kind_tag(),
            created_by: entity.created_by().clone(),
            created_at: *entity.created_at(),
        };
        self.event_publisher
            .publish(metadata.stamp(EventEnvelope::from_event(&event)))
            .await?;

        tracing::info!(entity_id = %entity.id(), kind = %entity.kind_tag(), "entity created");

        Ok(CreateEntityResult { entity, event })
    }
}
