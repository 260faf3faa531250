//! Audit trail for moderation outcomes.
//!
//! Writes one `moderation` target log line per archive, deletion, restore
//! and proposal close, so operators can follow what the community voted
//! off the canvas without querying the stores.

use async_trait::async_trait;

use crate::domain::canvas::{EntityArchived, EntityDeleted, EntityRestored};
use crate::domain::foundation::{DomainError, DomainEvent, EventEnvelope};
use crate::domain::governance::ProposalStatusChanged;
use crate::ports::{EventHandler, EventSubscriber};

pub struct ModerationLog;

impl ModerationLog {
    pub const EVENT_TYPES: [&'static str; 4] = [
        EntityArchived::EVENT_TYPE,
        EntityDeleted::EVENT_TYPE,
        EntityRestored::EVENT_TYPE,
        ProposalStatusChanged::EVENT_TYPE,
    ];

    pub fn attach(bus: &dyn EventSubscriber) {
        bus.subscribe_all(&Self::EVENT_TYPES, std::sync::Arc::new(ModerationLog));
    }
}

fn undecodable(event: &EventEnvelope, err: serde_json::Error) -> DomainError {
    DomainError::new(
        crate::domain::foundation::ErrorCode::InternalError,
        format!("cannot decode {}: {}", event.event_type, err),
    )
}

#[async_trait]
impl EventHandler for ModerationLog {
    async fn handle(&self, event: &EventEnvelope) -> Result<(), DomainError> {
        let by = event.context.user_id.as_deref().unwrap_or("system");
        match event.event_type.as_str() {
            EntityArchived::EVENT_TYPE => {
                let e: EntityArchived = event.decode().map_err(|err| undecodable(event, err))?;
                tracing::info!(
                    target: "moderation",
                    entity_id = %e.entity_id,
                    brightness = e.brightness,
                    by,
                    "entity archived"
                );
            }
            EntityDeleted::EVENT_TYPE => {
                let e: EntityDeleted = event.decode().map_err(|err| undecodable(event, err))?;
                tracing::info!(
                    target: "moderation",
                    entity_id = %e.entity_id,
                    record_id = %e.deletion_record_id,
                    reason = ?e.reason,
                    by = %e.deleted_by,
                    "entity deleted"
                );
            }
            EntityRestored::EVENT_TYPE => {
                let e: EntityRestored = event.decode().map_err(|err| undecodable(event, err))?;
                tracing::info!(
                    target: "moderation",
                    entity_id = %e.entity_id,
                    original_id = %e.original_id,
                    by = %e.restored_by,
                    "entity restored"
                );
            }
            ProposalStatusChanged::EVENT_TYPE => {
                let e: ProposalStatusChanged =
                    event.decode().map_err(|err| undecodable(event, err))?;
                tracing::info!(
                    target: "moderation",
                    proposal_id = %e.proposal_id,
                    to = ?e.to,
                    cause = ?e.cause,
                    net_votes = e.net_votes,
                    by,
                    "proposal closed"
                );
            }
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "moderation_log"
    }
}
