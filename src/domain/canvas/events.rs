//! Canvas domain events.
//!
//! - `EntityCreated` - New text block or property suggestion
//! - `EntityVoteRecorded` - A vote changed an entity's ledger and brightness
//! - `EntityArchived` - Brightness fell to the archive threshold
//! - `EntityDeleted` - A text block was removed and logged
//! - `EntityRestored` - An admin rebuilt a text block from the deletion log

use serde::{Deserialize, Serialize};

use super::{DeletionReason, EntityKindTag};
use crate::domain::foundation::{
    domain_event, DeletionRecordId, EntityId, EventId, Timestamp, UserId,
};
use crate::domain::voting::VoteTransition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCreated {
    pub event_id: EventId,
    pub entity_id: EntityId,
    pub kind: EntityKindTag,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

domain_event!(EntityCreated: "entity.created.v1", Entity(entity_id), at created_at);

/// Published after every successful vote write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityVoteRecorded {
    pub event_id: EventId,
    pub entity_id: EntityId,
    pub voter: UserId,
    pub transition: VoteTransition,
    pub brightness_before: i32,
    pub brightness_after: i32,
    pub recorded_at: Timestamp,
}

domain_event!(EntityVoteRecorded: "entity.vote_recorded.v1", Entity(entity_id), at recorded_at);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityArchived {
    pub event_id: EventId,
    pub entity_id: EntityId,
    pub brightness: i32,
    pub archived_at: Timestamp,
}

domain_event!(EntityArchived: "entity.archived.v1", Entity(entity_id), at archived_at);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDeleted {
    pub event_id: EventId,
    pub entity_id: EntityId,
    pub deletion_record_id: DeletionRecordId,
    pub reason: DeletionReason,
    pub deleted_by: UserId,
    pub deleted_at: Timestamp,
}

domain_event!(EntityDeleted: "entity.deleted.v1", Entity(entity_id), at deleted_at);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRestored {
    pub event_id: EventId,
    /// Id of the newly created entity.
    pub entity_id: EntityId,
    pub original_id: EntityId,
    pub deletion_record_id: DeletionRecordId,
    pub restored_by: UserId,
    pub restored_at: Timestamp,
}

domain_event!(EntityRestored: "entity.restored.v1", Entity(entity_id), at restored_at);
