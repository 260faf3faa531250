//! Request and response types for entity and deletion-log endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::canvas::{CastEntityVoteResult, RestoreDeletedBlockResult};
use crate::application::ThresholdAction;
use crate::domain::canvas::{
    ContentState, DeletionReason, DeletionRecord, EntityKind, EntityKindTag, RentalProperty,
    TextBlock, VotableEntity,
};
use crate::domain::foundation::{
    DeletionRecordId, EntityId, Timestamp, UserId, ValidationError,
};
use crate::domain::voting::{VoteDirection, VoteTransition};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/entities`, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateEntityRequest {
    TextBlock {
        text: String,
        x: f64,
        y: f64,
    },
    RentalProperty {
        address: String,
        #[serde(default)]
        listing_url: Option<String>,
        #[serde(default)]
        monthly_rent: Option<u32>,
        #[serde(default)]
        bedrooms: Option<u8>,
        #[serde(default)]
        notes: Option<String>,
    },
}

impl CreateEntityRequest {
    pub fn into_kind(self) -> Result<EntityKind, ValidationError> {
        match self {
            CreateEntityRequest::TextBlock { text, x, y } => {
                Ok(EntityKind::TextBlock(TextBlock::new(text, x, y)?))
            }
            CreateEntityRequest::RentalProperty {
                address,
                listing_url,
                monthly_rent,
                bedrooms,
                notes,
            } => Ok(EntityKind::RentalProperty(RentalProperty::new(
                address,
                listing_url,
                monthly_rent,
                bedrooms,
                notes,
            )?)),
        }
    }
}

/// Query string of `GET /api/entities`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEntitiesParams {
    pub kind: Option<String>,
}

impl ListEntitiesParams {
    pub fn kind_filter(&self) -> Result<Option<EntityKindTag>, ValidationError> {
        self.kind.as_deref().map(str::parse).transpose()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// Entity as shown to clients, with its derived state.
#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    #[serde(flatten)]
    pub content: EntityKind,
    pub brightness: i32,
    pub state: ContentState,
    pub upvoters: Vec<UserId>,
    pub downvoters: Vec<UserId>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&VotableEntity> for EntityView {
    fn from(entity: &VotableEntity) -> Self {
        Self {
            id: *entity.id(),
            content: entity.kind().clone(),
            brightness: entity.brightness().value(),
            state: entity.state(),
            upvoters: entity.ledger().upvoters().cloned().collect(),
            downvoters: entity.ledger().downvoters().cloned().collect(),
            created_by: entity.created_by().clone(),
            created_at: *entity.created_at(),
            updated_at: *entity.updated_at(),
        }
    }
}

/// Outcome of `POST /api/entities/:id/vote`.
#[derive(Debug, Clone, Serialize)]
pub struct EntityVoteResponse {
    pub entity_id: EntityId,
    #[serde(flatten)]
    pub transition: VoteTransition,
    pub current_vote: Option<VoteDirection>,
    pub brightness_before: i32,
    pub brightness_after: i32,
    pub state: ContentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_record_id: Option<DeletionRecordId>,
}

impl From<&CastEntityVoteResult> for EntityVoteResponse {
    fn from(result: &CastEntityVoteResult) -> Self {
        Self {
            entity_id: result.entity_id,
            transition: result.transition,
            current_vote: result.current_vote(),
            brightness_before: result.brightness_before.value(),
            brightness_after: result.brightness_after.value(),
            state: result.state(),
            deletion_record_id: result.action.deletion_record().map(|r| *r.id()),
        }
    }
}

/// Outcome of `POST /api/entities/:id/reconcile`.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResponse {
    pub entity_id: EntityId,
    pub state: ContentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_record_id: Option<DeletionRecordId>,
}

impl ReconcileResponse {
    pub fn new(entity_id: EntityId, action: &ThresholdAction) -> Self {
        Self {
            entity_id,
            state: action.state(),
            deletion_record_id: action.deletion_record().map(|r| *r.id()),
        }
    }
}

/// Deletion log entry as shown to admins.
#[derive(Debug, Clone, Serialize)]
pub struct DeletionRecordView {
    pub id: DeletionRecordId,
    pub original_id: EntityId,
    pub entity: EntityView,
    pub reason: DeletionReason,
    pub deleted_by: UserId,
    pub deleted_at: Timestamp,
    pub restored_at: Option<Timestamp>,
    pub restored_as: Option<EntityId>,
}

impl From<&DeletionRecord> for DeletionRecordView {
    fn from(record: &DeletionRecord) -> Self {
        Self {
            id: *record.id(),
            original_id: *record.original_id(),
            entity: EntityView::from(record.entity_snapshot()),
            reason: record.reason(),
            deleted_by: record.deleted_by().clone(),
            deleted_at: *record.deleted_at(),
            restored_at: record.restored_at().copied(),
            restored_as: record.restored_as().copied(),
        }
    }
}

/// Outcome of `POST /api/deletions/:id/restore`.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreResponse {
    pub entity: EntityView,
    pub record: DeletionRecordView,
}

impl From<&RestoreDeletedBlockResult> for RestoreResponse {
    fn from(result: &RestoreDeletedBlockResult) -> Self {
        Self {
            entity: EntityView::from(&result.entity),
            record: DeletionRecordView::from(&result.record),
        }
    }
}
