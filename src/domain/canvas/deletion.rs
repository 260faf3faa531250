//! Deletion log records.
//!
//! When a text block crosses its deletion threshold the entity is removed
//! and a snapshot is kept here. Restoring builds a brand new entity from
//! the snapshot; the original id is never reused.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EntityKind, VotableEntity};
use crate::domain::foundation::{
    DeletionRecordId, DomainError, EntityId, ErrorCode, Timestamp, UserId, ValidationError,
};

/// Why an entity was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionReason {
    /// Brightness reached the deletion threshold.
    Vote,
    /// Removed by an administrator.
    Admin,
}

impl DeletionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionReason::Vote => "vote",
            DeletionReason::Admin => "admin",
        }
    }
}

impl fmt::Display for DeletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletionReason {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vote" => Ok(DeletionReason::Vote),
            "admin" => Ok(DeletionReason::Admin),
            other => Err(ValidationError::invalid_format(
                "reason",
                format!("unknown deletion reason '{}'", other),
            )),
        }
    }
}

/// Archived snapshot of a removed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionRecord {
    id: DeletionRecordId,
    original_id: EntityId,
    entity_snapshot: VotableEntity,
    reason: DeletionReason,
    deleted_by: UserId,
    deleted_at: Timestamp,
    restored_at: Option<Timestamp>,
    restored_as: Option<EntityId>,
}

impl DeletionRecord {
    /// Record for an entity that was voted out of existence.
    ///
    /// `deleted_by` is the voter whose vote crossed the threshold.
    pub fn for_vote(entity: &VotableEntity, deleted_by: UserId) -> Self {
        Self::new(entity, DeletionReason::Vote, deleted_by)
    }

    pub fn new(entity: &VotableEntity, reason: DeletionReason, deleted_by: UserId) -> Self {
        Self {
            id: DeletionRecordId::new(),
            original_id: *entity.id(),
            entity_snapshot: entity.clone(),
            reason,
            deleted_by,
            deleted_at: Timestamp::now(),
            restored_at: None,
            restored_as: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: DeletionRecordId,
        original_id: EntityId,
        entity_snapshot: VotableEntity,
        reason: DeletionReason,
        deleted_by: UserId,
        deleted_at: Timestamp,
        restored_at: Option<Timestamp>,
        restored_as: Option<EntityId>,
    ) -> Self {
        Self {
            id,
            original_id,
            entity_snapshot,
            reason,
            deleted_by,
            deleted_at,
            restored_at,
            restored_as,
        }
    }

    pub fn id(&self) -> &DeletionRecordId {
        &self.id
    }

    pub fn original_id(&self) -> &EntityId {
        &self.original_id
    }

    pub fn entity_snapshot(&self) -> &VotableEntity {
        &self.entity_snapshot
    }

    pub fn reason(&self) -> DeletionReason {
        self.reason
    }

    pub fn deleted_by(&self) -> &UserId {
        &self.deleted_by
    }

    pub fn deleted_at(&self) -> &Timestamp {
        &self.deleted_at
    }

    pub fn restored_at(&self) -> Option<&Timestamp> {
        self.restored_at.as_ref()
    }

    pub fn restored_as(&self) -> Option<&EntityId> {
        self.restored_as.as_ref()
    }

    pub fn is_restored(&self) -> bool {
        self.restored_at.is_some()
    }

    /// Builds a new entity from the snapshot: fresh id, default brightness,
    /// empty ledger. Marks this record restored.
    ///
    /// # Errors
    ///
    /// - `AlreadyRestored` if this record was restored before
    pub fn restore(&mut self, restored_by: UserId) -> Result<VotableEntity, DomainError> {
        if self.is_restored() {
            return Err(DomainError::new(
                ErrorCode::AlreadyRestored,
                format!("Deletion record {} was already restored", self.id),
            ));
        }
        let kind: EntityKind = self.entity_snapshot.kind().clone();
        let entity = VotableEntity::new(kind, restored_by);
        self.restored_at = Some(Timestamp::now());
        self.restored_as = Some(*entity.id());
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::canvas::{ContentState, TextBlock};
    use crate::domain::voting::VoteDirection;

    fn voter(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    fn block() -> VotableEntity {
        VotableEntity::new(
            EntityKind::TextBlock(TextBlock::new("bye", 1.0, 2.0).unwrap()),
            voter("author"),
        )
    }

    #[test]
    fn vote_reason_serializes_as_literal_vote() {
        assert_eq!(serde_json::to_string(&DeletionReason::Vote).unwrap(), "\"vote\"");
        assert_eq!("vote".parse::<DeletionReason>().unwrap(), DeletionReason::Vote);
    }

    #[test]
    fn for_vote_captures_snapshot() {
        let entity = block();
        let record = DeletionRecord::for_vote(&entity, voter("v"));
        assert_eq!(record.original_id(), entity.id());
        assert_eq!(record.reason(), DeletionReason::Vote);
        assert_eq!(record.entity_snapshot(), &entity);
        assert!(!record.is_restored());
    }

    #[test]
    fn restore_creates_fresh_entity_once() {
        let mut entity = block();
        let (_, delta) = entity.prepare_vote(&voter("a"), VoteDirection::Down);
        entity.apply_delta(&delta);
        let mut record = DeletionRecord::for_vote(&entity, voter("a"));

        let restored = record.restore(voter("admin")).unwrap();
        assert_ne!(restored.id(), entity.id());
        assert_eq!(restored.brightness().value(), 50);
        assert!(restored.ledger().is_empty());
        assert_eq!(restored.state(), ContentState::Visible);
        assert_eq!(record.restored_as(), Some(restored.id()));

        let again = record.restore(voter("admin"));
        assert_eq!(again.unwrap_err().code, ErrorCode::AlreadyRestored);
    }
}
