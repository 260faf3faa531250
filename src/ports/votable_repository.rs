//! Votable entity repository port.
//!
//! Vote writes go through `apply_delta`, which the adapter must apply as a
//! single atomic step: set union / difference on the voter sets together
//! with the clamped brightness change. Callers never read-modify-write a
//! whole entity to record a vote.

use async_trait::async_trait;

use crate::domain::canvas::{ContentState, EntityKindTag, VotableEntity};
use crate::domain::foundation::{DomainError, EntityId, UserId};
use crate::domain::voting::{Brightness, LedgerDelta};

/// One vote write as the store saw it.
///
/// `brightness_before` is read under the same lock as the write, so two
/// concurrent writers never both see the pre-crossing value.
#[derive(Debug, Clone)]
pub struct AppliedDelta {
    pub brightness_before: Brightness,
    pub entity: VotableEntity,
}

impl AppliedDelta {
    pub fn state_before(&self) -> ContentState {
        self.entity.policy().evaluate(self.brightness_before)
    }
}

/// Repository port for votable entities.
#[async_trait]
pub trait VotableRepository: Send + Sync {
    /// Insert a new entity, or replace one with the same id.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` on persistence failure
    async fn save(&self, entity: &VotableEntity) -> Result<(), DomainError>;

    /// Returns `None` if the entity does not exist.
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<VotableEntity>, DomainError>;

    /// All entities, optionally filtered by kind, oldest first.
    async fn list(&self, kind: Option<EntityKindTag>) -> Result<Vec<VotableEntity>, DomainError>;

    /// Atomically applies a ledger delta and its brightness step.
    ///
    /// Returns the entity as stored after the write together with its
    /// brightness just before, or `None` if it does not exist.
    async fn apply_delta(
        &self,
        id: &EntityId,
        delta: &LedgerDelta,
    ) -> Result<Option<AppliedDelta>, DomainError>;

    /// Removes an entity. Returns false if it was already gone.
    async fn delete(&self, id: &EntityId) -> Result<bool, DomainError>;

    /// Entities whose ledger contains `voter` in either direction.
    async fn find_voted_by(&self, voter: &UserId) -> Result<Vec<VotableEntity>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn votable_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn VotableRepository) {}
    }

    #[test]
    fn state_before_uses_the_kind_policy() {
        use crate::domain::canvas::{EntityKind, TextBlock};

        let entity = VotableEntity::new(
            EntityKind::TextBlock(TextBlock::new("hi", 0.0, 0.0).unwrap()),
            UserId::new("author").unwrap(),
        );
        let applied = AppliedDelta {
            brightness_before: Brightness::new(20).unwrap(),
            entity,
        };
        assert_eq!(applied.state_before(), ContentState::Archived);
    }
}
