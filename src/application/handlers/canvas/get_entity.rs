//! Entity queries: single entity, listing, and the caller's current vote.

use std::sync::Arc;

use crate::domain::canvas::{CanvasError, EntityKindTag, VotableEntity};
use crate::domain::foundation::{EntityId, UserId};
use crate::domain::voting::VoteDirection;
use crate::ports::VotableRepository;

#[derive(Debug, Clone)]
pub struct GetEntityQuery {
    pub entity_id: EntityId,
}

/// Handler for fetching one entity.
pub struct GetEntityHandler {
    repository: Arc<dyn VotableRepository>,
}

impl GetEntityHandler {
    pub fn new(repository: Arc<dyn VotableRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetEntityQuery) -> Result<VotableEntity, CanvasError> {
        self.repository
            .find_by_id(&query.entity_id)
            .await?
            .ok_or(CanvasError::NotFound(query.entity_id))
    }
}

/// Lists entities, oldest first. Archived entities are included; deleted
/// ones are gone from the store.
#[derive(Debug, Clone, Default)]
pub struct ListEntitiesQuery {
    pub kind: Option<EntityKindTag>,
}

pub struct ListEntitiesHandler {
    repository: Arc<dyn VotableRepository>,
}

impl ListEntitiesHandler {
    pub fn new(repository: Arc<dyn VotableRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: ListEntitiesQuery) -> Result<Vec<VotableEntity>, CanvasError> {
        Ok(self.repository.list(query.kind).await?)
    }
}

/// The caller's current vote on an entity. `None` means no vote.
#[derive(Debug, Clone)]
pub struct GetEntityVoteQuery {
    pub entity_id: EntityId,
    pub voter: UserId,
}

pub struct GetEntityVoteHandler {
    repository: Arc<dyn VotableRepository>,
}

impl GetEntityVoteHandler {
    pub fn new(repository: Arc<dyn VotableRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetEntityVoteQuery,
    ) -> Result<Option<VoteDirection>, CanvasError> {
        let entity = self
            .repository
            .find_by_id(&query.entity_id)
            .await?
            .ok_or(CanvasError::NotFound(query.entity_id))?;
        Ok(entity.direction_of(&query.voter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryVotableRepository;
    use crate::domain::canvas::{EntityKind, RentalProperty, TextBlock};
    use crate::domain::voting::LedgerDelta;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    async fn seeded() -> (Arc<InMemoryVotableRepository>, VotableEntity, VotableEntity) {
        let repo = Arc::new(InMemoryVotableRepository::new());
        let block = VotableEntity::new(
            EntityKind::TextBlock(TextBlock::new("hi", 0.0, 0.0).unwrap()),
            uid("a"),
        );
        let property = VotableEntity::new(
            EntityKind::RentalProperty(
                RentalProperty::new("3 Oak Ln", None, None, None, None).unwrap(),
            ),
            uid("a"),
        );
        repo.save(&block).await.unwrap();
        repo.save(&property).await.unwrap();
        (repo, block, property)
    }

    #[tokio::test]
    async fn get_missing_entity_is_not_found() {
        let (repo, _, _) = seeded().await;
        let err = GetEntityHandler::new(repo)
            .handle(GetEntityQuery {
                entity_id: EntityId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CanvasError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_filters_by_kind() {
        let (repo, block, _) = seeded().await;
        let handler = ListEntitiesHandler::new(repo);

        assert_eq!(handler.handle(ListEntitiesQuery::default()).await.unwrap().len(), 2);

        let blocks = handler
            .handle(ListEntitiesQuery {
                kind: Some(EntityKindTag::TextBlock),
            })
            .await
            .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id(), block.id());
    }

    #[tokio::test]
    async fn current_vote_reflects_ledger() {
        let (repo, block, _) = seeded().await;
        repo.apply_delta(
            block.id(),
            &LedgerDelta {
                voter: uid("v"),
                set_to: Some(VoteDirection::Down),
                net_change: -5,
            },
        )
        .await
        .unwrap();

        let handler = GetEntityVoteHandler::new(repo);
        let mine = handler
            .handle(GetEntityVoteQuery {
                entity_id: *block.id(),
                voter: uid("v"),
            })
            .await
            .unwrap();
        assert_eq!(mine, Some(VoteDirection::Down));

        let theirs = handler
            .handle(GetEntityVoteQuery {
                entity_id: *block.id(),
                voter: uid("w"),
            })
            .await
            .unwrap();
        assert_eq!(theirs, None);
    }
}
