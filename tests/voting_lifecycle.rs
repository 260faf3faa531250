//! Integration tests for the vote-driven lifecycle.
//!
//! Drives the application handlers against the in-memory stores:
//! 1. Brightness arithmetic and order independence
//! 2. Archive and deletion of entities, including the deletion log
//! 3. Proposal thresholds and lazy expiry
//! 4. Voter removal cascade

use std::sync::Arc;

use proptest::prelude::*;

use community_canvas::adapters::events::InMemoryEventBus;
use community_canvas::adapters::memory::{
    InMemoryDeletionLog, InMemoryProposalRepository, InMemoryVotableRepository,
};
use community_canvas::application::handlers::canvas::{
    CastEntityVoteCommand, CastEntityVoteHandler, CastEntityVoteResult, CreateEntityCommand,
    CreateEntityHandler, RestoreDeletedBlockCommand, RestoreDeletedBlockHandler,
};
use community_canvas::application::handlers::governance::{
    CastProposalVoteCommand, CastProposalVoteHandler, CreateProposalCommand,
    CreateProposalHandler, GetProposalHandler, GetProposalQuery,
};
use community_canvas::application::handlers::voter::{RemoveVoterCommand, RemoveVoterHandler};
use community_canvas::application::{
    ProposalExpiryChecker, ProposalThresholds, ThresholdEnforcer,
};
use community_canvas::domain::canvas::{
    CanvasError, ContentState, DeletionReason, EntityKind, RentalProperty, TextBlock,
    VotableEntity,
};
use community_canvas::domain::foundation::{
    AdminRoster, CommandMetadata, EntityId, Timestamp, UserId,
};
use community_canvas::domain::governance::{Proposal, ProposalStatus, ProposalType};
use community_canvas::domain::voting::VoteDirection;
use community_canvas::ports::{DeletionLog, ProposalRepository, VotableRepository};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn uid(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

fn meta(user: &str) -> CommandMetadata {
    CommandMetadata::new(uid(user))
}

struct World {
    entities: Arc<InMemoryVotableRepository>,
    proposals: Arc<InMemoryProposalRepository>,
    deletion_log: Arc<InMemoryDeletionLog>,
    bus: Arc<InMemoryEventBus>,
    entity_thresholds: Arc<ThresholdEnforcer>,
    proposal_thresholds: Arc<ProposalThresholds>,
    expiry: Arc<ProposalExpiryChecker>,
    admins: Arc<AdminRoster>,
}

impl World {
    fn new() -> Self {
        let entities = Arc::new(InMemoryVotableRepository::new());
        let proposals = Arc::new(InMemoryProposalRepository::new());
        let deletion_log = Arc::new(InMemoryDeletionLog::new());
        let bus = Arc::new(InMemoryEventBus::new());
        Self {
            entity_thresholds: Arc::new(ThresholdEnforcer::new(
                entities.clone(),
                deletion_log.clone(),
                bus.clone(),
            )),
            proposal_thresholds: Arc::new(ProposalThresholds::new(proposals.clone(), bus.clone())),
            expiry: Arc::new(ProposalExpiryChecker::new(proposals.clone(), bus.clone())),
            admins: Arc::new(AdminRoster::new([uid("admin")])),
            entities,
            proposals,
            deletion_log,
            bus,
        }
    }

    async fn text_block(&self) -> EntityId {
        let handler = CreateEntityHandler::new(self.entities.clone(), self.bus.clone());
        let kind = EntityKind::TextBlock(TextBlock::new("hello canvas", 10.0, 20.0).unwrap());
        let result = handler
            .handle(
                CreateEntityCommand {
                    kind,
                    created_by: uid("author"),
                },
                meta("author"),
            )
            .await
            .unwrap();
        *result.entity.id()
    }

    async fn entity_vote(
        &self,
        entity_id: EntityId,
        voter: &str,
        direction: VoteDirection,
    ) -> Result<CastEntityVoteResult, CanvasError> {
        CastEntityVoteHandler::new(
            self.entities.clone(),
            self.entity_thresholds.clone(),
            self.bus.clone(),
        )
        .handle(
            CastEntityVoteCommand {
                entity_id,
                voter: uid(voter),
                direction,
            },
            meta(voter),
        )
        .await
    }

    async fn proposal_vote(&self, proposal: &Proposal, voter: &str, direction: VoteDirection) {
        CastProposalVoteHandler::new(
            self.proposals.clone(),
            self.expiry.clone(),
            self.proposal_thresholds.clone(),
            self.bus.clone(),
        )
        .handle(
            CastProposalVoteCommand {
                proposal_id: *proposal.id(),
                voter: uid(voter),
                direction,
            },
            meta(voter),
        )
        .await
        .unwrap();
    }

    async fn brightness(&self, id: &EntityId) -> Option<i32> {
        self.entities
            .find_by_id(id)
            .await
            .unwrap()
            .map(|e| e.brightness().value())
    }
}

// =============================================================================
// Brightness
// =============================================================================

fn direction() -> impl Strategy<Value = VoteDirection> {
    prop_oneof![Just(VoteDirection::Up), Just(VoteDirection::Down)]
}

fn votes_and_order() -> impl Strategy<Value = (Vec<VoteDirection>, Vec<usize>)> {
    // Nine voters move brightness at most 45 from 50, so no clamp is hit.
    prop::collection::vec(direction(), 1..=9).prop_flat_map(|dirs| {
        let order: Vec<usize> = (0..dirs.len()).collect();
        (Just(dirs), Just(order).prop_shuffle())
    })
}

fn rental() -> VotableEntity {
    VotableEntity::new(
        EntityKind::RentalProperty(
            RentalProperty::new("1 Main St", None, Some(1200), Some(2), None).unwrap(),
        ),
        uid("author"),
    )
}

/// Casts `votes` in order through `CastEntityVoteHandler` on a fresh rental
/// property and returns what the store holds afterwards.
fn cast_in_order(votes: &[(String, VoteDirection)]) -> VotableEntity {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let world = World::new();
        let entity = rental();
        world.entities.save(&entity).await.unwrap();
        for (voter, direction) in votes {
            world.entity_vote(*entity.id(), voter, *direction).await.unwrap();
        }
        world.entities.find_by_id(entity.id()).await.unwrap().unwrap()
    })
}

proptest! {
    #[test]
    fn distinct_voters_commute((dirs, order) in votes_and_order()) {
        let in_order: Vec<(String, VoteDirection)> = dirs
            .iter()
            .enumerate()
            .map(|(i, d)| (format!("v{}", i), *d))
            .collect();
        let shuffled: Vec<(String, VoteDirection)> =
            order.iter().map(|&i| in_order[i].clone()).collect();

        let a = cast_in_order(&in_order);
        let b = cast_in_order(&shuffled);

        prop_assert_eq!(a.brightness(), b.brightness());
        prop_assert_eq!(a.ledger(), b.ledger());
    }

    #[test]
    fn repeating_a_vote_restores_brightness(d in direction()) {
        let twice = vec![("a".to_string(), d), ("a".to_string(), d)];

        let entity = cast_in_order(&twice);

        prop_assert_eq!(entity.brightness().value(), 50);
        prop_assert!(entity.ledger().is_empty());
    }
}

#[tokio::test]
async fn two_voter_scenario_follows_transition_table() {
    let world = World::new();
    let id = world.text_block().await;
    assert_eq!(world.brightness(&id).await, Some(50));

    world.entity_vote(id, "a", VoteDirection::Up).await.unwrap();
    assert_eq!(world.brightness(&id).await, Some(55));

    world.entity_vote(id, "b", VoteDirection::Down).await.unwrap();
    assert_eq!(world.brightness(&id).await, Some(50));

    let switched = world.entity_vote(id, "a", VoteDirection::Down).await.unwrap();
    assert_eq!(switched.brightness_after.value(), 40);
    assert_eq!(switched.current_vote(), Some(VoteDirection::Down));

    let withdrawn = world.entity_vote(id, "b", VoteDirection::Down).await.unwrap();
    assert_eq!(withdrawn.brightness_after.value(), 45);
    assert_eq!(withdrawn.current_vote(), None);
}

// =============================================================================
// Archive and deletion
// =============================================================================

#[tokio::test]
async fn text_block_voted_to_zero_is_deleted_once() {
    let world = World::new();
    let id = world.text_block().await;

    let mut states = Vec::new();
    for i in 0..10 {
        let result = world
            .entity_vote(id, &format!("down{}", i), VoteDirection::Down)
            .await
            .unwrap();
        states.push(result.state());
    }

    assert_eq!(states[5], ContentState::Archived);
    assert_eq!(states[9], ContentState::Deleted);
    assert_eq!(world.brightness(&id).await, None);

    let records = world.deletion_log.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reason(), DeletionReason::Vote);
    assert_eq!(records[0].original_id(), &id);
    assert_eq!(world.bus.events_of_type("entity.deleted.v1").len(), 1);
    assert_eq!(world.bus.events_of_type("entity.archived.v1").len(), 1);

    let late = world.entity_vote(id, "late", VoteDirection::Up).await;
    assert!(matches!(late, Err(CanvasError::NotFound(_))));
}

#[tokio::test]
async fn restored_block_starts_fresh() {
    let world = World::new();
    let id = world.text_block().await;
    for i in 0..10 {
        world
            .entity_vote(id, &format!("down{}", i), VoteDirection::Down)
            .await
            .unwrap();
    }
    let record = world.deletion_log.list().await.unwrap().remove(0);

    let handler = RestoreDeletedBlockHandler::new(
        world.entities.clone(),
        world.deletion_log.clone(),
        world.bus.clone(),
        world.admins.clone(),
    );
    let restored = handler
        .handle(
            RestoreDeletedBlockCommand {
                record_id: *record.id(),
                restored_by: uid("admin"),
            },
            meta("admin"),
        )
        .await
        .unwrap();

    assert_ne!(restored.entity.id(), &id);
    assert_eq!(restored.entity.brightness().value(), 50);
    assert!(restored.entity.ledger().is_empty());
    assert!(restored.record.is_restored());

    let again = handler
        .handle(
            RestoreDeletedBlockCommand {
                record_id: *record.id(),
                restored_by: uid("admin"),
            },
            meta("admin"),
        )
        .await;
    assert!(again.is_err());
}

// =============================================================================
// Proposals
// =============================================================================

async fn propose(world: &World) -> Proposal {
    CreateProposalHandler::new(world.proposals.clone(), world.bus.clone())
        .handle(
            CreateProposalCommand {
                proposal_type: ProposalType::Idea,
                title: "Community garden".to_string(),
                description: Some("Plant the back lot".to_string()),
                proposed_by: uid("u"),
                proposed_by_name: "U".to_string(),
            },
            meta("u"),
        )
        .await
        .unwrap()
        .proposal
}

#[tokio::test]
async fn proposer_plus_four_upvotes_passes() {
    let world = World::new();
    let proposal = propose(&world).await;
    assert_eq!(proposal.net_votes(), 1);

    for voter in ["b", "c", "d", "e"] {
        world.proposal_vote(&proposal, voter, VoteDirection::Up).await;
    }

    let stored = world.proposals.find_by_id(proposal.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), ProposalStatus::Passed);
    assert_eq!(stored.net_votes(), 5);
}

#[tokio::test]
async fn net_minus_three_rejects() {
    let world = World::new();
    let proposal = propose(&world).await;

    for voter in ["b", "c", "d"] {
        world.proposal_vote(&proposal, voter, VoteDirection::Down).await;
    }
    let stored = world.proposals.find_by_id(proposal.id()).await.unwrap().unwrap();
    assert_eq!(stored.net_votes(), -2);
    assert_eq!(stored.status(), ProposalStatus::Active);

    world.proposal_vote(&proposal, "e", VoteDirection::Down).await;
    let stored = world.proposals.find_by_id(proposal.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), ProposalStatus::Rejected);
}

#[tokio::test]
async fn overdue_proposal_expires_on_read_exactly_once() {
    let world = World::new();
    let proposal = Proposal::new_at(
        ProposalType::Name,
        "Rename the hall",
        None,
        uid("u"),
        "U",
        Timestamp::now().minus_days(15),
    )
    .unwrap();
    world.proposals.save(&proposal).await.unwrap();

    let handler = GetProposalHandler::new(
        world.proposals.clone(),
        world.proposal_thresholds.clone(),
        world.expiry.clone(),
    );
    let query = || GetProposalQuery {
        proposal_id: *proposal.id(),
    };

    let first = handler.handle(query()).await.unwrap();
    let second = handler.handle(query()).await.unwrap();

    assert_eq!(first.status(), ProposalStatus::Expired);
    assert_eq!(second.status(), ProposalStatus::Expired);
    assert_eq!(world.bus.events_of_type("proposal.status_changed.v1").len(), 1);
}

// =============================================================================
// Voter removal cascade
// =============================================================================

#[tokio::test]
async fn removing_a_voter_withdraws_every_vote() {
    let world = World::new();
    let id = world.text_block().await;
    let proposal = propose(&world).await;
    world.entity_vote(id, "gone", VoteDirection::Up).await.unwrap();
    world.proposal_vote(&proposal, "gone", VoteDirection::Up).await;

    let handler = RemoveVoterHandler::new(
        world.entities.clone(),
        world.proposals.clone(),
        world.entity_thresholds.clone(),
        world.proposal_thresholds.clone(),
        world.expiry.clone(),
        world.admins.clone(),
    );
    let result = handler
        .handle(
            RemoveVoterCommand {
                voter: uid("gone"),
                requested_by: uid("gone"),
            },
            meta("gone"),
        )
        .await
        .unwrap();

    assert_eq!(result.entities_updated, vec![id]);
    assert_eq!(result.proposals_updated, vec![*proposal.id()]);
    assert_eq!(world.brightness(&id).await, Some(50));
    let stored = world.proposals.find_by_id(proposal.id()).await.unwrap().unwrap();
    assert_eq!(stored.net_votes(), 1);
    assert_eq!(stored.direction_of(&uid("gone")), None);
}
