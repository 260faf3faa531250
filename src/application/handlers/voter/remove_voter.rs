//! RemoveVoterHandler - Account-deletion cascade.
//!
//! Strips one voter from every entity and proposal ledger. Each removal is
//! its own atomic delta, followed by the same threshold checks a vote
//! would trigger. This is the only path that edits another user's votes,
//! so it is limited to the voter themself or an admin.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::application::handlers::canvas::{ThresholdAction, ThresholdEnforcer};
use crate::application::handlers::governance::{ProposalExpiryChecker, ProposalThresholds};
use crate::domain::canvas::{CanvasError, VotableEntity};
use crate::domain::foundation::{
    AdminRoster, CommandMetadata, DomainError, EntityId, ErrorCode, ProposalId, Timestamp, UserId,
};
use crate::domain::governance::{GovernanceError, Proposal, ProposalStatus};
use crate::ports::{ProposalRepository, VotableRepository};

/// Command to remove a voter everywhere.
#[derive(Debug, Clone)]
pub struct RemoveVoterCommand {
    pub voter: UserId,
    pub requested_by: UserId,
}

/// What the cascade touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveVoterResult {
    pub entities_updated: Vec<EntityId>,
    /// Text blocks whose brightness fell to zero once the vote was gone.
    pub entities_deleted: Vec<EntityId>,
    pub proposals_updated: Vec<ProposalId>,
    pub proposals_closed: Vec<(ProposalId, ProposalStatus)>,
}

/// Errors raised by the voter cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoterError {
    /// Caller is neither the voter nor an admin.
    Forbidden,
    /// The entity half of the cascade failed.
    Canvas(CanvasError),
    /// The proposal half of the cascade failed.
    Governance(GovernanceError),
    StoreUnavailable(String),
}

impl VoterError {
    pub fn code(&self) -> ErrorCode {
        match self {
            VoterError::Forbidden => ErrorCode::Forbidden,
            VoterError::Canvas(err) => err.code(),
            VoterError::Governance(err) => err.code(),
            VoterError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
        }
    }

    pub fn message(&self) -> String {
        match self {
            VoterError::Forbidden => "Only the voter or an admin may remove these votes".to_string(),
            VoterError::Canvas(err) => err.message(),
            VoterError::Governance(err) => err.message(),
            VoterError::StoreUnavailable(msg) => format!("Store unavailable: {}", msg),
        }
    }
}

impl std::fmt::Display for VoterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for VoterError {}

impl From<DomainError> for VoterError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden | ErrorCode::Unauthorized => VoterError::Forbidden,
            _ => VoterError::StoreUnavailable(err.message),
        }
    }
}

impl From<CanvasError> for VoterError {
    fn from(err: CanvasError) -> Self {
        VoterError::Canvas(err)
    }
}

impl From<GovernanceError> for VoterError {
    fn from(err: GovernanceError) -> Self {
        VoterError::Governance(err)
    }
}

pub struct RemoveVoterHandler {
    entities: Arc<dyn VotableRepository>,
    proposals: Arc<dyn ProposalRepository>,
    entity_thresholds: Arc<ThresholdEnforcer>,
    proposal_thresholds: Arc<ProposalThresholds>,
    expiry: Arc<ProposalExpiryChecker>,
    admins: Arc<AdminRoster>,
}

impl RemoveVoterHandler {
    pub fn new(
        entities: Arc<dyn VotableRepository>,
        proposals: Arc<dyn ProposalRepository>,
        entity_thresholds: Arc<ThresholdEnforcer>,
        proposal_thresholds: Arc<ProposalThresholds>,
        expiry: Arc<ProposalExpiryChecker>,
        admins: Arc<AdminRoster>,
    ) -> Self {
        Self {
            entities,
            proposals,
            entity_thresholds,
            proposal_thresholds,
            expiry,
            admins,
        }
    }

    pub async fn handle(
        &self,
        cmd: RemoveVoterCommand,
        metadata: CommandMetadata,
    ) -> Result<RemoveVoterResult, VoterError> {
        self.admins
            .require_self_or_admin(&cmd.requested_by, &cmd.voter)
            .map_err(|err| {
                tracing::warn!(
                    requested_by = %cmd.requested_by,
                    voter = %cmd.voter,
                    "voter removal denied"
                );
                VoterError::from(err)
            })?;

        let metadata = metadata.with_source("cascade");
        let mut result = RemoveVoterResult::default();

        // Entities
        let voted = self.entities.find_voted_by(&cmd.voter).await?;
        let outcomes = try_join_all(
            voted
                .iter()
                .map(|entity| self.strip_entity(entity, &cmd.voter, &metadata)),
        )
        .await?;
        for (id, action) in outcomes.into_iter().flatten() {
            result.entities_updated.push(id);
            if matches!(action, ThresholdAction::Deleted(_)) {
                result.entities_deleted.push(id);
            }
        }

        // Proposals
        let voted = self.proposals.find_voted_by(&cmd.voter).await?;
        let outcomes = try_join_all(
            voted
                .into_iter()
                .map(|proposal| self.strip_proposal(proposal, &cmd.voter, &metadata)),
        )
        .await?;
        for (id, closed) in outcomes.into_iter().flatten() {
            result.proposals_updated.push(id);
            if let Some(status) = closed {
                result.proposals_closed.push((id, status));
            }
        }

        tracing::info!(
            voter = %cmd.voter,
            entities = result.entities_updated.len(),
            deleted = result.entities_deleted.len(),
            proposals = result.proposals_updated.len(),
            closed = result.proposals_closed.len(),
            "voter removed from all ledgers"
        );

        Ok(result)
    }

    async fn strip_entity(
        &self,
        entity: &VotableEntity,
        voter: &UserId,
        metadata: &CommandMetadata,
    ) -> Result<Option<(EntityId, ThresholdAction)>, CanvasError> {
        let Some(delta) = entity.removal_delta(voter) else {
            return Ok(None);
        };
        let Some(applied) = self.entities.apply_delta(entity.id(), &delta).await? else {
            // Deleted between listing and removal.
            return Ok(None);
        };
        let action = self
            .entity_thresholds
            .enforce(&applied.entity, Some(applied.state_before()), metadata)
            .await?;
        Ok(Some((*entity.id(), action)))
    }

    /// Closed proposals lose the vote but keep their status.
    async fn strip_proposal(
        &self,
        proposal: Proposal,
        voter: &UserId,
        metadata: &CommandMetadata,
    ) -> Result<Option<(ProposalId, Option<ProposalStatus>)>, GovernanceError> {
        // A tally already past a threshold is decided before the vote goes.
        let proposal = self.proposal_thresholds.settle(proposal).await?;
        let Some(delta) = proposal.removal_delta(voter) else {
            return Ok(None);
        };
        let id = *proposal.id();
        let Some(updated) = self.proposals.apply_delta(&id, &delta).await? else {
            return Ok(None);
        };
        let updated = self.expiry.check(updated, Timestamp::now()).await?;
        let (_, closed) = self
            .proposal_thresholds
            .close_if_decided(updated, metadata)
            .await?;
        Ok(Some((id, closed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryDeletionLog, InMemoryProposalRepository, InMemoryVotableRepository,
    };
    use crate::domain::canvas::{EntityKind, TextBlock};
    use crate::domain::governance::ProposalType;
    use crate::domain::voting::{Brightness, LedgerDelta, VoteDirection, VoteLedger};

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    struct Fixture {
        entities: Arc<InMemoryVotableRepository>,
        proposals: Arc<InMemoryProposalRepository>,
        handler: RemoveVoterHandler,
    }

    fn fixture() -> Fixture {
        let entities = Arc::new(InMemoryVotableRepository::new());
        let proposals = Arc::new(InMemoryProposalRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let entity_thresholds = Arc::new(ThresholdEnforcer::new(
            entities.clone(),
            Arc::new(InMemoryDeletionLog::new()),
            bus.clone(),
        ));
        let proposal_thresholds = Arc::new(ProposalThresholds::new(proposals.clone(), bus.clone()));
        let expiry = Arc::new(ProposalExpiryChecker::new(proposals.clone(), bus));
        let handler = RemoveVoterHandler::new(
            entities.clone(),
            proposals.clone(),
            entity_thresholds,
            proposal_thresholds,
            expiry,
            Arc::new(AdminRoster::new([uid("root")])),
        );
        Fixture {
            entities,
            proposals,
            handler,
        }
    }

    fn remove(voter: &str, by: &str) -> RemoveVoterCommand {
        RemoveVoterCommand {
            voter: uid(voter),
            requested_by: uid(by),
        }
    }

    #[tokio::test]
    async fn removes_votes_and_restores_brightness() {
        let f = fixture();
        let entity = VotableEntity::new(
            EntityKind::TextBlock(TextBlock::new("x", 0.0, 0.0).unwrap()),
            uid("author"),
        );
        f.entities.save(&entity).await.unwrap();
        f.entities
            .apply_delta(
                entity.id(),
                &LedgerDelta {
                    voter: uid("leaver"),
                    set_to: Some(VoteDirection::Up),
                    net_change: 5,
                },
            )
            .await
            .unwrap();

        let result = f
            .handler
            .handle(remove("leaver", "leaver"), CommandMetadata::new(uid("leaver")))
            .await
            .unwrap();

        assert_eq!(result.entities_updated, vec![*entity.id()]);
        let stored = f.entities.find_by_id(entity.id()).await.unwrap().unwrap();
        assert_eq!(stored.brightness().value(), 50);
        assert_eq!(stored.direction_of(&uid("leaver")), None);
    }

    #[tokio::test]
    async fn losing_the_last_upvote_can_delete_a_block() {
        let f = fixture();
        let entity = VotableEntity::reconstitute(
            EntityId::new(),
            EntityKind::TextBlock(TextBlock::new("x", 0.0, 0.0).unwrap()),
            Brightness::new(5).unwrap(),
            VoteLedger::with_vote(uid("leaver"), VoteDirection::Up),
            uid("author"),
            Timestamp::now(),
            Timestamp::now(),
        );
        f.entities.save(&entity).await.unwrap();

        let result = f
            .handler
            .handle(remove("leaver", "root"), CommandMetadata::new(uid("root")))
            .await
            .unwrap();

        assert_eq!(result.entities_deleted, vec![*entity.id()]);
        assert!(f.entities.find_by_id(entity.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn removing_a_downvote_can_pass_a_proposal() {
        let f = fixture();
        let created = Timestamp::now();
        let proposal = Proposal::reconstitute(
            ProposalId::new(),
            ProposalType::Value,
            "Compost".to_string(),
            None,
            uid("u"),
            "U".to_string(),
            VoteLedger::from_sets(
                ["u", "a", "b", "c", "d"].map(uid),
                [uid("leaver")],
            )
            .unwrap(),
            ProposalStatus::Active,
            created,
            created.plus_days(14),
            None,
        );
        f.proposals.save(&proposal).await.unwrap();

        let result = f
            .handler
            .handle(remove("leaver", "leaver"), CommandMetadata::new(uid("leaver")))
            .await
            .unwrap();

        assert_eq!(
            result.proposals_closed,
            vec![(*proposal.id(), ProposalStatus::Passed)]
        );
        let stored = f.proposals.find_by_id(proposal.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ProposalStatus::Passed);
    }

    #[tokio::test]
    async fn someone_else_is_forbidden() {
        let f = fixture();
        let err = f
            .handler
            .handle(remove("leaver", "mallory"), CommandMetadata::new(uid("mallory")))
            .await
            .unwrap_err();
        assert_eq!(err, VoterError::Forbidden);
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn voter_with_no_votes_is_a_no_op() {
        let f = fixture();
        let result = f
            .handler
            .handle(remove("nobody", "nobody"), CommandMetadata::new(uid("nobody")))
            .await
            .unwrap();
        assert_eq!(result, RemoveVoterResult::default());
    }
}
