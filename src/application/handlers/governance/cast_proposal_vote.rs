//! CastProposalVoteHandler - Command handler for voting on a proposal.
//!
//! Flow:
//! 1. Load the proposal, settle a tally left decided, apply lazy expiry
//! 2. Refuse the vote if the proposal is closed
//! 3. Apply the ledger delta atomically
//! 4. Close the proposal if the new tally crosses a threshold
//!    (compare-and-set from `Active`, so only one writer closes it)

use std::sync::Arc;

use super::{ProposalExpiryChecker, ProposalThresholds};
use crate::domain::foundation::{CommandMetadata, EventEnvelope, EventId, ProposalId, Timestamp, UserId};
use crate::domain::governance::{GovernanceError, Proposal, ProposalStatus, ProposalVoteRecorded};
use crate::domain::voting::{VoteDirection, VoteTransition};
use crate::ports::{EventPublisher, ProposalRepository};

#[derive(Debug, Clone)]
pub struct CastProposalVoteCommand {
    pub proposal_id: ProposalId,
    pub voter: UserId,
    pub direction: VoteDirection,
}

#[derive(Debug, Clone)]
pub struct CastProposalVoteResult {
    pub proposal: Proposal,
    pub transition: VoteTransition,
    /// Set when this vote closed the proposal.
    pub closed_as: Option<ProposalStatus>,
}

impl CastProposalVoteResult {
    pub fn current_vote(&self) -> Option<VoteDirection> {
        self.transition.resulting_direction()
    }
}

pub struct CastProposalVoteHandler {
    repository: Arc<dyn ProposalRepository>,
    expiry: Arc<ProposalExpiryChecker>,
    thresholds: Arc<ProposalThresholds>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CastProposalVoteHandler {
    pub fn new(
        repository: Arc<dyn ProposalRepository>,
        expiry: Arc<ProposalExpiryChecker>,
        thresholds: Arc<ProposalThresholds>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            expiry,
            thresholds,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CastProposalVoteCommand,
        metadata: CommandMetadata,
    ) -> Result<CastProposalVoteResult, GovernanceError> {
        // 1. Load, settle and expire
        let proposal = self
            .repository
            .find_by_id(&cmd.proposal_id)
            .await?
            .ok_or(GovernanceError::NotFound(cmd.proposal_id))?;
        let proposal = self.thresholds.settle(proposal).await?;
        let proposal = self.expiry.check(proposal, Timestamp::now()).await?;

        // 2. Closed proposals take no votes
        if !proposal.status().is_open() {
            return Err(GovernanceError::closed(cmd.proposal_id, proposal.status()));
        }
        let (transition, delta) = proposal.prepare_vote(&cmd.voter, cmd.direction)?;

        // 3. Atomic write
        let updated = self
            .repository
            .apply_delta(&cmd.proposal_id, &delta)
            .await?
            .ok_or(GovernanceError::NotFound(cmd.proposal_id))?;

        let recorded = ProposalVoteRecorded {
            event_id: EventId::new(),
            proposal_id: cmd.proposal_id,
            voter: cmd.voter.clone(),
            transition,
            net_votes: updated.net_votes(),
            recorded_at: Timestamp::now(),
        };
        self.event_publisher
            .publish(metadata.stamp(EventEnvelope::from_event(&recorded)))
            .await?;

        tracing::info!(
            proposal_id = %cmd.proposal_id,
            voter = %cmd.voter,
            transition = ?transition,
            net_votes = updated.net_votes(),
            "proposal vote applied"
        );

        // 4. Thresholds
        let (proposal, closed_as) = self.thresholds.close_if_decided(updated, &metadata).await?;

        Ok(CastProposalVoteResult {
            proposal,
            transition,
            closed_as,
        })
    }
}
