//! Proposal queries.
//!
//! Every read first settles a tally that already crossed a threshold, then
//! runs lazy expiry. Both steps are compare-and-sets from `Active`.

use std::sync::Arc;

use super::{ProposalExpiryChecker, ProposalThresholds};
use crate::domain::foundation::{ProposalId, Timestamp, UserId};
use crate::domain::governance::{GovernanceError, Proposal};
use crate::domain::voting::VoteDirection;
use crate::ports::ProposalRepository;

#[derive(Debug, Clone)]
pub struct GetProposalQuery {
    pub proposal_id: ProposalId,
}

pub struct GetProposalHandler {
    repository: Arc<dyn ProposalRepository>,
    thresholds: Arc<ProposalThresholds>,
    expiry: Arc<ProposalExpiryChecker>,
}

impl GetProposalHandler {
    pub fn new(
        repository: Arc<dyn ProposalRepository>,
        thresholds: Arc<ProposalThresholds>,
        expiry: Arc<ProposalExpiryChecker>,
    ) -> Self {
        Self {
            repository,
            thresholds,
            expiry,
        }
    }

    pub async fn handle(&self, query: GetProposalQuery) -> Result<Proposal, GovernanceError> {
        let proposal = self
            .repository
            .find_by_id(&query.proposal_id)
            .await?
            .ok_or(GovernanceError::NotFound(query.proposal_id))?;
        let proposal = self.thresholds.settle(proposal).await?;
        self.expiry.check(proposal, Timestamp::now()).await
    }
}

/// All proposals, newest first.
#[derive(Debug, Clone, Default)]
pub struct ListProposalsQuery;

pub struct ListProposalsHandler {
    repository: Arc<dyn ProposalRepository>,
    thresholds: Arc<ProposalThresholds>,
    expiry: Arc<ProposalExpiryChecker>,
}

impl ListProposalsHandler {
    pub fn new(
        repository: Arc<dyn ProposalRepository>,
        thresholds: Arc<ProposalThresholds>,
        expiry: Arc<ProposalExpiryChecker>,
    ) -> Self {
        Self {
            repository,
            thresholds,
            expiry,
        }
    }

    pub async fn handle(&self, _query: ListProposalsQuery) -> Result<Vec<Proposal>, GovernanceError> {
        let proposals = self.repository.list().await?;
        let proposals = self.thresholds.settle_all(proposals).await?;
        self.expiry.check_all(proposals, Timestamp::now()).await
    }
}

#[derive(Debug, Clone)]
pub struct GetProposalVoteQuery {
    pub proposal_id: ProposalId,
    pub voter: UserId,
}

/// The caller's current vote on a proposal. `None` means no vote.
pub struct GetProposalVoteHandler {
    repository: Arc<dyn ProposalRepository>,
}

impl GetProposalVoteHandler {
    pub fn new(repository: Arc<dyn ProposalRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetProposalVoteQuery,
    ) -> Result<Option<VoteDirection>, GovernanceError> {
        let proposal = self
            .repository
            .find_by_id(&query.proposal_id)
            .await?
            .ok_or(GovernanceError::NotFound(query.proposal_id))?;
        Ok(proposal.direction_of(&query.voter))
    }
}
