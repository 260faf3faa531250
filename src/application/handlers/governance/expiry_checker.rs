//! ProposalExpiryChecker - Lazy expiry of overdue proposals.
//!
//! There is no scheduler. Every read of a proposal goes through `check`,
//! which moves an overdue active proposal to `Expired` with a
//! compare-and-set in the store. Re-checking an already expired proposal
//! finds it closed and does nothing.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::domain::foundation::{EventEnvelope, EventId, Timestamp};
use crate::domain::governance::{
    GovernanceError, Proposal, ProposalStatus, ProposalStatusChanged, StatusChangeCause,
};
use crate::ports::{EventPublisher, ProposalRepository};

pub struct ProposalExpiryChecker {
    repository: Arc<dyn ProposalRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ProposalExpiryChecker {
    pub fn new(
        repository: Arc<dyn ProposalRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    /// Returns the proposal as it stands after expiry is applied.
    pub async fn check(&self, proposal: Proposal, now: Timestamp) -> Result<Proposal, GovernanceError> {
        if !proposal.is_overdue(&now) {
            return Ok(proposal);
        }

        let id = *proposal.id();
        let claimed = self
            .repository
            .transition_status(&id, ProposalStatus::Active, ProposalStatus::Expired, now)
            .await?;

        if !claimed {
            // Closed by a concurrent vote or read; the store has the answer.
            return Ok(self.repository.find_by_id(&id).await?.unwrap_or(proposal));
        }

        let mut expired = proposal;
        expired.transition(ProposalStatus::Expired, now)?;

        let event = ProposalStatusChanged {
            event_id: EventId::new(),
            proposal_id: id,
            from: ProposalStatus::Active,
            to: ProposalStatus::Expired,
            cause: StatusChangeCause::Expiry,
            net_votes: expired.net_votes(),
            changed_at: now,
        };
        self.event_publisher
            .publish(EventEnvelope::from_event(&event))
            .await?;

        tracing::info!(proposal_id = %id, net_votes = expired.net_votes(), "proposal expired");
        Ok(expired)
    }

    /// Checks a batch concurrently, preserving order.
    pub async fn check_all(
        &self,
        proposals: Vec<Proposal>,
        now: Timestamp,
    ) -> Result<Vec<Proposal>, GovernanceError> {
        let overdue = proposals.iter().filter(|p| p.is_overdue(&now)).count();
        if overdue > 0 {
            tracing::debug!(overdue, "expiring overdue proposals");
        }
        try_join_all(proposals.into_iter().map(|p| self.check(p, now))).await
    }
}
