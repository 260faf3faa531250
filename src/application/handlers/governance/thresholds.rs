//! ProposalThresholds - Closes a proposal whose tally crossed a threshold.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::domain::foundation::{CommandMetadata, EventContext, EventEnvelope, EventId, Timestamp};
use crate::domain::governance::{
    GovernanceError, Proposal, ProposalStatus, ProposalStatusChanged, StatusChangeCause,
};
use crate::ports::{EventPublisher, ProposalRepository};

/// Shared by the vote, voter-removal and read paths.
pub struct ProposalThresholds {
    repository: Arc<dyn ProposalRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ProposalThresholds {
    pub fn new(
        repository: Arc<dyn ProposalRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    /// Closes `proposal` if its tally calls for it.
    ///
    /// Returns the proposal as it now stands and the status this call
    /// closed it with. Losing the compare-and-set to another writer returns
    /// the stored proposal and `None`.
    pub async fn close_if_decided(
        &self,
        proposal: Proposal,
        metadata: &CommandMetadata,
    ) -> Result<(Proposal, Option<ProposalStatus>), GovernanceError> {
        self.close(proposal, |envelope| metadata.stamp(envelope)).await
    }

    /// Closes a proposal left decided but active by an interrupted vote.
    ///
    /// Runs ahead of expiry on reads, votes and the voter cascade, so a
    /// tally that reached a threshold is never expired or voted back.
    pub async fn settle(&self, proposal: Proposal) -> Result<Proposal, GovernanceError> {
        let (proposal, closed) = self
            .close(proposal, |envelope| {
                envelope.with_context(EventContext {
                    source: Some("reconcile".to_string()),
                    ..EventContext::default()
                })
            })
            .await?;
        if let Some(status) = closed {
            tracing::warn!(proposal_id = %proposal.id(), %status, "settled a decided proposal");
        }
        Ok(proposal)
    }

    pub async fn settle_all(&self, proposals: Vec<Proposal>) -> Result<Vec<Proposal>, GovernanceError> {
        try_join_all(proposals.into_iter().map(|p| self.settle(p))).await
    }

    async fn close(
        &self,
        mut proposal: Proposal,
        stamp: impl FnOnce(EventEnvelope) -> EventEnvelope,
    ) -> Result<(Proposal, Option<ProposalStatus>), GovernanceError> {
        let Some(target) = proposal.evaluate_votes() else {
            return Ok((proposal, None));
        };

        let id = *proposal.id();
        let now = Timestamp::now();
        let claimed = self
            .repository
            .transition_status(&id, ProposalStatus::Active, target, now)
            .await?;
        if !claimed {
            let current = self.repository.find_by_id(&id).await?.unwrap_or(proposal);
            return Ok((current, None));
        }

        proposal.transition(target, now)?;
        let event = ProposalStatusChanged {
            event_id: EventId::new(),
            proposal_id: id,
            from: ProposalStatus::Active,
            to: target,
            cause: StatusChangeCause::Votes,
            net_votes: proposal.net_votes(),
            changed_at: now,
        };
        self.event_publisher
            .publish(stamp(EventEnvelope::from_event(&event)))
            .await?;
        tracing::info!(
            proposal_id = %id,
            status = %target,
            net_votes = proposal.net_votes(),
            "proposal closed by votes"
        );

        Ok((proposal, Some(target)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemoryProposalRepository;
    use crate::domain::foundation::UserId;
    use crate::domain::governance::ProposalType;
    use crate::domain::voting::{VoteDirection, VoteLedger};

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn proposal_with(up: &[&str], down: &[&str]) -> Proposal {
        let created = Timestamp::now();
        Proposal::reconstitute(
            crate::domain::foundation::ProposalId::new(),
            ProposalType::Idea,
            "Shared bikes".to_string(),
            None,
            uid("u"),
            "U".to_string(),
            VoteLedger::from_sets(
                up.iter().map(|s| uid(s)),
                down.iter().map(|s| uid(s)),
            )
            .unwrap(),
            ProposalStatus::Active,
            created,
            created.plus_days(14),
            None,
        )
    }

    #[tokio::test]
    async fn undecided_tally_is_left_open() {
        let repo = Arc::new(InMemoryProposalRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let thresholds = ProposalThresholds::new(repo.clone(), bus.clone());
        let proposal = proposal_with(&["a", "b"], &["c"]);
        repo.save(&proposal).await.unwrap();

        let (after, closed) = thresholds
            .close_if_decided(proposal, &CommandMetadata::new(uid("a")))
            .await
            .unwrap();
        assert_eq!(closed, None);
        assert_eq!(after.status(), ProposalStatus::Active);
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn only_the_first_closer_wins() {
        let repo = Arc::new(InMemoryProposalRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let thresholds = ProposalThresholds::new(repo.clone(), bus.clone());
        let proposal = proposal_with(&[], &["a", "b", "c"]);
        repo.save(&proposal).await.unwrap();
        let meta = CommandMetadata::new(uid("a"));

        let (_, first) = thresholds.close_if_decided(proposal.clone(), &meta).await.unwrap();
        let (after, second) = thresholds.close_if_decided(proposal, &meta).await.unwrap();

        assert_eq!(first, Some(ProposalStatus::Rejected));
        assert_eq!(second, None);
        assert_eq!(after.status(), ProposalStatus::Rejected);
        assert_eq!(bus.events_of_type("proposal.status_changed.v1").len(), 1);
        assert_eq!(after.direction_of(&uid("a")), Some(VoteDirection::Down));
    }

    #[tokio::test]
    async fn settle_closes_a_tally_left_past_the_bar() {
        let repo = Arc::new(InMemoryProposalRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let thresholds = ProposalThresholds::new(repo.clone(), bus.clone());
        let proposal = proposal_with(&["a", "b", "c", "d", "e"], &[]);
        repo.save(&proposal).await.unwrap();

        let settled = thresholds.settle(proposal.clone()).await.unwrap();
        let again = thresholds.settle(proposal).await.unwrap();

        assert_eq!(settled.status(), ProposalStatus::Passed);
        assert_eq!(again.status(), ProposalStatus::Passed);
        let closed = bus.events_of_type("proposal.status_changed.v1");
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].context.source.as_deref(), Some("reconcile"));
        assert_eq!(closed[0].context.user_id, None);
    }
}
