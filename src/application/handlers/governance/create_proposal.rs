//! CreateProposalHandler - Command handler for opening a governance proposal.
//!
//! The proposer's upvote is recorded at creation, so a new proposal starts
//! at net 1.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, EventEnvelope, EventId, UserId};
use crate::domain::governance::{GovernanceError, Proposal, ProposalCreated, ProposalType};
use crate::ports::{EventPublisher, ProposalRepository};

/// Command to create a proposal.
#[derive(Debug, Clone)]
pub struct CreateProposalCommand {
    pub proposal_type: ProposalType,
    pub title: String,
    pub description: Option<String>,
    pub proposed_by: UserId,
    /// Shown next to the proposal; falls back to the user id when blank.
    pub proposed_by_name: String,
}

#[derive(Debug, Clone)]
pub struct CreateProposalResult {
    pub proposal: Proposal,
    pub event: ProposalCreated,
}

pub struct CreateProposalHandler {
    repository: Arc<dyn ProposalRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreateProposalHandler {
    pub fn new(
        repository: Arc<dyn ProposalRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateProposalCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateProposalResult, GovernanceError> {
        // 1. Build (validates title and description)
        let proposal = Proposal::new(
            cmd.proposal_type,
            cmd.title,
            cmd.description,
            cmd.proposed_by,
            cmd.proposed_by_name,
        )?;

        // 2. Persist
        self.repository.save(&proposal).await?;

        // 3. Publish
        let event = ProposalCreated {
            event_id: EventId::new(),
            proposal_id: *proposal.id(),
            proposal_type: proposal.proposal_type(),
            title: proposal.title().to_string(),
            proposed_by: proposal.proposed_by().clone(),
            expires_at: *proposal.expires_at(),
            created_at: *proposal.created_at(),
        };
        self.event_publisher
            .publish(metadata.stamp(EventEnvelope::from_event(&event)))
            .await?;

        tracing::info!(
            proposal_id = %proposal.id(),
            proposal_type = %proposal.proposal_type(),
            "proposal created"
        );

        Ok(CreateProposalResult { proposal, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemoryProposalRepository;
    use crate::domain::governance::ProposalStatus;
    use crate::domain::voting::VoteDirection;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn handler() -> (CreateProposalHandler, Arc<InMemoryProposalRepository>, Arc<InMemoryEventBus>) {
        let repo = Arc::new(InMemoryProposalRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        (CreateProposalHandler::new(repo.clone(), bus.clone()), repo, bus)
    }

    fn cmd(title: &str) -> CreateProposalCommand {
        CreateProposalCommand {
            proposal_type: ProposalType::Name,
            title: title.to_string(),
            description: Some("Rename the commons".to_string()),
            proposed_by: uid("u"),
            proposed_by_name: "Uma".to_string(),
        }
    }

    #[tokio::test]
    async fn proposer_upvote_is_recorded() {
        let (handler, repo, bus) = handler();
        let result = handler.handle(cmd("The Lantern"), CommandMetadata::new(uid("u"))).await.unwrap();

        let stored = repo.find_by_id(result.proposal.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ProposalStatus::Active);
        assert_eq!(stored.net_votes(), 1);
        assert_eq!(stored.direction_of(&uid("u")), Some(VoteDirection::Up));
        assert!(bus.has_event("proposal.created.v1"));
    }

    #[tokio::test]
    async fn blank_title_is_a_validation_error() {
        let (handler, repo, bus) = handler();
        let err = handler.handle(cmd("   "), CommandMetadata::new(uid("u"))).await.unwrap_err();

        assert!(matches!(err, GovernanceError::ValidationFailed { ref field, .. } if field == "title"));
        assert!(repo.list().await.unwrap().is_empty());
        assert_eq!(bus.event_count(), 0);
    }
}
