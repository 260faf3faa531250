//! In-memory proposal store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ProposalId, Timestamp, UserId};
use crate::domain::governance::{Proposal, ProposalStatus};
use crate::domain::voting::LedgerDelta;
use crate::ports::ProposalRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryProposalRepository {
    proposals: Arc<RwLock<HashMap<ProposalId, Proposal>>>,
}

impl InMemoryProposalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProposalRepository for InMemoryProposalRepository {
    async fn save(&self, proposal: &Proposal) -> Result<(), DomainError> {
        self.proposals
            .write()
            .await
            .insert(*proposal.id(), proposal.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProposalId) -> Result<Option<Proposal>, DomainError> {
        Ok(self.proposals.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Proposal>, DomainError> {
        let proposals = self.proposals.read().await;
        let mut listed: Vec<Proposal> = proposals.values().cloned().collect();
        listed.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        Ok(listed)
    }

    async fn apply_delta(
        &self,
        id: &ProposalId,
        delta: &LedgerDelta,
    ) -> Result<Option<Proposal>, DomainError> {
        let mut proposals = self.proposals.write().await;
        Ok(proposals.get_mut(id).map(|proposal| {
            proposal.apply_delta(delta);
            proposal.clone()
        }))
    }

    async fn transition_status(
        &self,
        id: &ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
        at: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut proposals = self.proposals.write().await;
        match proposals.get_mut(id) {
            Some(proposal) if proposal.status() == from => {
                proposal.transition(to, at)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_voted_by(&self, voter: &UserId) -> Result<Vec<Proposal>, DomainError> {
        let proposals = self.proposals.read().await;
        Ok(proposals
            .values()
            .filter(|p| p.ledger().contains(voter))
            .cloned()
            .collect())
    }
}
