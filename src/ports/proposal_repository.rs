//! Proposal repository port.
//!
//! Status changes use `transition_status`, a compare-and-set that only
//! succeeds while the stored status still equals `from`. Concurrent
//! expiry checks and threshold checks therefore close a proposal once.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProposalId, Timestamp, UserId};
use crate::domain::governance::{Proposal, ProposalStatus};
use crate::domain::voting::LedgerDelta;

/// Repository port for Proposal aggregates.
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Insert a new proposal.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` on persistence failure
    async fn save(&self, proposal: &Proposal) -> Result<(), DomainError>;

    /// Returns `None` if the proposal does not exist.
    async fn find_by_id(&self, id: &ProposalId) -> Result<Option<Proposal>, DomainError>;

    /// All proposals, newest first.
    async fn list(&self) -> Result<Vec<Proposal>, DomainError>;

    /// Atomically applies a ledger delta. Status is not touched.
    ///
    /// Returns the proposal after the write, or `None` if it does not exist.
    async fn apply_delta(
        &self,
        id: &ProposalId,
        delta: &LedgerDelta,
    ) -> Result<Option<Proposal>, DomainError>;

    /// Sets `status = to` only if it currently equals `from`.
    ///
    /// Returns true if this call performed the change.
    async fn transition_status(
        &self,
        id: &ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
        at: Timestamp,
    ) -> Result<bool, DomainError>;

    /// Proposals whose ledger contains `voter` in either direction.
    async fn find_voted_by(&self, voter: &UserId) -> Result<Vec<Proposal>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ProposalRepository) {}
    }
}
