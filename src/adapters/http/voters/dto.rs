//! Response types for voter endpoints.

use serde::Serialize;

use crate::application::handlers::voter::RemoveVoterResult;
use crate::domain::foundation::{EntityId, ProposalId};
use crate::domain::governance::ProposalStatus;

#[derive(Debug, Clone, Serialize)]
pub struct ClosedProposalView {
    pub proposal_id: ProposalId,
    pub status: ProposalStatus,
}

/// Outcome of `DELETE /api/voters/:user_id`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveVoterResponse {
    pub entities_updated: Vec<EntityId>,
    pub entities_deleted: Vec<EntityId>,
    pub proposals_updated: Vec<ProposalId>,
    pub proposals_closed: Vec<ClosedProposalView>,
}

impl From<RemoveVoterResult> for RemoveVoterResponse {
    fn from(result: RemoveVoterResult) -> Self {
        Self {
            entities_updated: result.entities_updated,
            entities_deleted: result.entities_deleted,
            proposals_updated: result.proposals_updated,
            proposals_closed: result
                .proposals_closed
                .into_iter()
                .map(|(proposal_id, status)| ClosedProposalView {
                    proposal_id,
                    status,
                })
                .collect(),
        }
    }
}
