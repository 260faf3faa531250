//! Request and response types for proposal endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::governance::CastProposalVoteResult;
use crate::domain::foundation::{ProposalId, Timestamp, UserId};
use crate::domain::governance::{Proposal, ProposalStatus, ProposalType};
use crate::domain::voting::{VoteDirection, VoteTransition};

/// Body of `POST /api/proposals`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProposalRequest {
    pub proposal_type: ProposalType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Proposal as shown to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalView {
    pub id: ProposalId,
    pub proposal_type: ProposalType,
    pub title: String,
    pub description: Option<String>,
    pub proposed_by: UserId,
    pub proposed_by_name: String,
    pub status: ProposalStatus,
    pub net_votes: i32,
    pub upvoters: Vec<UserId>,
    pub downvoters: Vec<UserId>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}

impl From<&Proposal> for ProposalView {
    fn from(proposal: &Proposal) -> Self {
        Self {
            id: *proposal.id(),
            proposal_type: proposal.proposal_type(),
            title: proposal.title().to_string(),
            description: proposal.description().map(str::to_string),
            proposed_by: proposal.proposed_by().clone(),
            proposed_by_name: proposal.proposed_by_name().to_string(),
            status: proposal.status(),
            net_votes: proposal.net_votes(),
            upvoters: proposal.ledger().upvoters().cloned().collect(),
            downvoters: proposal.ledger().downvoters().cloned().collect(),
            created_at: *proposal.created_at(),
            expires_at: *proposal.expires_at(),
            closed_at: proposal.closed_at().copied(),
        }
    }
}

/// Outcome of `POST /api/proposals/:id/vote`.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalVoteResponse {
    #[serde(flatten)]
    pub transition: VoteTransition,
    pub current_vote: Option<VoteDirection>,
    /// Set when this vote closed the proposal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_as: Option<ProposalStatus>,
    pub proposal: ProposalView,
}

impl From<&CastProposalVoteResult> for ProposalVoteResponse {
    fn from(result: &CastProposalVoteResult) -> Self {
        Self {
            transition: result.transition,
            current_vote: result.current_vote(),
            closed_as: result.closed_as,
            proposal: ProposalView::from(&result.proposal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_deserializes_without_description() {
        let json = r#"{"proposal_type": "value", "title": "Quiet hours"}"#;
        let req: CreateProposalRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.title, "Quiet hours");
        assert!(req.description.is_none());
    }

    #[test]
    fn view_counts_the_proposer_upvote() {
        let proposal = Proposal::new(
            ProposalType::Value,
            "Quiet hours",
            None,
            UserId::new("u").unwrap(),
            "U",
        )
        .unwrap();

        let json = serde_json::to_value(ProposalView::from(&proposal)).unwrap();

        assert_eq!(json["status"], "active");
        assert_eq!(json["net_votes"], 1);
        assert_eq!(json["upvoters"][0], "u");
    }
}
