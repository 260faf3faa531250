//! Governance domain events.

use serde::{Deserialize, Serialize};

use super::{ProposalStatus, ProposalType};
use crate::domain::foundation::{domain_event, EventId, ProposalId, Timestamp, UserId};
use crate::domain::voting::VoteTransition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalCreated {
    pub event_id: EventId,
    pub proposal_id: ProposalId,
    pub proposal_type: ProposalType,
    pub title: String,
    pub proposed_by: UserId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

domain_event!(ProposalCreated: "proposal.created.v1", Proposal(proposal_id), at created_at);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalVoteRecorded {
    pub event_id: EventId,
    pub proposal_id: ProposalId,
    pub voter: UserId,
    pub transition: VoteTransition,
    pub net_votes: i32,
    pub recorded_at: Timestamp,
}

domain_event!(
    ProposalVoteRecorded: "proposal.vote_recorded.v1",
    Proposal(proposal_id),
    at recorded_at
);

/// What closed a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChangeCause {
    Votes,
    Expiry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalStatusChanged {
    pub event_id: EventId,
    pub proposal_id: ProposalId,
    pub from: ProposalStatus,
    pub to: ProposalStatus,
    pub cause: StatusChangeCause,
    pub net_votes: i32,
    pub changed_at: Timestamp,
}

domain_event!(
    ProposalStatusChanged: "proposal.status_changed.v1",
    Proposal(proposal_id),
    at changed_at
);
