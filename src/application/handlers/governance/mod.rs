//! Governance command and query handlers.

mod cast_proposal_vote;
mod create_proposal;
mod expiry_checker;
mod get_proposal;
mod thresholds;

pub use cast_proposal_vote::{
    CastProposalVoteCommand, CastProposalVoteHandler, CastProposalVoteResult,
};
pub use create_proposal::{CreateProposalCommand, CreateProposalHandler, CreateProposalResult};
pub use expiry_checker::ProposalExpiryChecker;
pub use get_proposal::{
    GetProposalHandler, GetProposalQuery, GetProposalVoteHandler, GetProposalVoteQuery,
    ListProposalsHandler, ListProposalsQuery,
};
pub use thresholds::ProposalThresholds;
