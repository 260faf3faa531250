//! Governance domain module.
//!
//! Proposals voted on by members, closed by net-vote thresholds or by
//! lazy expiry.

mod errors;
mod events;
mod proposal;
mod status;

pub use errors::GovernanceError;
pub use events::{ProposalCreated, ProposalStatusChanged, ProposalVoteRecorded, StatusChangeCause};
pub use proposal::{
    Proposal, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, PASS_THRESHOLD,
    REJECT_THRESHOLD, VOTING_PERIOD_DAYS,
};
pub use status::{ProposalStatus, ProposalType};
