//! Proposal type and status enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// What a proposal is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    Name,
    Value,
    Idea,
}

impl ProposalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalType::Name => "name",
            ProposalType::Value => "value",
            ProposalType::Idea => "idea",
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ProposalType::Name),
            "value" => Ok(ProposalType::Value),
            "idea" => Ok(ProposalType::Idea),
            other => Err(ValidationError::invalid_format(
                "proposal_type",
                format!("unknown proposal type '{}'", other),
            )),
        }
    }
}

/// Lifecycle status of a proposal.
///
/// Valid transitions:
/// - Active -> Passed | Rejected | Expired
///
/// The three closed states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    Active,
    Passed,
    Rejected,
    Expired,
}

impl ProposalStatus {
    /// Returns true while the proposal still accepts votes.
    pub fn is_open(&self) -> bool {
        matches!(self, ProposalStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Active => "active",
            ProposalStatus::Passed => "passed",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Expired => "expired",
        }
    }
}

impl StateMachine for ProposalStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use ProposalStatus::*;
        match self {
            Active => vec![Passed, Rejected, Expired],
            Passed | Rejected | Expired => vec![],
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProposalStatus::Active),
            "passed" => Ok(ProposalStatus::Passed),
            "rejected" => Ok(ProposalStatus::Rejected),
            "expired" => Ok(ProposalStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown proposal status '{}'", other),
            )),
        }
    }
}
