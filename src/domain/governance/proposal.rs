//! Proposal aggregate.
//!
//! A proposal is decided by net votes: `net >= 5` passes it, `net <= -3`
//! rejects it. An active proposal past `expires_at` expires the next time it
//! is read.
//!
//! # Invariants
//!
//! - once `status` leaves `Active` it never changes again
//! - the proposer is an upvoter at creation

use serde::{Deserialize, Serialize};

use super::{ProposalStatus, ProposalType};
use crate::domain::foundation::{
    DomainError, ErrorCode, ProposalId, StateMachine, Timestamp, UserId, ValidationError,
};
use crate::domain::voting::{LedgerDelta, VoteDirection, VoteLedger, VoteTransition};

pub const PASS_THRESHOLD: i32 = 5;
pub const REJECT_THRESHOLD: i32 = -3;
pub const VOTING_PERIOD_DAYS: i64 = 14;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Governance proposal aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    id: ProposalId,
    proposal_type: ProposalType,
    title: String,
    description: Option<String>,
    proposed_by: UserId,
    proposed_by_name: String,
    ledger: VoteLedger,
    status: ProposalStatus,
    created_at: Timestamp,
    expires_at: Timestamp,
    closed_at: Option<Timestamp>,
}

impl Proposal {
    /// Creates a proposal with the proposer's upvote already recorded.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if title is blank
    /// - `OutOfRange` if title or description is too long
    pub fn new(
        proposal_type: ProposalType,
        title: impl Into<String>,
        description: Option<String>,
        proposed_by: UserId,
        proposed_by_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new_at(
            proposal_type,
            title,
            description,
            proposed_by,
            proposed_by_name,
            Timestamp::now(),
        )
    }

    /// Like `new`, with an explicit creation time.
    pub fn new_at(
        proposal_type: ProposalType,
        title: impl Into<String>,
        description: Option<String>,
        proposed_by: UserId,
        proposed_by_name: impl Into<String>,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        let title_len = title.chars().count();
        if title_len > MAX_TITLE_LENGTH {
            return Err(ValidationError::out_of_range(
                "title",
                1,
                MAX_TITLE_LENGTH as i64,
                title_len as i64,
            ));
        }
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description {
            let len = d.chars().count();
            if len > MAX_DESCRIPTION_LENGTH {
                return Err(ValidationError::out_of_range(
                    "description",
                    0,
                    MAX_DESCRIPTION_LENGTH as i64,
                    len as i64,
                ));
            }
        }
        let proposed_by_name = proposed_by_name.into();
        let proposed_by_name = if proposed_by_name.trim().is_empty() {
            proposed_by.to_string()
        } else {
            proposed_by_name
        };

        Ok(Self {
            id: ProposalId::new(),
            proposal_type,
            title,
            description,
            ledger: VoteLedger::with_vote(proposed_by.clone(), VoteDirection::Up),
            proposed_by,
            proposed_by_name,
            status: ProposalStatus::Active,
            created_at,
            expires_at: created_at.plus_days(VOTING_PERIOD_DAYS),
            closed_at: None,
        })
    }

    /// Reconstitute a proposal from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ProposalId,
        proposal_type: ProposalType,
        title: String,
        description: Option<String>,
        proposed_by: UserId,
        proposed_by_name: String,
        ledger: VoteLedger,
        status: ProposalStatus,
        created_at: Timestamp,
        expires_at: Timestamp,
        closed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            proposal_type,
            title,
            description,
            proposed_by,
            proposed_by_name,
            ledger,
            status,
            created_at,
            expires_at,
            closed_at,
        }
    }

    pub fn id(&self) -> &ProposalId {
        &self.id
    }

    pub fn proposal_type(&self) -> ProposalType {
        self.proposal_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn proposed_by(&self) -> &UserId {
        &self.proposed_by
    }

    pub fn proposed_by_name(&self) -> &str {
        &self.proposed_by_name
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn expires_at(&self) -> &Timestamp {
        &self.expires_at
    }

    pub fn closed_at(&self) -> Option<&Timestamp> {
        self.closed_at.as_ref()
    }

    /// `|upvotes| - |downvotes|`.
    pub fn net_votes(&self) -> i32 {
        self.ledger.net()
    }

    pub fn direction_of(&self, voter: &UserId) -> Option<VoteDirection> {
        self.ledger.direction_of(voter)
    }

    /// Status the current tally calls for, if it differs from `Active`.
    ///
    /// Returns `None` for closed proposals and for tallies inside the band.
    pub fn evaluate_votes(&self) -> Option<ProposalStatus> {
        if !self.status.is_open() {
            return None;
        }
        let net = self.net_votes();
        if net >= PASS_THRESHOLD {
            Some(ProposalStatus::Passed)
        } else if net <= REJECT_THRESHOLD {
            Some(ProposalStatus::Rejected)
        } else {
            None
        }
    }

    /// Active and strictly past `expires_at`.
    pub fn is_overdue(&self, now: &Timestamp) -> bool {
        self.status.is_open() && self.expires_at.is_before(now)
    }

    /// Computes the transition and store delta for a vote, without mutating.
    ///
    /// # Errors
    ///
    /// - `ProposalClosed` if the proposal is no longer active
    pub fn prepare_vote(
        &self,
        voter: &UserId,
        direction: VoteDirection,
    ) -> Result<(VoteTransition, LedgerDelta), DomainError> {
        self.ensure_open()?;
        let transition = self.ledger.preview_vote(voter, direction);
        let delta = transition.delta(voter);
        Ok((transition, delta))
    }

    /// Applies a store delta to the ledger. Status is left alone.
    pub fn apply_delta(&mut self, delta: &LedgerDelta) {
        self.ledger.apply_delta(delta);
    }

    /// Delta that removes `voter` entirely, or `None` if they never voted.
    pub fn removal_delta(&self, voter: &UserId) -> Option<LedgerDelta> {
        self.ledger
            .direction_of(voter)
            .map(|prior| LedgerDelta::removal(voter, prior))
    }

    /// Moves the proposal to a closed status.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the proposal is already closed
    pub fn transition(&mut self, target: ProposalStatus, at: Timestamp) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target)?;
        self.closed_at = Some(at);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if !self.status.is_open() {
            return Err(DomainError::new(
                ErrorCode::ProposalClosed,
                format!("Proposal {} is {}", self.id, self.status),
            )
            .with_detail("status", self.status.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoteDirection::{Down, Up};

    fn voter(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    fn proposal() -> Proposal {
        Proposal::new(
            ProposalType::Idea,
            "Community garden",
            Some("Plant tomatoes".into()),
            voter("u"),
            "Una",
        )
        .unwrap()
    }

    fn with_net(net: i32) -> Proposal {
        let mut up = vec![];
        let mut down = vec![];
        for i in 0..net.max(0) {
            up.push(voter(&format!("up{}", i)));
        }
        for i in 0..(-net).max(0) {
            down.push(voter(&format!("down{}", i)));
        }
        let p = proposal();
        Proposal::reconstitute(
            *p.id(),
            p.proposal_type(),
            p.title().to_string(),
            None,
            voter("u"),
            "Una".into(),
            VoteLedger::from_sets(up, down).unwrap(),
            ProposalStatus::Active,
            *p.created_at(),
            *p.expires_at(),
            None,
        )
    }

    #[test]
    fn proposer_is_auto_upvoted() {
        let p = proposal();
        assert_eq!(p.direction_of(&voter("u")), Some(Up));
        assert_eq!(p.net_votes(), 1);
        assert_eq!(p.status(), ProposalStatus::Active);
    }

    #[test]
    fn expires_fourteen_days_after_creation() {
        let p = proposal();
        assert_eq!(*p.expires_at(), p.created_at().plus_days(14));
    }

    #[test]
    fn thresholds_are_asymmetric() {
        assert_eq!(with_net(5).evaluate_votes(), Some(ProposalStatus::Passed));
        assert_eq!(with_net(-3).evaluate_votes(), Some(ProposalStatus::Rejected));
        assert_eq!(with_net(-2).evaluate_votes(), None);
        assert_eq!(with_net(4).evaluate_votes(), None);
    }

    /// Votes the way the store does and returns the new net tally.
    fn vote(p: &mut Proposal, who: &str, direction: VoteDirection) -> i32 {
        let (_, delta) = p.prepare_vote(&voter(who), direction).unwrap();
        p.apply_delta(&delta);
        p.net_votes()
    }

    #[test]
    fn four_more_upvotes_reach_the_pass_threshold() {
        let mut p = proposal();
        for name in ["a", "b", "c"] {
            vote(&mut p, name, Up);
            assert_eq!(p.evaluate_votes(), None);
        }
        assert_eq!(vote(&mut p, "d", Up), 5);
        assert_eq!(p.evaluate_votes(), Some(ProposalStatus::Passed));
        // Closing is the caller's compare-and-set.
        assert_eq!(p.status(), ProposalStatus::Active);
    }

    #[test]
    fn votes_on_closed_proposal_are_refused() {
        let mut p = proposal();
        p.transition(ProposalStatus::Expired, Timestamp::now()).unwrap();
        let err = p.prepare_vote(&voter("late"), Up).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProposalClosed);
        assert!(p.prepare_vote(&voter("late"), Down).is_err());
    }

    #[test]
    fn closed_status_never_changes() {
        let mut p = proposal();
        p.transition(ProposalStatus::Rejected, Timestamp::now()).unwrap();
        assert!(p.transition(ProposalStatus::Passed, Timestamp::now()).is_err());
        assert_eq!(p.status(), ProposalStatus::Rejected);
        assert_eq!(p.evaluate_votes(), None);
    }

    #[test]
    fn overdue_only_when_active_and_past_expiry() {
        let created = Timestamp::now().minus_days(15);
        let mut p = Proposal::new_at(ProposalType::Name, "Rename", None, voter("u"), "U", created)
            .unwrap();
        assert!(p.is_overdue(&Timestamp::now()));
        assert!(!p.is_overdue(&created));
        p.transition(ProposalStatus::Expired, Timestamp::now()).unwrap();
        assert!(!p.is_overdue(&Timestamp::now()));
    }

    #[test]
    fn proposer_withdrawing_drops_net_to_zero() {
        let mut p = proposal();
        let (transition, _) = p.prepare_vote(&voter("u"), Up).unwrap();
        assert_eq!(transition, VoteTransition::Withdrawn { direction: Up });
        assert_eq!(vote(&mut p, "u", Up), 0);
    }

    #[test]
    fn rejects_blank_title_and_long_description() {
        assert!(Proposal::new(ProposalType::Idea, "  ", None, voter("u"), "U").is_err());
        let long = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(Proposal::new(ProposalType::Idea, "ok", Some(long), voter("u"), "U").is_err());
    }

    #[test]
    fn blank_display_name_falls_back_to_user_id() {
        let p = Proposal::new(ProposalType::Value, "Kindness", None, voter("u-7"), " ").unwrap();
        assert_eq!(p.proposed_by_name(), "u-7");
    }
}
