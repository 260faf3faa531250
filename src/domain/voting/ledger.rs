//! Vote ledger: who voted on one entity, and which way.
//!
//! The ledger is the in-memory view of two disjoint voter sets. Applying a
//! vote yields a `VoteTransition`, and the transition yields the
//! `LedgerDelta` that the store applies with its atomic set-union and
//! set-difference primitives.
//!
//! # Invariants
//!
//! - `up` and `down` are disjoint
//! - a voter's net contribution is -1, 0 or +1

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::VoteDirection;
use crate::domain::foundation::{UserId, ValidationError};

/// What a single `apply_vote` call did to one voter's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub enum VoteTransition {
    /// Voter had no vote and now votes `direction`.
    Cast { direction: VoteDirection },
    /// Voter repeated their vote, which neutralizes it.
    Withdrawn { direction: VoteDirection },
    /// Voter moved from one side to the other in one step.
    Switched { from: VoteDirection, to: VoteDirection },
}

impl VoteTransition {
    /// Direction the voter holds after the transition.
    pub fn resulting_direction(&self) -> Option<VoteDirection> {
        match self {
            VoteTransition::Cast { direction } => Some(*direction),
            VoteTransition::Withdrawn { .. } => None,
            VoteTransition::Switched { to, .. } => Some(*to),
        }
    }

    /// Direction the voter held before the transition.
    pub fn prior_direction(&self) -> Option<VoteDirection> {
        match self {
            VoteTransition::Cast { .. } => None,
            VoteTransition::Withdrawn { direction } => Some(*direction),
            VoteTransition::Switched { from, .. } => Some(*from),
        }
    }

    /// Change to `|up| - |down|` caused by this transition.
    pub fn net_change(&self) -> i32 {
        let after = self.resulting_direction().map_or(0, |d| d.weight());
        let before = self.prior_direction().map_or(0, |d| d.weight());
        after - before
    }

    /// The atomic store request this transition maps to.
    pub fn delta(&self, voter: &UserId) -> LedgerDelta {
        LedgerDelta {
            voter: voter.clone(),
            set_to: self.resulting_direction(),
            net_change: self.net_change(),
        }
    }
}

/// Atomic change to one voter's membership, as sent to the store.
///
/// `set_to: Some(d)` is a union into `d` plus a difference from the
/// opposite set; `None` is a difference from both. `net_change` is the
/// change the caller expects; stores recompute it against what they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDelta {
    pub voter: UserId,
    pub set_to: Option<VoteDirection>,
    pub net_change: i32,
}

impl LedgerDelta {
    /// Delta that withdraws whatever `voter` held, given their prior direction.
    pub fn removal(voter: &UserId, prior: VoteDirection) -> Self {
        VoteTransition::Withdrawn { direction: prior }.delta(voter)
    }
}

/// Per-entity set of voters split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteLedger {
    up: BTreeSet<UserId>,
    down: BTreeSet<UserId>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from stored sets.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if a voter appears in both sets
    pub fn from_sets(
        up: impl IntoIterator<Item = UserId>,
        down: impl IntoIterator<Item = UserId>,
    ) -> Result<Self, ValidationError> {
        let up: BTreeSet<UserId> = up.into_iter().collect();
        let down: BTreeSet<UserId> = down.into_iter().collect();
        if let Some(both) = up.intersection(&down).next() {
            return Err(ValidationError::invalid_format(
                "ledger",
                format!("voter '{}' is in both up and down sets", both),
            ));
        }
        Ok(Self { up, down })
    }

    /// Ledger with a single initial vote.
    pub fn with_vote(voter: UserId, direction: VoteDirection) -> Self {
        let mut ledger = Self::new();
        ledger.set(&voter, Some(direction));
        ledger
    }

    /// Current direction of `voter`, or `None` if they have not voted.
    pub fn direction_of(&self, voter: &UserId) -> Option<VoteDirection> {
        if self.up.contains(voter) {
            Some(VoteDirection::Up)
        } else if self.down.contains(voter) {
            Some(VoteDirection::Down)
        } else {
            None
        }
    }

    /// Computes what voting `direction` would do, without mutating.
    pub fn preview_vote(&self, voter: &UserId, direction: VoteDirection) -> VoteTransition {
        match self.direction_of(voter) {
            Some(current) if current == direction => VoteTransition::Withdrawn { direction },
            Some(current) => VoteTransition::Switched {
                from: current,
                to: direction,
            },
            None => VoteTransition::Cast { direction },
        }
    }

    /// Records a vote with toggle-off and switch semantics, through the
    /// same delta a store would apply.
    pub fn apply_vote(&mut self, voter: &UserId, direction: VoteDirection) -> VoteTransition {
        let transition = self.preview_vote(voter, direction);
        self.apply_delta(&transition.delta(voter));
        transition
    }

    /// Removes `voter` from both sets. Returns the direction they held.
    pub fn remove_voter(&mut self, voter: &UserId) -> Option<VoteDirection> {
        let prior = self.direction_of(voter);
        self.set(voter, None);
        prior
    }

    /// Applies a store delta as set union / set difference.
    ///
    /// Returns the net change actually caused, measured against the voter's
    /// current membership rather than trusting `delta.net_change`. A
    /// replayed delta therefore changes nothing the second time.
    pub fn apply_delta(&mut self, delta: &LedgerDelta) -> i32 {
        let before = self.direction_of(&delta.voter).map_or(0, |d| d.weight());
        let after = delta.set_to.map_or(0, |d| d.weight());
        self.set(&delta.voter, delta.set_to);
        after - before
    }

    pub fn up_count(&self) -> usize {
        self.up.len()
    }

    pub fn down_count(&self) -> usize {
        self.down.len()
    }

    /// `|up| - |down|`.
    pub fn net(&self) -> i32 {
        self.up.len() as i32 - self.down.len() as i32
    }

    pub fn upvoters(&self) -> impl Iterator<Item = &UserId> {
        self.up.iter()
    }

    pub fn downvoters(&self) -> impl Iterator<Item = &UserId> {
        self.down.iter()
    }

    pub fn contains(&self, voter: &UserId) -> bool {
        self.direction_of(voter).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    fn set(&mut self, voter: &UserId, direction: Option<VoteDirection>) {
        match direction {
            Some(VoteDirection::Up) => {
                self.down.remove(voter);
                self.up.insert(voter.clone());
            }
            Some(VoteDirection::Down) => {
                self.up.remove(voter);
                self.down.insert(voter.clone());
            }
            None => {
                self.up.remove(voter);
                self.down.remove(voter);
            }
        }
    }
}
