//! Voting primitives shared by canvas entities and proposals.
//!
//! - `VoteLedger` - who voted which way on one entity
//! - `VoteTransition` / `LedgerDelta` - the result of one vote and its store request
//! - `Brightness` - bounded score driven by ledger transitions

mod brightness;
mod direction;
mod ledger;

pub use brightness::{
    Brightness, DEFAULT_BRIGHTNESS, MAX_BRIGHTNESS, MIN_BRIGHTNESS, VOTE_STEP,
};
pub use direction::VoteDirection;
pub use ledger::{LedgerDelta, VoteLedger, VoteTransition};
