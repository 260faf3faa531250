//! Voter command handlers.

mod remove_voter;

pub use remove_voter::{RemoveVoterCommand, RemoveVoterHandler, RemoveVoterResult, VoterError};
