//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Writes go through command handlers that publish events; reads go through
//! query handlers.

pub mod handlers;

pub use handlers::canvas::{ThresholdAction, ThresholdEnforcer};
pub use handlers::governance::{ProposalExpiryChecker, ProposalThresholds};
pub use handlers::voter::VoterError;
