//! In-memory store adapters.
//!
//! Used when no database is configured, and throughout the tests.

mod deletion_log;
mod proposal_repository;
mod votable_repository;

pub use deletion_log::InMemoryDeletionLog;
pub use proposal_repository::InMemoryProposalRepository;
pub use votable_repository::InMemoryVotableRepository;
