//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `VotableRepository` - Text blocks and rental properties
//! - `ProposalRepository` - Governance proposals
//! - `DeletionLog` - Snapshots of entities removed by vote
//!
//! ## Service Ports
//!
//! - `SessionValidator` - Bearer token to voter identity
//! - `EventPublisher` - Domain event publishing
//! - `EventSubscriber` / `EventHandler` - In-process reactions to events

mod deletion_log;
mod event_publisher;
mod event_subscriber;
mod proposal_repository;
mod session_validator;
mod votable_repository;

pub use deletion_log::DeletionLog;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use proposal_repository::ProposalRepository;
pub use session_validator::SessionValidator;
pub use votable_repository::{AppliedDelta, VotableRepository};
