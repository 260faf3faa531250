//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and event plumbing that
//! form the vocabulary shared by the canvas and governance modules.

mod auth;
mod authorization;
mod command;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use authorization::AdminRoster;
pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{domain_event, Aggregate, DomainEvent, EventContext, EventEnvelope, EventId};
pub use ids::{DeletionRecordId, EntityId, ProposalId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
