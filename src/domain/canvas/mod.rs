//! Canvas domain module.
//!
//! Votable entities (text blocks and rental property suggestions), the
//! brightness threshold policy that archives or deletes them, and the
//! deletion log records kept for removed blocks.

mod deletion;
mod entity;
mod errors;
mod events;
mod lifecycle;

pub use deletion::{DeletionReason, DeletionRecord};
pub use entity::{
    EntityKind, EntityKindTag, RentalProperty, TextBlock, VotableEntity,
    MAX_ADDRESS_LENGTH, MAX_NOTES_LENGTH, MAX_TEXT_LENGTH,
};
pub use errors::CanvasError;
pub use events::{EntityArchived, EntityCreated, EntityDeleted, EntityRestored, EntityVoteRecorded};
pub use lifecycle::{ContentState, ThresholdPolicy, ARCHIVE_THRESHOLD, DELETE_THRESHOLD};
