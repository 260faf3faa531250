//! Canvas command and query handlers.

mod cast_entity_vote;
mod create_entity;
mod get_entity;
mod reconcile_entity;
mod restore_deleted_block;
mod thresholds;

pub use cast_entity_vote::{CastEntityVoteCommand, CastEntityVoteHandler, CastEntityVoteResult};
pub use create_entity::{CreateEntityCommand, CreateEntityHandler, CreateEntityResult};
pub use get_entity::{
    GetEntityHandler, GetEntityQuery, GetEntityVoteHandler, GetEntityVoteQuery,
    ListEntitiesHandler, ListEntitiesQuery,
};
pub use reconcile_entity::{ReconcileEntityCommand, ReconcileEntityHandler};
pub use restore_deleted_block::{
    ListDeletionsHandler, ListDeletionsQuery, RestoreDeletedBlockCommand,
    RestoreDeletedBlockHandler, RestoreDeletedBlockResult,
};
pub use thresholds::{ThresholdAction, ThresholdEnforcer};
