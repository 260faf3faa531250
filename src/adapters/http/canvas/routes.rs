//! Route configuration for entity and deletion-log endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    cast_entity_vote, create_entity, get_entity, get_entity_vote, list_deletions, list_entities,
    reconcile_entity, restore_deleted_block,
};
use crate::adapters::http::state::AppState;

/// Creates the canvas router.
///
/// Routes:
/// - `POST /api/entities` - Create a text block or rental property
/// - `GET /api/entities?kind=` - List live entities, optionally by kind
/// - `GET /api/entities/:id` - Get one entity
/// - `POST /api/entities/:id/vote` - Vote up or down
/// - `GET /api/entities/:id/vote` - Caller's current vote
/// - `POST /api/entities/:id/reconcile` - Re-run the threshold check
/// - `GET /api/deletions` - List the deletion log (admin)
/// - `POST /api/deletions/:id/restore` - Restore a deleted text block (admin)
pub fn canvas_router() -> Router<AppState> {
    Router::new()
        .route("/api/entities", post(create_entity).get(list_entities))
        .route("/api/entities/:id", get(get_entity))
        .route(
            "/api/entities/:id/vote",
            post(cast_entity_vote).get(get_entity_vote),
        )
        .route("/api/entities/:id/reconcile", post(reconcile_entity))
        .route("/api/deletions", get(list_deletions))
        .route("/api/deletions/:id/restore", post(restore_deleted_block))
}
