//! Route configuration for proposal endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    cast_proposal_vote, create_proposal, get_proposal, get_proposal_vote, list_proposals,
};
use crate::adapters::http::state::AppState;

/// Creates the governance router.
///
/// Routes:
/// - `POST /api/proposals` - Create a proposal
/// - `GET /api/proposals` - List proposals (expires overdue ones)
/// - `GET /api/proposals/:id` - Get one proposal (expires it if overdue)
/// - `POST /api/proposals/:id/vote` - Vote up or down
/// - `GET /api/proposals/:id/vote` - Caller's current vote
pub fn governance_router() -> Router<AppState> {
    Router::new()
        .route("/api/proposals", post(create_proposal).get(list_proposals))
        .route("/api/proposals/:id", get(get_proposal))
        .route(
            "/api/proposals/:id/vote",
            post(cast_proposal_vote).get(get_proposal_vote),
        )
}
