//! Route configuration for voter endpoints.

use axum::routing::delete;
use axum::Router;

use super::handlers::remove_voter;
use crate::adapters::http::state::AppState;

/// Creates the voters router.
///
/// Routes:
/// - `DELETE /api/voters/:user_id` - Remove a voter's votes everywhere
pub fn voters_router() -> Router<AppState> {
    Router::new().route("/api/voters/:user_id", delete(remove_voter))
}
