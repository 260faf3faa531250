//! HTTP adapter - axum REST API.
//!
//! One router per module (canvas, governance, voters) sharing a single
//! `AppState`. `api_router` merges them and puts the auth middleware in
//! front; `/health` stays outside it.

pub mod canvas;
pub mod dto;
pub mod error;
pub mod governance;
pub mod health;
pub mod middleware;
pub mod state;
pub mod voters;

use axum::Router;

pub use error::ApiError;
pub use state::AppState;

/// Builds the full API router with authentication applied.
pub fn api_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(canvas::canvas_router())
        .merge(governance::governance_router())
        .merge(voters::voters_router())
        .layer(axum::middleware::from_fn_with_state(
            state.session_validator.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state);

    Router::new().merge(health::health_router()).merge(api)
}
