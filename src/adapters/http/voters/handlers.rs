//! HTTP handlers for voter endpoints.

use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;

use crate::application::handlers::voter::RemoveVoterCommand;
use crate::domain::foundation::{CommandMetadata, UserId};

use super::dto::RemoveVoterResponse;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;

/// DELETE /api/voters/:user_id - Strip a voter from every ledger
///
/// Allowed for the voter themselves (account deletion) and for admins.
pub async fn remove_voter(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(voter): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let voter = UserId::new(voter).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let cmd = RemoveVoterCommand {
        voter,
        requested_by: user.id.clone(),
    };
    let result = state
        .remove_voter_handler()
        .handle(cmd, CommandMetadata::new(user.id))
        .await?;

    Ok(Json(RemoveVoterResponse::from(result)))
}
