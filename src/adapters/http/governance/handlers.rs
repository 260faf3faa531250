//! HTTP handlers for proposal endpoints.
//!
//! Reads and votes go through the expiry checker inside the application
//! handlers, so an overdue proposal is closed by whichever request sees it
//! first.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::governance::{
    CastProposalVoteCommand, CreateProposalCommand, GetProposalQuery, GetProposalVoteQuery,
    ListProposalsQuery,
};
use crate::domain::foundation::{CommandMetadata, ProposalId};

use super::dto::{CreateProposalRequest, ProposalView, ProposalVoteResponse};
use crate::adapters::http::dto::{CurrentVoteResponse, VoteRequest};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;

fn parse_proposal_id(raw: &str) -> Result<ProposalId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid proposal ID format".to_string()))
}

/// POST /api/proposals - Create a proposal; the proposer's upvote is included
pub async fn create_proposal(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateProposalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateProposalCommand {
        proposal_type: request.proposal_type,
        title: request.title,
        description: request.description,
        proposed_by: user.id.clone(),
        proposed_by_name: user.display_label(),
    };
    let result = state
        .create_proposal_handler()
        .handle(cmd, CommandMetadata::new(user.id))
        .await?;

    Ok((StatusCode::CREATED, Json(ProposalView::from(&result.proposal))))
}

/// GET /api/proposals
pub async fn list_proposals(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let proposals = state
        .list_proposals_handler()
        .handle(ListProposalsQuery)
        .await?;

    let views: Vec<ProposalView> = proposals.iter().map(ProposalView::from).collect();
    Ok(Json(views))
}

/// GET /api/proposals/:id
pub async fn get_proposal(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(proposal_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal_id = parse_proposal_id(&proposal_id)?;

    let proposal = state
        .get_proposal_handler()
        .handle(GetProposalQuery { proposal_id })
        .await?;

    Ok(Json(ProposalView::from(&proposal)))
}

/// POST /api/proposals/:id/vote
pub async fn cast_proposal_vote(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(proposal_id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal_id = parse_proposal_id(&proposal_id)?;

    let cmd = CastProposalVoteCommand {
        proposal_id,
        voter: user.id.clone(),
        direction: request.direction,
    };
    let result = state
        .cast_proposal_vote_handler()
        .handle(cmd, CommandMetadata::new(user.id))
        .await?;

    Ok(Json(ProposalVoteResponse::from(&result)))
}

/// GET /api/proposals/:id/vote - Caller's current vote
pub async fn get_proposal_vote(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(proposal_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal_id = parse_proposal_id(&proposal_id)?;

    let direction = state
        .get_proposal_vote_handler()
        .handle(GetProposalVoteQuery {
            proposal_id,
            voter: user.id,
        })
        .await?;

    Ok(Json(CurrentVoteResponse { direction }))
}
