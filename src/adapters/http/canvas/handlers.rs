//! HTTP handlers for entity and deletion-log endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::canvas::{
    CastEntityVoteCommand, CreateEntityCommand, GetEntityQuery, GetEntityVoteQuery,
    ListDeletionsQuery, ListEntitiesQuery, ReconcileEntityCommand, RestoreDeletedBlockCommand,
};
use crate::domain::foundation::{CommandMetadata, DeletionRecordId, EntityId};

use super::dto::{
    CreateEntityRequest, DeletionRecordView, EntityView, EntityVoteResponse, ListEntitiesParams,
    ReconcileResponse, RestoreResponse,
};
use crate::adapters::http::dto::{CurrentVoteResponse, VoteRequest};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;

fn parse_entity_id(raw: &str) -> Result<EntityId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid entity ID format".to_string()))
}

fn parse_record_id(raw: &str) -> Result<DeletionRecordId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid deletion record ID format".to_string()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Entities
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/entities - Create a text block or rental property
pub async fn create_entity(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateEntityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = request
        .into_kind()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let cmd = CreateEntityCommand {
        kind,
        created_by: user.id.clone(),
    };
    let result = state
        .create_entity_handler()
        .handle(cmd, CommandMetadata::new(user.id))
        .await?;

    Ok((StatusCode::CREATED, Json(EntityView::from(&result.entity))))
}

/// GET /api/entities?kind= - List live entities
pub async fn list_entities(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<ListEntitiesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = params
        .kind_filter()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let entities = state
        .list_entities_handler()
        .handle(ListEntitiesQuery { kind })
        .await?;

    let views: Vec<EntityView> = entities.iter().map(EntityView::from).collect();
    Ok(Json(views))
}

/// GET /api/entities/:id
pub async fn get_entity(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(entity_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entity_id = parse_entity_id(&entity_id)?;

    let entity = state
        .get_entity_handler()
        .handle(GetEntityQuery { entity_id })
        .await?;

    Ok(Json(EntityView::from(&entity)))
}

/// POST /api/entities/:id/vote
pub async fn cast_entity_vote(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(entity_id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entity_id = parse_entity_id(&entity_id)?;

    let cmd = CastEntityVoteCommand {
        entity_id,
        voter: user.id.clone(),
        direction: request.direction,
    };
    let result = state
        .cast_entity_vote_handler()
        .handle(cmd, CommandMetadata::new(user.id))
        .await?;

    Ok(Json(EntityVoteResponse::from(&result)))
}

/// GET /api/entities/:id/vote - Caller's current vote
pub async fn get_entity_vote(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(entity_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entity_id = parse_entity_id(&entity_id)?;

    let direction = state
        .get_entity_vote_handler()
        .handle(GetEntityVoteQuery {
            entity_id,
            voter: user.id,
        })
        .await?;

    Ok(Json(CurrentVoteResponse { direction }))
}

/// POST /api/entities/:id/reconcile - Re-run the threshold check
pub async fn reconcile_entity(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(entity_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entity_id = parse_entity_id(&entity_id)?;

    let action = state
        .reconcile_entity_handler()
        .handle(
            ReconcileEntityCommand { entity_id },
            CommandMetadata::new(user.id).with_source("reconcile"),
        )
        .await?;

    Ok(Json(ReconcileResponse::new(entity_id, &action)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Deletion log (admin)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/deletions
pub async fn list_deletions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .list_deletions_handler()
        .handle(ListDeletionsQuery {
            requested_by: user.id,
        })
        .await?;

    let views: Vec<DeletionRecordView> = records.iter().map(DeletionRecordView::from).collect();
    Ok(Json(views))
}

/// POST /api/deletions/:id/restore
pub async fn restore_deleted_block(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(record_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record_id = parse_record_id(&record_id)?;

    let cmd = RestoreDeletedBlockCommand {
        record_id,
        restored_by: user.id.clone(),
    };
    let result = state
        .restore_deleted_block_handler()
        .handle(cmd, CommandMetadata::new(user.id))
        .await?;

    Ok((StatusCode::CREATED, Json(RestoreResponse::from(&result))))
}
