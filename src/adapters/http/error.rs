//! Error mapping for the HTTP surface.
//!
//! Every handler error funnels through `ApiError`, which picks the status
//! code from the domain `ErrorCode` and renders an `ErrorResponse` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::VoterError;
use crate::domain::canvas::CanvasError;
use crate::domain::foundation::ErrorCode;
use crate::domain::governance::GovernanceError;

use super::dto::ErrorResponse;

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Forbidden(String),
    Conflict(String),
    Unavailable(String),
    Internal(String),
}

impl ApiError {
    /// Maps a domain error code onto the matching HTTP error.
    pub fn from_code(code: ErrorCode, message: String) -> Self {
        match code {
            ErrorCode::ValidationFailed => ApiError::BadRequest(message),
            ErrorCode::EntityNotFound
            | ErrorCode::ProposalNotFound
            | ErrorCode::DeletionRecordNotFound => ApiError::NotFound(message),
            ErrorCode::Unauthorized | ErrorCode::Forbidden => ApiError::Forbidden(message),
            ErrorCode::InvalidStateTransition
            | ErrorCode::ProposalClosed
            | ErrorCode::AlreadyRestored => ApiError::Conflict(message),
            ErrorCode::StoreUnavailable => ApiError::Unavailable(message),
            ErrorCode::InternalError => ApiError::Internal(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CanvasError> for ApiError {
    fn from(err: CanvasError) -> Self {
        ApiError::from_code(err.code(), err.message())
    }
}

impl From<GovernanceError> for ApiError {
    fn from(err: GovernanceError) -> Self {
        ApiError::from_code(err.code(), err.message())
    }
}

impl From<VoterError> for ApiError {
    fn from(err: VoterError) -> Self {
        ApiError::from_code(err.code(), err.message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::BadRequest(msg) => ErrorResponse::bad_request(msg),
            ApiError::NotFound(msg) => ErrorResponse::not_found(msg),
            ApiError::Forbidden(msg) => ErrorResponse::forbidden(msg),
            ApiError::Conflict(msg) => ErrorResponse::conflict(msg),
            ApiError::Unavailable(msg) => {
                tracing::warn!(error = %msg, "store unavailable");
                ErrorResponse::unavailable(msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                ErrorResponse::internal(msg)
            }
        };

        (status, Json(error)).into_response()
    }
}
