//! Canvas-specific error types.

use crate::domain::foundation::{DeletionRecordId, DomainError, EntityId, ErrorCode};

/// Errors raised by votable entity operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// Entity does not exist (never created, or deleted by vote).
    NotFound(EntityId),
    /// Deletion record does not exist.
    RecordNotFound(DeletionRecordId),
    /// User is not allowed to perform this operation.
    Forbidden,
    /// Operation is not valid in the current state.
    InvalidState(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// The backing store call failed.
    StoreUnavailable(String),
}

impl CanvasError {
    pub fn not_found(id: EntityId) -> Self {
        CanvasError::NotFound(id)
    }
    pub fn record_not_found(id: DeletionRecordId) -> Self {
        CanvasError::RecordNotFound(id)
    }
    pub fn forbidden() -> Self {
        CanvasError::Forbidden
    }
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CanvasError::InvalidState(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CanvasError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        CanvasError::StoreUnavailable(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            CanvasError::NotFound(_) => ErrorCode::EntityNotFound,
            CanvasError::RecordNotFound(_) => ErrorCode::DeletionRecordNotFound,
            CanvasError::Forbidden => ErrorCode::Forbidden,
            CanvasError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            CanvasError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CanvasError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
        }
    }
    pub fn message(&self) -> String {
        match self {
            CanvasError::NotFound(id) => format!("Entity not found: {}", id),
            CanvasError::RecordNotFound(id) => format!("Deletion record not found: {}", id),
            CanvasError::Forbidden => "Permission denied".to_string(),
            CanvasError::InvalidState(msg) => format!("Invalid state: {}", msg),
            CanvasError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CanvasError::StoreUnavailable(msg) => format!("Store unavailable: {}", msg),
        }
    }
}

impl std::fmt::Display for CanvasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CanvasError {}

impl From<DomainError> for CanvasError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden | ErrorCode::Unauthorized => CanvasError::Forbidden,
            ErrorCode::InvalidStateTransition | ErrorCode::AlreadyRestored => {
                CanvasError::InvalidState(err.message)
            }
            ErrorCode::ValidationFailed => CanvasError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => CanvasError::StoreUnavailable(err.message),
        }
    }
}

impl From<crate::domain::foundation::ValidationError> for CanvasError {
    fn from(err: crate::domain::foundation::ValidationError) -> Self {
        CanvasError::validation(err.field().to_string(), err.to_string())
    }
}
