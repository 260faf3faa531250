//! Governance-specific error types.

use super::ProposalStatus;
use crate::domain::foundation::{DomainError, ErrorCode, ProposalId, ValidationError};

/// Errors raised by proposal operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// Proposal does not exist.
    NotFound(ProposalId),
    /// Proposal no longer accepts votes.
    Closed(ProposalId, ProposalStatus),
    /// User is not allowed to perform this operation.
    Forbidden,
    /// Operation is not valid in the current state.
    InvalidState(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// The backing store call failed.
    StoreUnavailable(String),
}

impl GovernanceError {
    pub fn not_found(id: ProposalId) -> Self {
        GovernanceError::NotFound(id)
    }
    pub fn closed(id: ProposalId, status: ProposalStatus) -> Self {
        GovernanceError::Closed(id, status)
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        GovernanceError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        GovernanceError::StoreUnavailable(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            GovernanceError::NotFound(_) => ErrorCode::ProposalNotFound,
            GovernanceError::Closed(_, _) => ErrorCode::ProposalClosed,
            GovernanceError::Forbidden => ErrorCode::Forbidden,
            GovernanceError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            GovernanceError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            GovernanceError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
        }
    }
    pub fn message(&self) -> String {
        match self {
            GovernanceError::NotFound(id) => format!("Proposal not found: {}", id),
            GovernanceError::Closed(id, status) => {
                format!("Proposal {} is {} and no longer accepts votes", id, status)
            }
            GovernanceError::Forbidden => "Permission denied".to_string(),
            GovernanceError::InvalidState(msg) => format!("Invalid state: {}", msg),
            GovernanceError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            GovernanceError::StoreUnavailable(msg) => format!("Store unavailable: {}", msg),
        }
    }
}

impl std::fmt::Display for GovernanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for GovernanceError {}

impl From<DomainError> for GovernanceError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden | ErrorCode::Unauthorized => GovernanceError::Forbidden,
            ErrorCode::InvalidStateTransition | ErrorCode::ProposalClosed => {
                GovernanceError::InvalidState(err.message)
            }
            ErrorCode::ValidationFailed => GovernanceError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => GovernanceError::StoreUnavailable(err.message),
        }
    }
}

impl From<ValidationError> for GovernanceError {
    fn from(err: ValidationError) -> Self {
        GovernanceError::validation(err.field().to_string(), err.to_string())
    }
}
