//! Command infrastructure for handlers.
//!
//! Every command handler takes a `CommandMetadata` alongside its command so
//! that correlation context reaches the emitted events without widening
//! each handler signature.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EventContext, EventEnvelope, UserId};

/// Metadata context for command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// The user executing this command.
    pub user_id: UserId,

    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,

    /// Source of this command (e.g., "api", "cascade").
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: None,
            source: None,
        }
    }

    /// Builder: Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builder: Add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the correlation ID, generating one if absent.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Stamps an outgoing envelope with this command's context.
    pub fn stamp(&self, envelope: EventEnvelope) -> EventEnvelope {
        envelope.with_context(EventContext {
            correlation_id: Some(self.correlation_id()),
            user_id: Some(self.user_id.to_string()),
            source: self.source.clone(),
        })
    }
}
