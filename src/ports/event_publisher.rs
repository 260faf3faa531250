//! Outbound port for domain events.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Receives envelopes after the change they describe has been stored.
///
/// Handlers log a publish failure and carry on; the stored change stands.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;
}
