//! Inbound side of the event bus: in-process reactions to domain events.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Reacts to one envelope. An error is logged by the bus and does not
/// reach the publisher.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &EventEnvelope) -> Result<(), DomainError>;

    /// Shown in logs when the handler fails.
    fn name(&self) -> &'static str;
}

pub trait EventSubscriber: Send + Sync {
    /// Registers `handler` for envelopes whose `event_type` matches exactly.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        for event_type in event_types {
            self.subscribe(event_type, Arc::clone(&handler));
        }
    }
}
