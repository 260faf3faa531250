//! Process-local event bus.
//!
//! Published envelopes are logged, kept in a bounded ring for inspection by
//! tests, and handed to any handlers subscribed to their type. Handlers run
//! inline on the publishing task after the ring is updated.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::domain::foundation::{Aggregate, DomainError, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

const DEFAULT_RETAINED: usize = 1024;

pub struct InMemoryEventBus {
    ring: Mutex<VecDeque<EventEnvelope>>,
    retained: usize,
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::retaining(DEFAULT_RETAINED)
    }

    /// Keeps at most `retained` envelopes, evicting the oldest.
    pub fn retaining(retained: usize) -> Self {
        Self {
            ring: Mutex::new(VecDeque::new()),
            retained: retained.max(1),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    // A panic mid-push cannot leave the ring half-written, so a poisoned
    // lock is still safe to read.
    fn ring(&self) -> MutexGuard<'_, VecDeque<EventEnvelope>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retained envelopes, oldest first.
    pub fn published(&self) -> Vec<EventEnvelope> {
        self.ring().iter().cloned().collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.ring()
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    pub fn events_about(&self, aggregate: Aggregate, id: &str) -> Vec<EventEnvelope> {
        self.ring()
            .iter()
            .filter(|e| e.is_about(aggregate, id))
            .cloned()
            .collect()
    }

    fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }

    pub fn event_count(&self) -> usize {
        self.ring().len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.ring().iter().any(|e| e.event_type == event_type)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            event_type = %event.event_type,
            aggregate = event.aggregate.as_str(),
            aggregate_id = %event.aggregate_id,
            source = event.context.source.as_deref().unwrap_or("api"),
            "domain event"
        );
        let handlers = self.handlers_for(&event.event_type);
        {
            let mut ring = self.ring();
            if ring.len() == self.retained {
                ring.pop_front();
            }
            ring.push_back(event.clone());
        }

        for handler in handlers {
            if let Err(err) = handler.handle(&event).await {
                tracing::warn!(
                    handler = handler.name(),
                    event_type = %event.event_type,
                    error = %err,
                    "event handler failed"
                );
            }
        }
        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::canvas::{EntityCreated, EntityKindTag};
    use crate::domain::foundation::{EntityId, ErrorCode, EventId, Timestamp, UserId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for Counting {
        async fn handle(&self, _event: &EventEnvelope) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct Failing;

    #[async_trait]
    impl EventHandler for Failing {
        async fn handle(&self, _event: &EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "boom"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn created(entity_id: EntityId) -> EventEnvelope {
        EventEnvelope::from_event(&EntityCreated {
            event_id: EventId::new(),
            entity_id,
            kind: EntityKindTag::TextBlock,
            created_by: UserId::new("maker").unwrap(),
            created_at: Timestamp::now(),
        })
    }

    #[tokio::test]
    async fn published_events_are_queryable() {
        let bus = InMemoryEventBus::new();
        let entity = EntityId::new();

        bus.publish(created(entity)).await.unwrap();
        bus.publish(created(EntityId::new())).await.unwrap();

        assert_eq!(bus.event_count(), 2);
        assert!(bus.has_event("entity.created.v1"));
        assert!(!bus.has_event("entity.deleted.v1"));
        assert_eq!(bus.events_of_type("entity.created.v1").len(), 2);
        assert_eq!(
            bus.events_about(Aggregate::Entity, &entity.to_string()).len(),
            1
        );
        assert!(bus
            .events_about(Aggregate::Proposal, &entity.to_string())
            .is_empty());
    }

    #[tokio::test]
    async fn ring_evicts_oldest() {
        let bus = InMemoryEventBus::retaining(2);
        let ids: Vec<EntityId> = (0..3).map(|_| EntityId::new()).collect();
        for id in &ids {
            bus.publish(created(*id)).await.unwrap();
        }

        let kept: Vec<String> = bus.published().into_iter().map(|e| e.aggregate_id).collect();

        assert_eq!(kept, vec![ids[1].to_string(), ids[2].to_string()]);
    }

    #[tokio::test]
    async fn subscribers_see_only_their_event_types() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        bus.subscribe_all(
            &["entity.created.v1", "entity.deleted.v1"],
            Arc::new(Counting(seen.clone())),
        );
        bus.subscribe("proposal.created.v1", Arc::new(Counting(seen.clone())));

        bus.publish(created(EntityId::new())).await.unwrap();
        bus.publish(created(EntityId::new())).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failing_handler_does_not_fail_publish() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        bus.subscribe("entity.created.v1", Arc::new(Failing));
        bus.subscribe("entity.created.v1", Arc::new(Counting(seen.clone())));

        bus.publish(created(EntityId::new())).await.unwrap();

        assert_eq!(bus.event_count(), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
