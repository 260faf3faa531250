//! Domain events and the envelope they travel in.
//!
//! Event structs stay plain data. `domain_event!` wires one up to
//! [`DomainEvent`] by naming its type string, the aggregate it belongs to,
//! and which fields hold the aggregate id and the event time. Every event
//! struct carries its own `event_id` field.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

/// The two kinds of thing an event can be about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Entity,
    Proposal,
}

impl Aggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Entity => "entity",
            Aggregate::Proposal => "proposal",
        }
    }
}

pub trait DomainEvent: Serialize + Send + Sync {
    /// Dotted type with a trailing version, e.g. `entity.deleted.v1`.
    const EVENT_TYPE: &'static str;
    const AGGREGATE: Aggregate;

    fn aggregate_id(&self) -> String;
    fn occurred_at(&self) -> Timestamp;
    fn event_id(&self) -> EventId;
}

/// ```ignore
/// domain_event!(EntityDeleted: "entity.deleted.v1", Entity(entity_id), at deleted_at);
/// ```
#[macro_export]
macro_rules! domain_event {
    ($event:ident : $event_type:literal, $aggregate:ident ( $id:ident ), at $at:ident) => {
        impl $crate::domain::foundation::DomainEvent for $event {
            const EVENT_TYPE: &'static str = $event_type;
            const AGGREGATE: $crate::domain::foundation::Aggregate =
                $crate::domain::foundation::Aggregate::$aggregate;

            fn aggregate_id(&self) -> String {
                self.$id.to_string()
            }

            fn occurred_at(&self) -> $crate::domain::foundation::Timestamp {
                self.$at
            }

            fn event_id(&self) -> $crate::domain::foundation::EventId {
                self.event_id
            }
        }
    };
}

pub use crate::domain_event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Who and which request caused an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Where the triggering command came from, e.g. `cascade` or `reconcile`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub event_type: String,
    pub version: u32,
    pub aggregate: Aggregate,
    pub aggregate_id: String,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
    #[serde(default)]
    pub context: EventContext,
}

impl EventEnvelope {
    pub fn from_event<T: DomainEvent>(event: &T) -> Self {
        Self {
            event_id: event.event_id(),
            event_type: T::EVENT_TYPE.to_string(),
            version: version_of(T::EVENT_TYPE),
            aggregate: T::AGGREGATE,
            aggregate_id: event.aggregate_id(),
            occurred_at: event.occurred_at(),
            // Event structs are plain data; a failure here would be a bug in one of them.
            payload: serde_json::to_value(event).unwrap_or(JsonValue::Null),
            context: EventContext::default(),
        }
    }

    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }

    pub fn is_about(&self, aggregate: Aggregate, id: &str) -> bool {
        self.aggregate == aggregate && self.aggregate_id == id
    }

    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

/// Reads the `vN` suffix of an event type; unversioned types count as 1.
fn version_of(event_type: &str) -> u32 {
    event_type
        .rsplit_once(".v")
        .and_then(|(_, version)| version.parse().ok())
        .unwrap_or(1)
}
