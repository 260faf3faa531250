//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session validators (JWT, mock)
//! - `events` - In-memory event bus
//! - `http` - axum REST API
//! - `memory` - In-memory stores
//! - `postgres` - PostgreSQL stores

pub mod auth;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;

pub use events::InMemoryEventBus;
