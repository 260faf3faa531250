//! HTTP adapter for governance proposals.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::governance_router;
