//! HTTP adapter for account-level voter operations.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::voters_router;
