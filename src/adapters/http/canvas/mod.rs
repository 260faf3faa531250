//! HTTP adapter for votable entities and the deletion log.
//!
//! Entity endpoints are open to any authenticated member; the deletion log
//! endpoints check the admin roster inside the application handlers.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::canvas_router;
