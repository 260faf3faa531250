//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, events)
//! - `voting` - Vote ledger and brightness score shared by all votable things
//! - `canvas` - Text blocks, rental properties and their deletion log records
//! - `governance` - Proposals and their vote-driven lifecycle

pub mod canvas;
pub mod foundation;
pub mod governance;
pub mod voting;
