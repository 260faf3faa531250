//! Community Canvas - vote-driven content lifecycle engine.
//!
//! Members vote on text blocks placed on a shared canvas, on suggested
//! rental properties, and on governance proposals. Entity votes move a
//! brightness score that archives and eventually deletes content;
//! proposal votes pass or reject a proposal before its voting period
//! runs out.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
