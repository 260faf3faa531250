//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations over the
//! ports. Grouped by the module they serve.

pub mod canvas;
pub mod governance;
pub mod voter;
