//! Event bus adapters.
//!
//! - `InMemoryEventBus` - In-process bus with a bounded capture buffer
//! - `ModerationLog` - Subscriber that logs archives, deletions, restores and closes

mod in_memory;
mod moderation_log;

pub use in_memory::InMemoryEventBus;
pub use moderation_log::ModerationLog;
