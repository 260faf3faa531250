//! Threshold policy mapping brightness to a content lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::EntityKindTag;
use crate::domain::voting::Brightness;

/// At or below this brightness an entity is archived (dimmed but kept).
pub const ARCHIVE_THRESHOLD: i32 = 20;

/// At or below this brightness a text block is deleted.
pub const DELETE_THRESHOLD: i32 = 0;

/// Lifecycle state derived from brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentState {
    Visible,
    Archived,
    Deleted,
}

impl ContentState {
    pub fn is_deleted(&self) -> bool {
        matches!(self, ContentState::Deleted)
    }
}

impl fmt::Display for ContentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentState::Visible => "visible",
            ContentState::Archived => "archived",
            ContentState::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Per-kind thresholds.
///
/// Rental properties have no deletion threshold: they stay archived even
/// at brightness 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPolicy {
    archive_at: i32,
    delete_at: Option<i32>,
}

impl ThresholdPolicy {
    pub fn for_kind(kind: EntityKindTag) -> Self {
        match kind {
            EntityKindTag::TextBlock => Self {
                archive_at: ARCHIVE_THRESHOLD,
                delete_at: Some(DELETE_THRESHOLD),
            },
            EntityKindTag::RentalProperty => Self {
                archive_at: ARCHIVE_THRESHOLD,
                delete_at: None,
            },
        }
    }

    pub fn evaluate(&self, brightness: Brightness) -> ContentState {
        let value = brightness.value();
        match self.delete_at {
            Some(limit) if value <= limit => ContentState::Deleted,
            _ if value <= self.archive_at => ContentState::Archived,
            _ => ContentState::Visible,
        }
    }
}
