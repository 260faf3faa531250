//! Brightness: the bounded health score of a votable entity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Brightness change per unit of net vote change.
pub const VOTE_STEP: i32 = 5;

pub const MIN_BRIGHTNESS: i32 = 0;
pub const MAX_BRIGHTNESS: i32 = 100;
pub const DEFAULT_BRIGHTNESS: i32 = 50;

/// Integer score in `[0, 100]`, starting at 50.
///
/// Clamping happens on every step, so overshoot is discarded: at 100 a
/// further +5 is lost and a following -5 gives 95.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Brightness(i32);

impl Brightness {
    /// Validated constructor.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `value` is outside `[0, 100]`
    pub fn new(value: i32) -> Result<Self, ValidationError> {
        if !(MIN_BRIGHTNESS..=MAX_BRIGHTNESS).contains(&value) {
            return Err(ValidationError::out_of_range(
                "brightness",
                MIN_BRIGHTNESS as i64,
                MAX_BRIGHTNESS as i64,
                value as i64,
            ));
        }
        Ok(Self(value))
    }

    /// Builds a brightness, clamping into range.
    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS))
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// Applies a net vote change and clamps the result.
    pub fn apply_net_change(self, net_change: i32) -> Self {
        Self::clamped(self.0.saturating_add(net_change.saturating_mul(VOTE_STEP)))
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self(DEFAULT_BRIGHTNESS)
    }
}

impl TryFrom<i32> for Brightness {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Brightness> for i32 {
    fn from(b: Brightness) -> Self {
        b.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
