//! Votable entity aggregate.
//!
//! A votable entity is either a canvas text block or a rental property
//! suggestion. Both share the ledger and brightness; each kind carries only
//! its own fields.
//!
//! # Invariants
//!
//! - `brightness` stays in `[0, 100]` after every vote
//! - each voter contributes -5, 0 or +5 to brightness

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ContentState, ThresholdPolicy};
use crate::domain::foundation::{EntityId, Timestamp, UserId, ValidationError};
use crate::domain::voting::{Brightness, LedgerDelta, VoteDirection, VoteLedger, VoteTransition};

pub const MAX_TEXT_LENGTH: usize = 500;
pub const MAX_ADDRESS_LENGTH: usize = 300;
pub const MAX_NOTES_LENGTH: usize = 2000;

/// A text block placed on the shared canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("text"));
        }
        if text.chars().count() > MAX_TEXT_LENGTH {
            return Err(ValidationError::out_of_range(
                "text",
                1,
                MAX_TEXT_LENGTH as i64,
                text.chars().count() as i64,
            ));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(ValidationError::invalid_format("position", "must be finite"));
        }
        Ok(Self { text, x, y })
    }
}

/// A rental property suggested by a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalProperty {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RentalProperty {
    pub fn new(
        address: impl Into<String>,
        listing_url: Option<String>,
        monthly_rent: Option<u32>,
        bedrooms: Option<u8>,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(ValidationError::empty_field("address"));
        }
        if address.chars().count() > MAX_ADDRESS_LENGTH {
            return Err(ValidationError::out_of_range(
                "address",
                1,
                MAX_ADDRESS_LENGTH as i64,
                address.chars().count() as i64,
            ));
        }
        if let Some(url) = &listing_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::invalid_format(
                    "listing_url",
                    "must be an http(s) URL",
                ));
            }
        }
        if let Some(n) = &notes {
            if n.chars().count() > MAX_NOTES_LENGTH {
                return Err(ValidationError::out_of_range(
                    "notes",
                    0,
                    MAX_NOTES_LENGTH as i64,
                    n.chars().count() as i64,
                ));
            }
        }
        Ok(Self {
            address,
            listing_url,
            monthly_rent,
            bedrooms,
            notes,
        })
    }
}

/// Closed set of votable entity kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    TextBlock(TextBlock),
    RentalProperty(RentalProperty),
}

impl EntityKind {
    pub fn tag(&self) -> EntityKindTag {
        match self {
            EntityKind::TextBlock(_) => EntityKindTag::TextBlock,
            EntityKind::RentalProperty(_) => EntityKindTag::RentalProperty,
        }
    }
}

/// Field-less discriminant of `EntityKind`, used for filtering and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKindTag {
    TextBlock,
    RentalProperty,
}

impl EntityKindTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKindTag::TextBlock => "text_block",
            EntityKindTag::RentalProperty => "rental_property",
        }
    }
}

impl fmt::Display for EntityKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKindTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text_block" => Ok(EntityKindTag::TextBlock),
            "rental_property" => Ok(EntityKindTag::RentalProperty),
            other => Err(ValidationError::invalid_format(
                "kind",
                format!("unknown entity kind '{}'", other),
            )),
        }
    }
}

/// Votable entity aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotableEntity {
    id: EntityId,
    #[serde(flatten)]
    kind: EntityKind,
    brightness: Brightness,
    ledger: VoteLedger,
    created_by: UserId,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl VotableEntity {
    /// Creates a fresh entity at default brightness with an empty ledger.
    pub fn new(kind: EntityKind, created_by: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id: EntityId::new(),
            kind,
            brightness: Brightness::default(),
            ledger: VoteLedger::new(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute an entity from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: EntityId,
        kind: EntityKind,
        brightness: Brightness,
        ledger: VoteLedger,
        created_by: UserId,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            kind,
            brightness,
            ledger,
            created_by,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn kind_tag(&self) -> EntityKindTag {
        self.kind.tag()
    }

    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn policy(&self) -> ThresholdPolicy {
        ThresholdPolicy::for_kind(self.kind_tag())
    }

    /// Lifecycle state derived from the current brightness.
    pub fn state(&self) -> ContentState {
        self.policy().evaluate(self.brightness)
    }

    pub fn direction_of(&self, voter: &UserId) -> Option<VoteDirection> {
        self.ledger.direction_of(voter)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Computes the transition and store delta for a vote, without mutating.
    pub fn prepare_vote(
        &self,
        voter: &UserId,
        direction: VoteDirection,
    ) -> (VoteTransition, LedgerDelta) {
        let transition = self.ledger.preview_vote(voter, direction);
        let delta = transition.delta(voter);
        (transition, delta)
    }

    /// Applies a store delta: set union / difference plus a clamped score step.
    pub fn apply_delta(&mut self, delta: &LedgerDelta) {
        let net_change = self.ledger.apply_delta(delta);
        self.brightness = self.brightness.apply_net_change(net_change);
        self.updated_at = Timestamp::now();
    }

    /// Delta that removes `voter` entirely, or `None` if they never voted.
    pub fn removal_delta(&self, voter: &UserId) -> Option<LedgerDelta> {
        self.ledger
            .direction_of(voter)
            .map(|prior| LedgerDelta::removal(voter, prior))
    }
}
