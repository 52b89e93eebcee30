//! Placement rules supplied by the organizer.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single placement rule for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub id: Uuid,
    pub event_id: Uuid,
    pub rule: ConstraintRule,

    /// Why the organizer added this rule.
    pub reason: Option<String>,
}

/// What a constraint asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConstraintRule {
    /// Seat this guest at this table number.
    Pin { guest: Uuid, table: u32 },

    /// Keep these two guests apart.
    Repel { pair: GuestPair },

    /// Seat these two guests together at least once.
    Attract { pair: GuestPair },
}

impl ConstraintRule {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Pin { .. } => ConstraintKind::Pin,
            Self::Repel { .. } => ConstraintKind::Repel,
            Self::Attract { .. } => ConstraintKind::Attract,
        }
    }
}

/// The constraint type, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintKind {
    Pin,
    Repel,
    Attract,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pin => "pin",
            Self::Repel => "repel",
            Self::Attract => "attract",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unordered pair of guests, stored with the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[Uuid; 2]", into = "[Uuid; 2]")]
pub struct GuestPair {
    low: Uuid,
    high: Uuid,
}

impl GuestPair {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn first(self) -> Uuid {
        self.low
    }

    pub fn second(self) -> Uuid {
        self.high
    }
}

impl From<[Uuid; 2]> for GuestPair {
    fn from([a, b]: [Uuid; 2]) -> Self {
        Self::new(a, b)
    }
}

impl From<GuestPair> for [Uuid; 2] {
    fn from(pair: GuestPair) -> Self {
        [pair.low, pair.high]
    }
}
