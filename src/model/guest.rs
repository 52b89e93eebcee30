//! Guests: the people being seated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person attending an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: Uuid,
    pub event_id: Uuid,

    /// Display name.
    pub name: String,

    /// Free-text group label, e.g. "Engineering".
    pub department: Option<String>,

    #[serde(default)]
    pub attributes: GuestAttributes,

    /// Round-1 table from the last commit, for single-round readers.
    pub current_table: Option<u32>,
}

/// Optional profile data used by compatibility scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GuestAttributes {
    pub interests: BTreeSet<String>,
    pub job_level: Option<JobLevel>,

    /// Networking-intent tags such as `hiring` or `seeking-mentor`.
    pub goals: BTreeSet<String>,
    pub custom_tags: BTreeSet<String>,
}

/// Seniority, ordered from most junior to most senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobLevel {
    Junior,
    Mid,
    Senior,
    Executive,
}

impl JobLevel {
    /// Position in the ordered scale, 0 for junior through 3 for executive.
    pub fn position(self) -> f64 {
        match self {
            Self::Junior => 0.0,
            Self::Mid => 1.0,
            Self::Senior => 2.0,
            Self::Executive => 3.0,
        }
    }
}
