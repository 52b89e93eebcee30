//! Assignments: where each guest sits in each round.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ConstraintKind;

/// One guest at one table for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub guest_id: Uuid,
    pub round: u32,
    pub table: u32,
}

/// A not-yet-committed assignment belonging to a preview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedAssignment {
    pub session_id: Uuid,
    pub event_id: Uuid,
    pub guest_id: Uuid,
    pub round: u32,
    pub table: u32,
    pub created_at: Timestamp,
}

/// A constraint the assignment does not satisfy.
///
/// `round` is 0 for attract violations, which are judged over all rounds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    pub round: u32,
    pub description: String,
}
