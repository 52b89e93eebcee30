//! Core data model for seating.
//!
//! Events own guests and constraints. Assignments come in two collections:
//! final assignments, and staged preview assignments tagged with a session.

mod assignment;
mod constraint;
mod event;
mod guest;
mod weights;

pub use assignment::{Assignment, StagedAssignment, Violation};
pub use constraint::{Constraint, ConstraintKind, ConstraintRule, GuestPair};
pub use event::{Event, EventStatus};
pub use guest::{Guest, GuestAttributes, JobLevel};
pub use weights::MatchingWeights;
