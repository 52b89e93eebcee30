//! Department concentration penalty.
//!
//! Each additional same-department guest at a table costs more than the last,
//! so monoculture tables become expensive without being forbidden.

use crate::model::Guest;
use crate::score::same_department;

/// Penalty multiplier indexed by same-department occupants already seated.
const MULTIPLIERS: [f64; 7] = [0.0, 1.0, 2.5, 5.0, 10.0, 15.0, 20.0];

/// Cost of seating a guest from `department` with `occupants`.
pub fn penalty(department: Option<&str>, occupants: &[&Guest], weight: f64) -> f64 {
    if weight == 0.0 || department.is_none() {
        return 0.0;
    }

    let count = occupants
        .iter()
        .filter(|o| same_department(department, o.department.as_deref()))
        .count();

    weight * multiplier(count)
}

fn multiplier(count: usize) -> f64 {
    MULTIPLIERS[count.min(MULTIPLIERS.len() - 1)]
}
