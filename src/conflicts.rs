//! Post-hoc constraint validation.
//!
//! Advisory only: nothing here blocks generation or commit. Works on staged
//! and committed assignments alike.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use crate::constraints::ConstraintIndex;
use crate::model::{Assignment, ConstraintKind, Guest, Violation};

/// Reports every constraint the assignments break.
///
/// Pin and repel violations are reported per round. An attract pair is
/// reported once, with round 0, only if it never shares a table.
pub fn check(assignments: &[Assignment], index: &ConstraintIndex, guests: &[Guest]) -> Vec<Violation> {
    if index.is_empty() {
        return Vec::new();
    }

    let names: HashMap<Uuid, &str> = guests.iter().map(|g| (g.id, g.name.as_str())).collect();
    let name = |id: Uuid| names.get(&id).map_or_else(|| id.to_string(), |n| (*n).to_string());

    let mut seats: HashMap<(Uuid, u32), u32> = HashMap::new();
    let mut rounds: BTreeSet<u32> = BTreeSet::new();
    for a in assignments {
        seats.insert((a.guest_id, a.round), a.table);
        rounds.insert(a.round);
    }

    let mut violations = Vec::new();

    for (guest, pinned) in index.pins() {
        for &round in &rounds {
            let Some(&table) = seats.get(&(guest, round)) else {
                continue;
            };
            if table != pinned {
                violations.push(Violation {
                    kind: ConstraintKind::Pin,
                    round,
                    description: format!(
                        "{} is pinned to table {pinned} but sits at table {table} in round {round}",
                        name(guest)
                    ),
                });
            }
        }
    }

    for pair in index.repel_pairs() {
        for &round in &rounds {
            let first = seats.get(&(pair.first(), round));
            if first.is_some() && first == seats.get(&(pair.second(), round)) {
                violations.push(Violation {
                    kind: ConstraintKind::Repel,
                    round,
                    description: format!(
                        "{} and {} should be kept apart but share table {} in round {round}",
                        name(pair.first()),
                        name(pair.second()),
                        first.copied().unwrap_or_default()
                    ),
                });
            }
        }
    }

    for pair in index.attract_pairs() {
        let ever_together = rounds.iter().any(|&round| {
            let first = seats.get(&(pair.first(), round));
            first.is_some() && first == seats.get(&(pair.second(), round))
        });
        if !ever_together {
            violations.push(Violation {
                kind: ConstraintKind::Attract,
                round: 0,
                description: format!(
                    "{} and {} should sit together but never share a table",
                    name(pair.first()),
                    name(pair.second())
                ),
            });
        }
    }

    violations.sort_by(|a, b| {
        (a.round, a.kind, &a.description).cmp(&(b.round, b.kind, &b.description))
    });
    violations
}
