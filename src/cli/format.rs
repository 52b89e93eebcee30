//! Output formatting for CLI display.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use uuid::Uuid;

use crate::model::{Guest, MatchingWeights, Violation};
use crate::score::table_quality;

/// Format a violation for human-readable display.
pub(super) fn format_violation(v: &Violation) -> String {
    if v.round == 0 {
        format!("[{}] {}", v.kind, v.description)
    } else {
        format!("[{} · round {}] {}", v.kind, v.round, v.description)
    }
}

/// One line per table: number, quality, and guest names.
pub(super) fn format_tables(
    seats: &[(u32, Uuid)],
    guests: &[Guest],
    weights: &MatchingWeights,
) -> Vec<String> {
    let by_id: HashMap<Uuid, &Guest> = guests.iter().map(|g| (g.id, g)).collect();

    let mut tables: BTreeMap<u32, Vec<&Guest>> = BTreeMap::new();
    let mut unknown: BTreeMap<u32, usize> = BTreeMap::new();
    for (table, guest_id) in seats {
        match by_id.get(guest_id) {
            Some(guest) => tables.entry(*table).or_default().push(*guest),
            None => *unknown.entry(*table).or_default() += 1,
        }
    }

    tables
        .iter()
        .map(|(table, seated)| {
            let names: Vec<&str> = seated.iter().map(|g| g.name.as_str()).collect();
            let mut line = format!(
                "Table {table} (quality {:+.2}): {}",
                table_quality(seated, weights),
                names.join(", ")
            );
            if let Some(n) = unknown.get(table) {
                let _ = write!(line, " + {n} unknown");
            }
            line
        })
        .collect()
}
