//! Final assignment storage.
//!
//! Final assignments are only ever written by [`Storage::commit_preview`],
//! which replaces the whole set for an event.

use uuid::Uuid;

use crate::model::Assignment;

use super::event::require_event;
use super::{Result, Storage, parse_count, parse_uuid};

impl Storage {
    /// Loads an event's final assignments, ordered by round then table.
    pub fn load_assignments(&self, event_id: Uuid) -> Result<Vec<Assignment>> {
        let conn = self.open()?;
        require_event(&conn, event_id)?;
        let mut stmt = conn.prepare(
            "SELECT guest_id, round, table_number FROM assignment
             WHERE event_id = ?1 ORDER BY round, table_number, rowid",
        )?;
        let rows = stmt.query_map([event_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut assignments = Vec::new();
        for row in rows {
            let (guest_id, round, table) = row?;
            assignments.push(Assignment {
                guest_id: parse_uuid(&guest_id, "guest id")?,
                round: parse_count(round, "round")?,
                table: parse_count(table, "table number")?,
            });
        }
        Ok(assignments)
    }
}
