//! Preview storage: staged assignments awaiting commit or discard.
//!
//! Preview rows live in their own table, keyed by session. Committing copies
//! them over the event's final assignments and deletes them; discarding just
//! deletes them. `created_at` is stored as epoch milliseconds so expiry is a
//! single range delete.

use jiff::Timestamp;
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::model::{Assignment, StagedAssignment};

use super::event::require_event;
use super::{Result, Storage, StorageError, parse_count, parse_uuid};

impl Storage {
    /// Replaces the event's preview with a new session's rows.
    pub fn replace_preview(
        &self,
        event_id: Uuid,
        session_id: Uuid,
        created_at: Timestamp,
        assignments: &[Assignment],
    ) -> Result<()> {
        let mut conn = self.open()?;
        require_event(&conn, event_id)?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM preview_assignment WHERE event_id = ?1",
            [event_id.to_string()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO preview_assignment (session_id, event_id, guest_id, round, table_number, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for a in assignments {
                stmt.execute(rusqlite::params![
                    session_id.to_string(),
                    event_id.to_string(),
                    a.guest_id.to_string(),
                    a.round,
                    a.table,
                    created_at.as_millisecond(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads the event's staged rows, ordered by round then table.
    ///
    /// Returns an empty vec when no preview exists.
    pub fn load_preview(&self, event_id: Uuid) -> Result<Vec<StagedAssignment>> {
        let conn = self.open()?;
        require_event(&conn, event_id)?;
        load_preview_rows(&conn, event_id)
    }

    /// Moves one staged guest to another table.
    ///
    /// Returns the number of rows changed: 0 when the guest has no staged row
    /// for that round.
    pub fn update_preview_table(
        &self,
        event_id: Uuid,
        guest_id: Uuid,
        round: u32,
        table: u32,
    ) -> Result<usize> {
        let conn = self.open()?;
        require_event(&conn, event_id)?;
        let rows = conn.execute(
            "UPDATE preview_assignment SET table_number = ?1
             WHERE event_id = ?2 AND guest_id = ?3 AND round = ?4",
            rusqlite::params![table, event_id.to_string(), guest_id.to_string(), round],
        )?;
        Ok(rows)
    }

    /// Deletes the event's preview rows, returning how many were removed.
    pub fn delete_preview(&self, event_id: Uuid) -> Result<usize> {
        let conn = self.open()?;
        require_event(&conn, event_id)?;
        let rows = conn.execute(
            "DELETE FROM preview_assignment WHERE event_id = ?1",
            [event_id.to_string()],
        )?;
        Ok(rows)
    }

    /// Deletes preview rows created before `cutoff`, across all events.
    pub fn delete_previews_before(&self, cutoff: Timestamp) -> Result<usize> {
        let conn = self.open()?;
        let rows = conn.execute(
            "DELETE FROM preview_assignment WHERE created_at < ?1",
            [cutoff.as_millisecond()],
        )?;
        Ok(rows)
    }

    /// Promotes the event's preview to its final assignments.
    ///
    /// In one transaction: clears final assignments, copies the staged rows
    /// over, writes each guest's round-1 table to `current_table`, marks the
    /// event assigned with its round counter reset, and deletes the preview.
    /// Returns the number of assignments written, or `None` without changing
    /// anything when the event has no staged rows.
    pub fn commit_preview(&self, event_id: Uuid) -> Result<Option<usize>> {
        let mut conn = self.open()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        require_event(&tx, event_id)?;
        let id = event_id.to_string();

        let staged: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM preview_assignment WHERE event_id = ?1)",
            [&id],
            |row| row.get(0),
        )?;
        if !staged {
            return Ok(None);
        }

        tx.execute("DELETE FROM assignment WHERE event_id = ?1", [&id])?;
        let written = tx.execute(
            "INSERT INTO assignment (event_id, guest_id, round, table_number)
             SELECT event_id, guest_id, round, table_number
             FROM preview_assignment WHERE event_id = ?1",
            [&id],
        )?;
        tx.execute(
            "UPDATE guest SET current_table = (
                 SELECT table_number FROM preview_assignment p
                 WHERE p.event_id = guest.event_id AND p.guest_id = guest.id AND p.round = 1
             )
             WHERE event_id = ?1",
            [&id],
        )?;
        tx.execute(
            "UPDATE event SET status = 'assigned', current_round = 0 WHERE id = ?1",
            [&id],
        )?;
        tx.execute("DELETE FROM preview_assignment WHERE event_id = ?1", [&id])?;

        tx.commit()?;
        Ok(Some(written))
    }
}

fn load_preview_rows(conn: &Connection, event_id: Uuid) -> Result<Vec<StagedAssignment>> {
    let mut stmt = conn.prepare(
        "SELECT session_id, guest_id, round, table_number, created_at
         FROM preview_assignment WHERE event_id = ?1 ORDER BY round, table_number, rowid",
    )?;
    let rows = stmt.query_map([event_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
        ))
    })?;

    let mut staged = Vec::new();
    for row in rows {
        let (session_id, guest_id, round, table, created_at) = row?;
        let created_at = Timestamp::from_millisecond(created_at)
            .map_err(|e| StorageError::Corrupt(format!("invalid created_at: {e}")))?;
        staged.push(StagedAssignment {
            session_id: parse_uuid(&session_id, "session id")?,
            event_id,
            guest_id: parse_uuid(&guest_id, "guest id")?,
            round: parse_count(round, "round")?,
            table: parse_count(table, "table number")?,
            created_at,
        });
    }
    Ok(staged)
}
