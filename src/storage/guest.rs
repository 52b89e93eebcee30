//! Guest storage. Guests load in the order they were added.

use uuid::Uuid;

use crate::model::{Guest, GuestAttributes};

use super::event::require_event;
use super::{Result, Storage, StorageError, parse_count, parse_uuid};

impl Storage {
    /// Adds guests to an event in a single transaction.
    pub fn add_guests(&self, event_id: Uuid, guests: &[Guest]) -> Result<()> {
        let mut conn = self.open()?;
        require_event(&conn, event_id)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO guest (id, event_id, name, department, attributes, current_table)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for guest in guests {
                stmt.execute(rusqlite::params![
                    guest.id.to_string(),
                    event_id.to_string(),
                    &guest.name,
                    guest.department.as_deref(),
                    serde_json::to_string(&guest.attributes)?,
                    guest.current_table,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads all guests for an event.
    pub fn load_guests(&self, event_id: Uuid) -> Result<Vec<Guest>> {
        let conn = self.open()?;
        require_event(&conn, event_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, department, attributes, current_table
             FROM guest WHERE event_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([event_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<i64>>(4)?,
            ))
        })?;

        let mut guests = Vec::new();
        for row in rows {
            let (id, name, department, attributes, current_table) = row?;
            let attributes: GuestAttributes = serde_json::from_str(&attributes)?;
            guests.push(Guest {
                id: parse_uuid(&id, "guest id")?,
                event_id,
                name,
                department,
                attributes,
                current_table: current_table
                    .map(|t| parse_count(t, "current_table"))
                    .transpose()?,
            });
        }
        Ok(guests)
    }

    /// Loads one guest by id.
    pub fn load_guest(&self, event_id: Uuid, guest_id: Uuid) -> Result<Guest> {
        self.load_guests(event_id)?
            .into_iter()
            .find(|g| g.id == guest_id)
            .ok_or(StorageError::GuestNotFound(guest_id))
    }
}
