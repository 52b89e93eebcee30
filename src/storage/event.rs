//! Event storage: create, load, list, and per-event weights.

use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::model::{Event, EventStatus, MatchingWeights};

use super::{Result, Storage, StorageError, parse_count, parse_uuid};

impl Storage {
    /// Creates a new event.
    pub fn create_event(&self, event: &Event) -> Result<()> {
        let conn = self.open()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM event WHERE id = ?1)",
            [event.id.to_string()],
            |row| row.get(0),
        )?;
        if exists {
            return Err(StorageError::EventAlreadyExists(event.id));
        }
        conn.execute(
            "INSERT INTO event (id, name, table_size, number_of_rounds, status, current_round, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                event.id.to_string(),
                &event.name,
                event.table_size,
                event.number_of_rounds,
                event.status.as_str(),
                event.current_round,
                event.created_at.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Loads a single event.
    pub fn load_event(&self, id: Uuid) -> Result<Event> {
        let conn = self.open()?;
        load_event_row(&conn, id)?.ok_or(StorageError::EventNotFound(id))
    }

    /// Lists all events, oldest first.
    pub fn list_events(&self) -> Result<Vec<Event>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, table_size, number_of_rounds, status, current_round, created_at
             FROM event",
        )?;
        let rows = stmt.query_map([], EventRow::from_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(events)
    }

    /// Stores matching weights for an event, replacing any previous ones.
    pub fn save_weights(&self, event_id: Uuid, weights: &MatchingWeights) -> Result<()> {
        let conn = self.open()?;
        require_event(&conn, event_id)?;
        conn.execute(
            "INSERT OR REPLACE INTO event_weights
             (event_id, department_mix, interest_affinity, job_level_diversity, goal_compatibility, repeat_avoidance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                event_id.to_string(),
                weights.department_mix,
                weights.interest_affinity,
                weights.job_level_diversity,
                weights.goal_compatibility,
                weights.repeat_avoidance,
            ],
        )?;
        Ok(())
    }

    /// Loads an event's matching weights, if any were stored.
    pub fn load_weights(&self, event_id: Uuid) -> Result<Option<MatchingWeights>> {
        let conn = self.open()?;
        require_event(&conn, event_id)?;
        let weights = conn
            .query_row(
                "SELECT department_mix, interest_affinity, job_level_diversity, goal_compatibility, repeat_avoidance
                 FROM event_weights WHERE event_id = ?1",
                [event_id.to_string()],
                |row| {
                    Ok(MatchingWeights {
                        department_mix: row.get(0)?,
                        interest_affinity: row.get(1)?,
                        job_level_diversity: row.get(2)?,
                        goal_compatibility: row.get(3)?,
                        repeat_avoidance: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(weights)
    }
}

/// Fails with `EventNotFound` unless the event exists.
pub(super) fn require_event(conn: &Connection, id: Uuid) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM event WHERE id = ?1)",
        [id.to_string()],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StorageError::EventNotFound(id))
    }
}

fn load_event_row(conn: &Connection, id: Uuid) -> Result<Option<Event>> {
    let row = conn
        .query_row(
            "SELECT id, name, table_size, number_of_rounds, status, current_round, created_at
             FROM event WHERE id = ?1",
            [id.to_string()],
            EventRow::from_row,
        )
        .optional()?;
    row.map(EventRow::into_event).transpose()
}

/// Raw column values for one event row.
struct EventRow {
    id: String,
    name: String,
    table_size: i64,
    number_of_rounds: i64,
    status: String,
    current_round: i64,
    created_at: String,
}

impl EventRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            table_size: row.get(2)?,
            number_of_rounds: row.get(3)?,
            status: row.get(4)?,
            current_round: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_event(self) -> Result<Event> {
        let created_at = self
            .created_at
            .parse::<jiff::Timestamp>()
            .map_err(|e| StorageError::Corrupt(format!("invalid created_at: {e}")))?;
        Ok(Event {
            id: parse_uuid(&self.id, "event id")?,
            name: self.name,
            table_size: parse_count(self.table_size, "table_size")?,
            number_of_rounds: parse_count(self.number_of_rounds, "number_of_rounds")?,
            status: deserialize_status(&self.status)?,
            current_round: parse_count(self.current_round, "current_round")?,
            created_at,
        })
    }
}

fn deserialize_status(status: &str) -> Result<EventStatus> {
    match status {
        "draft" => Ok(EventStatus::Draft),
        "assigned" => Ok(EventStatus::Assigned),
        other => Err(StorageError::Corrupt(format!("unknown event status: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::storage::tests::{sample_event, test_storage};

    #[test]
    fn create_and_load_event() {
        let (_dir, storage) = test_storage();
        let event = sample_event(4, 2);

        storage.create_event(&event).unwrap();
        let loaded = storage.load_event(event.id).unwrap();

        assert_eq!(loaded, event);
    }

    #[test]
    fn create_duplicate_event_fails() {
        let (_dir, storage) = test_storage();
        let event = sample_event(4, 1);

        storage.create_event(&event).unwrap();
        let err = storage.create_event(&event).unwrap_err();

        assert!(matches!(err, StorageError::EventAlreadyExists(_)));
    }

    #[test]
    fn load_nonexistent_event_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_event(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::EventNotFound(_)));
    }

    #[test]
    fn list_events_sorted_by_created_at() {
        let (_dir, storage) = test_storage();

        let mut first = sample_event(4, 1);
        first.name = "First".into();
        first.created_at = Timestamp::new(1_000_000_000, 0).unwrap();

        let mut second = sample_event(4, 1);
        second.name = "Second".into();
        second.created_at = Timestamp::new(2_000_000_000, 0).unwrap();

        // Create in reverse order to verify sorting.
        storage.create_event(&second).unwrap();
        storage.create_event(&first).unwrap();

        let events = storage.list_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "First");
        assert_eq!(events[1].name, "Second");
    }

    #[test]
    fn weights_absent_until_saved() {
        let (_dir, storage) = test_storage();
        let event = sample_event(4, 1);
        storage.create_event(&event).unwrap();

        assert_eq!(storage.load_weights(event.id).unwrap(), None);

        let weights = MatchingWeights {
            repeat_avoidance: 2.0,
            ..MatchingWeights::default()
        };
        storage.save_weights(event.id, &weights).unwrap();
        assert_eq!(storage.load_weights(event.id).unwrap(), Some(weights));
    }

    #[test]
    fn weights_for_missing_event_fail() {
        let (_dir, storage) = test_storage();
        let err = storage.load_weights(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::EventNotFound(_)));
    }
}
