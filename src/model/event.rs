//! Events: table capacity and round configuration.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A seating event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,

    /// Seats per table. Always at least 1.
    pub table_size: u32,

    /// Number of re-seating rounds. Always at least 1.
    pub number_of_rounds: u32,

    pub status: EventStatus,

    /// Round currently in progress. Reset to 0 on commit.
    pub current_round: u32,

    pub created_at: Timestamp,
}

impl Event {
    /// Tables needed per round to seat `guest_count` guests.
    pub fn table_count(&self, guest_count: usize) -> u32 {
        let size = self.table_size.max(1) as usize;
        u32::try_from(guest_count.div_ceil(size)).unwrap_or(u32::MAX)
    }
}

/// Where an event stands in the assignment workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventStatus {
    /// No assignments have been committed.
    Draft,

    /// Final assignments exist.
    Assigned,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Assigned => "assigned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(table_size: u32) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "Mixer".into(),
            table_size,
            number_of_rounds: 1,
            status: EventStatus::Draft,
            current_round: 0,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn table_count_rounds_up() {
        assert_eq!(event(3).table_count(6), 2);
        assert_eq!(event(3).table_count(7), 3);
        assert_eq!(event(4).table_count(1), 1);
        assert_eq!(event(4).table_count(0), 0);
    }
}
