//! Local persistence for events, guests, constraints, and assignments.
//!
//! Everything lives in one `SQLite` database under the storage root:
//!
//! ```text
//! <root>/seating.sqlite
//!   event               # Event configuration and status
//!   event_weights       # Optional per-event matching weights
//!   guest               # Guests, attributes as JSON
//!   seating_constraint  # Pin / repel / attract rules
//!   assignment          # Final assignments
//!   preview_assignment  # Staged assignments, keyed by session
//! ```

mod assignment;
mod constraint;
mod event;
mod guest;
mod preview;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("event not found: {0}")]
    EventNotFound(Uuid),

    #[error("guest not found: {0}")]
    GuestNotFound(Uuid),

    #[error("event already exists: {0}")]
    EventAlreadyExists(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS event (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    table_size INTEGER NOT NULL,
    number_of_rounds INTEGER NOT NULL,
    status TEXT NOT NULL,
    current_round INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS event_weights (
    event_id TEXT PRIMARY KEY REFERENCES event(id) ON DELETE CASCADE,
    department_mix REAL NOT NULL,
    interest_affinity REAL NOT NULL,
    job_level_diversity REAL NOT NULL,
    goal_compatibility REAL NOT NULL,
    repeat_avoidance REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS guest (
    id TEXT PRIMARY KEY,
    event_id TEXT NOT NULL REFERENCES event(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    department TEXT,
    attributes TEXT NOT NULL,
    current_table INTEGER
);
CREATE TABLE IF NOT EXISTS seating_constraint (
    id TEXT PRIMARY KEY,
    event_id TEXT NOT NULL REFERENCES event(id) ON DELETE CASCADE,
    kind TEXT NOT NULL,
    guest_a TEXT NOT NULL,
    guest_b TEXT,
    table_number INTEGER,
    reason TEXT
);
CREATE TABLE IF NOT EXISTS assignment (
    event_id TEXT NOT NULL REFERENCES event(id) ON DELETE CASCADE,
    guest_id TEXT NOT NULL,
    round INTEGER NOT NULL,
    table_number INTEGER NOT NULL,
    PRIMARY KEY (event_id, guest_id, round)
);
CREATE TABLE IF NOT EXISTS preview_assignment (
    session_id TEXT NOT NULL,
    event_id TEXT NOT NULL REFERENCES event(id) ON DELETE CASCADE,
    guest_id TEXT NOT NULL,
    round INTEGER NOT NULL,
    table_number INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (event_id, guest_id, round)
);
CREATE INDEX IF NOT EXISTS preview_assignment_created_at ON preview_assignment (created_at);
";

/// Local `SQLite`-backed storage.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory and schema are created if they don't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let storage = Self { root };
        storage.open()?.execute_batch(SCHEMA)?;
        Ok(storage)
    }

    /// Returns the default storage root: `~/.seating/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".seating"))
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(self.root.join("seating.sqlite"))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid> {
    s.parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}

fn parse_count(n: i64, what: &str) -> Result<u32> {
    u32::try_from(n).map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}
