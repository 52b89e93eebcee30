//! Roster import: one event, its guests, and its constraints from a JSON file.
//!
//! Constraints name guests by their display name, since ids don't exist until
//! import. Names must be unique within the roster to be referenced.
//!
//! ```json
//! {
//!   "name": "Spring mixer",
//!   "tableSize": 4,
//!   "numberOfRounds": 2,
//!   "weights": { "repeatAvoidance": 1.5 },
//!   "guests": [{ "name": "Ada", "department": "Engineering" }],
//!   "constraints": [{ "type": "pin", "guest": "Ada", "table": 1 }]
//! }
//! ```

use std::collections::HashMap;

use jiff::Timestamp;
use serde::Deserialize;
use uuid::Uuid;

use crate::model::{
    Constraint, ConstraintRule, Event, EventStatus, Guest, GuestAttributes, GuestPair,
    MatchingWeights,
};
use crate::storage::{Storage, StorageError};

/// Errors that can occur while importing a roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("table size must be at least 1")]
    InvalidTableSize,

    #[error("number of rounds must be at least 1")]
    InvalidRounds,

    #[error("constraint references unknown guest '{0}'")]
    UnknownGuest(String),

    #[error("constraint references '{0}', which matches more than one guest")]
    AmbiguousGuest(String),

    #[error("pair constraint names '{0}' twice")]
    SelfPair(String),

    #[error("pin for '{0}' must target table 1 or higher")]
    InvalidPinTable(String),

    #[error("invalid roster: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = core::result::Result<T, RosterError>;

/// A roster file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Roster {
    pub name: String,
    pub table_size: u32,
    #[serde(default = "one")]
    pub number_of_rounds: u32,
    pub weights: Option<RosterWeights>,
    #[serde(default)]
    pub guests: Vec<RosterGuest>,
    #[serde(default)]
    pub constraints: Vec<RosterConstraint>,
}

/// Matching weights in roster key style. Omitted keys keep their defaults.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RosterWeights {
    pub department_mix: f64,
    pub interest_affinity: f64,
    pub job_level_diversity: f64,
    pub goal_compatibility: f64,
    pub repeat_avoidance: f64,
}

impl Default for RosterWeights {
    fn default() -> Self {
        MatchingWeights::default().into()
    }
}

impl From<MatchingWeights> for RosterWeights {
    fn from(w: MatchingWeights) -> Self {
        Self {
            department_mix: w.department_mix,
            interest_affinity: w.interest_affinity,
            job_level_diversity: w.job_level_diversity,
            goal_compatibility: w.goal_compatibility,
            repeat_avoidance: w.repeat_avoidance,
        }
    }
}

impl From<RosterWeights> for MatchingWeights {
    fn from(w: RosterWeights) -> Self {
        Self {
            department_mix: w.department_mix,
            interest_affinity: w.interest_affinity,
            job_level_diversity: w.job_level_diversity,
            goal_compatibility: w.goal_compatibility,
            repeat_avoidance: w.repeat_avoidance,
        }
    }
}

/// A guest entry in a roster.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RosterGuest {
    pub name: String,
    pub department: Option<String>,
    #[serde(default)]
    pub attributes: GuestAttributes,
}

/// A constraint entry in a roster, naming guests.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RosterConstraint {
    Pin {
        guest: String,
        table: u32,
        reason: Option<String>,
    },
    Repel {
        guests: [String; 2],
        reason: Option<String>,
    },
    Attract {
        guests: [String; 2],
        reason: Option<String>,
    },
}

fn one() -> u32 {
    1
}

impl Roster {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Imports the roster as a new draft event. Returns the created event.
    pub fn import(self, storage: &Storage) -> Result<Event> {
        if self.table_size == 0 {
            return Err(RosterError::InvalidTableSize);
        }
        if self.number_of_rounds == 0 {
            return Err(RosterError::InvalidRounds);
        }

        let event = Event {
            id: Uuid::new_v4(),
            name: self.name,
            table_size: self.table_size,
            number_of_rounds: self.number_of_rounds,
            status: EventStatus::Draft,
            current_round: 0,
            created_at: Timestamp::now(),
        };

        let guests: Vec<Guest> = self
            .guests
            .into_iter()
            .map(|g| Guest {
                id: Uuid::new_v4(),
                event_id: event.id,
                name: g.name,
                department: g.department.filter(|d| !d.trim().is_empty()),
                attributes: g.attributes,
                current_table: None,
            })
            .collect();

        let names = NameIndex::new(&guests);
        let constraints = self
            .constraints
            .into_iter()
            .map(|c| names.resolve(event.id, c))
            .collect::<Result<Vec<_>>>()?;

        storage.create_event(&event)?;
        if let Some(weights) = self.weights {
            storage.save_weights(event.id, &weights.into())?;
        }
        storage.add_guests(event.id, &guests)?;
        storage.add_constraints(event.id, &constraints)?;

        tracing::info!(
            event = %event.id,
            guests = guests.len(),
            constraints = constraints.len(),
            "imported roster"
        );
        Ok(event)
    }
}

/// Guest ids by trimmed name. `None` marks a name used more than once.
struct NameIndex {
    ids: HashMap<String, Option<Uuid>>,
}

impl NameIndex {
    fn new(guests: &[Guest]) -> Self {
        let mut ids = HashMap::new();
        for guest in guests {
            ids.entry(guest.name.trim().to_string())
                .and_modify(|id| *id = None)
                .or_insert(Some(guest.id));
        }
        Self { ids }
    }

    fn lookup(&self, name: &str) -> Result<Uuid> {
        match self.ids.get(name.trim()) {
            Some(Some(id)) => Ok(*id),
            Some(None) => Err(RosterError::AmbiguousGuest(name.to_string())),
            None => Err(RosterError::UnknownGuest(name.to_string())),
        }
    }

    fn pair(&self, [a, b]: &[String; 2]) -> Result<GuestPair> {
        let (first, second) = (self.lookup(a)?, self.lookup(b)?);
        if first == second {
            return Err(RosterError::SelfPair(a.clone()));
        }
        Ok(GuestPair::new(first, second))
    }

    fn resolve(&self, event_id: Uuid, constraint: RosterConstraint) -> Result<Constraint> {
        let (rule, reason) = match constraint {
            RosterConstraint::Pin {
                guest,
                table,
                reason,
            } => {
                if table == 0 {
                    return Err(RosterError::InvalidPinTable(guest));
                }
                let rule = ConstraintRule::Pin {
                    guest: self.lookup(&guest)?,
                    table,
                };
                (rule, reason)
            }
            RosterConstraint::Repel { guests, reason } => (
                ConstraintRule::Repel {
                    pair: self.pair(&guests)?,
                },
                reason,
            ),
            RosterConstraint::Attract { guests, reason } => (
                ConstraintRule::Attract {
                    pair: self.pair(&guests)?,
                },
                reason,
            ),
        };

        Ok(Constraint {
            id: Uuid::new_v4(),
            event_id,
            rule,
            reason,
        })
    }
}
