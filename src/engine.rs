//! Greedy per-round table placement.
//!
//! Each round starts with empty tables. Feasible pins are seated first, then
//! the remaining guests are shuffled and each one takes the open table with
//! the lowest placement cost. Placement never fails on an unsatisfiable
//! constraint; violations are reported afterwards by [`crate::conflicts`].

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::concentration;
use crate::constraints::ConstraintIndex;
use crate::history::TablemateHistory;
use crate::model::{Assignment, Guest, MatchingWeights};
use crate::score;

const PIN_MATCH: f64 = -10_000.0;
const PIN_MISMATCH: f64 = 10_000.0;
const REPEL_PER_OCCUPANT: f64 = 5_000.0;
const ATTRACT_PER_OCCUPANT: f64 = -500.0;

/// Fixed nudge toward the table a guest sat at in the previous round.
const STABILITY_BONUS: f64 = -0.1;

const COMPATIBILITY_SCALE: f64 = 2.0;
const REPEAT_SCALE: f64 = 3.0;

/// The tables of one round. `tables[0]` is table 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seating {
    pub round: u32,
    pub tables: Vec<Vec<Uuid>>,
}

impl Seating {
    /// Table number for a guest, if seated this round.
    #[cfg(test)]
    pub fn table_of(&self, guest: Uuid) -> Option<u32> {
        self.tables
            .iter()
            .position(|t| t.contains(&guest))
            .map(table_number)
    }

    pub fn assignments(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.tables.iter().enumerate().flat_map(move |(i, guests)| {
            guests.iter().map(move |guest_id| Assignment {
                guest_id: *guest_id,
                round: self.round,
                table: table_number(i),
            })
        })
    }
}

/// Cost of seating one guest at one table, split by term. Lower is better.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlacementCost {
    pub constraint: f64,
    pub stability: f64,
    pub department: f64,
    pub concentration: f64,
    pub compatibility: f64,
    pub repeat: f64,
}

impl PlacementCost {
    pub fn total(&self) -> f64 {
        self.constraint
            + self.stability
            + self.department
            + self.concentration
            + self.compatibility
            + self.repeat
    }
}

/// Places one event's guests into tables, round by round.
pub struct Engine<'a> {
    guests: &'a [Guest],
    table_size: usize,
    table_count: usize,
    weights: MatchingWeights,
    constraints: &'a ConstraintIndex,
}

impl<'a> Engine<'a> {
    pub fn new(
        guests: &'a [Guest],
        table_size: u32,
        weights: MatchingWeights,
        constraints: &'a ConstraintIndex,
    ) -> Self {
        let table_size = (table_size as usize).max(1);
        Self {
            guests,
            table_size,
            table_count: guests.len().div_ceil(table_size),
            weights,
            constraints,
        }
    }

    pub fn table_count(&self) -> usize {
        self.table_count
    }

    /// Seats rounds `1..=rounds`, feeding each round's tablemates into the next.
    pub fn seat_rounds<R: Rng + ?Sized>(&self, rounds: u32, rng: &mut R) -> Vec<Seating> {
        let mut history = TablemateHistory::new();
        let mut seatings: Vec<Seating> = Vec::with_capacity(rounds as usize);

        for round in 1..=rounds {
            let seating = self.seat_round(round, &history, seatings.last(), rng);
            history.record_round(&seating.tables);
            seatings.push(seating);
        }

        seatings
    }

    /// Seats a single round.
    pub fn seat_round<R: Rng + ?Sized>(
        &self,
        round: u32,
        history: &TablemateHistory,
        previous: Option<&Seating>,
        rng: &mut R,
    ) -> Seating {
        let mut tables: Vec<Vec<&Guest>> = vec![Vec::with_capacity(self.table_size); self.table_count];
        let mut placed: HashSet<Uuid> = HashSet::new();

        for guest in self.guests {
            let Some(pin) = self.constraints.pinned_table(guest.id) else {
                continue;
            };
            match table_index(pin, tables.len()) {
                Some(i) if tables[i].len() < self.table_size => {
                    tables[i].push(guest);
                    placed.insert(guest.id);
                }
                _ => {
                    tracing::debug!(
                        guest = %guest.id,
                        table = pin,
                        round,
                        "pin not satisfiable, falling back to normal placement"
                    );
                }
            }
        }

        let mut remaining: Vec<&Guest> = self
            .guests
            .iter()
            .filter(|g| !placed.contains(&g.id))
            .collect();
        remaining.shuffle(rng);

        let previous_tables: HashMap<Uuid, u32> = previous
            .map(|s| s.assignments().map(|a| (a.guest_id, a.table)).collect())
            .unwrap_or_default();

        for guest in remaining {
            let previous_table = previous_tables.get(&guest.id).copied();
            let mut best: Option<(usize, f64)> = None;

            for (i, occupants) in tables.iter().enumerate() {
                if occupants.len() >= self.table_size {
                    continue;
                }
                let cost = self
                    .placement_cost(guest, table_number(i), occupants, history, previous_table)
                    .total();
                if best.is_none_or(|(_, lowest)| cost < lowest) {
                    best = Some((i, cost));
                }
            }

            if let Some((i, _)) = best {
                tables[i].push(guest);
            } else {
                tracing::warn!(guest = %guest.id, round, "no open table, opening another");
                tables.push(vec![guest]);
            }
        }

        Seating {
            round,
            tables: tables
                .into_iter()
                .map(|t| t.into_iter().map(|g| g.id).collect())
                .collect(),
        }
    }

    /// Cost of seating `guest` at `table` alongside `occupants`.
    pub fn placement_cost(
        &self,
        guest: &Guest,
        table: u32,
        occupants: &[&Guest],
        history: &TablemateHistory,
        previous_table: Option<u32>,
    ) -> PlacementCost {
        let mut cost = PlacementCost::default();

        if let Some(pin) = self.constraints.pinned_table(guest.id) {
            cost.constraint += if pin == table { PIN_MATCH } else { PIN_MISMATCH };
        }
        for occupant in occupants {
            if self.constraints.repels(guest.id, occupant.id) {
                cost.constraint += REPEL_PER_OCCUPANT;
            }
            if self.constraints.attracts(guest.id, occupant.id) {
                cost.constraint += ATTRACT_PER_OCCUPANT;
            }
        }

        if previous_table == Some(table) {
            cost.stability = STABILITY_BONUS;
        }

        let department = guest.department.as_deref();
        if self.weights.department_mix != 0.0 {
            let shares = occupants
                .iter()
                .any(|o| score::same_department(department, o.department.as_deref()));
            if shares {
                cost.department = self.weights.department_mix;
            }
            cost.concentration =
                concentration::penalty(department, occupants, self.weights.department_mix);
        }

        if !occupants.is_empty() {
            let total: f64 = occupants
                .iter()
                .map(|o| score::compatibility(guest, o, &self.weights))
                .sum();
            cost.compatibility = -COMPATIBILITY_SCALE * (total / occupants.len() as f64);
        }

        if self.weights.repeat_avoidance != 0.0 {
            let repeats = history.repeats(guest.id, occupants.iter().map(|o| o.id));
            cost.repeat = self.weights.repeat_avoidance * REPEAT_SCALE * repeats as f64;
        }

        cost
    }
}

/// One-based table number for a zero-based index.
fn table_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Zero-based index for a table number, if it exists.
fn table_index(table: u32, count: usize) -> Option<usize> {
    let index = (table as usize).checked_sub(1)?;
    (index < count).then_some(index)
}
