//! Preview staging: generate a candidate seating, review it, then commit or discard.
//!
//! A preview is a set of staged rows under one session id. Generating always
//! replaces the event's previous preview and never touches final assignments.
//! Committing replaces final assignments wholesale with the staged rows.

use std::collections::{BTreeMap, HashMap};

use jiff::{SignedDuration, Timestamp};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::conflicts;
use crate::constraints::ConstraintIndex;
use crate::engine::Engine;
use crate::model::{Assignment, MatchingWeights, Violation};
use crate::storage::{Storage, StorageError};

/// How long a preview session lives before `expire_stale` removes it.
pub const PREVIEW_TTL: SignedDuration = SignedDuration::from_mins(30);

/// Errors from the staging workflow.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("event {0} has no guests to seat")]
    NoGuests(Uuid),

    #[error("event {0} has no preview to act on")]
    NoPreview(Uuid),

    #[error("no staged seat for guest {guest} in round {round}")]
    SeatNotFound { guest: Uuid, round: u32 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = core::result::Result<T, StagingError>;

/// Outcome of generating a preview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReport {
    pub session_id: Uuid,
    pub total_assignments: usize,
    pub rounds: u32,

    /// Advisory: the preview is written regardless.
    pub constraint_violations: Vec<Violation>,
}

/// A staged preview, grouped by round.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewView {
    pub session_id: Uuid,
    pub created_at: Timestamp,
    pub by_round: BTreeMap<u32, Vec<StagedSeat>>,
}

/// One staged row with the guest's display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedSeat {
    pub guest_id: Uuid,
    pub name: String,
    pub department: Option<String>,
    pub table: u32,
}

/// Seats every round for an event and stages the result as a new preview.
///
/// Weights fall back to `default_weights` when the event has none stored.
pub fn generate<R: Rng + ?Sized>(
    storage: &Storage,
    event_id: Uuid,
    default_weights: &MatchingWeights,
    rng: &mut R,
) -> Result<GenerateReport> {
    let event = storage.load_event(event_id)?;
    let guests = storage.load_guests(event_id)?;
    if guests.is_empty() {
        return Err(StagingError::NoGuests(event_id));
    }
    let weights = storage.load_weights(event_id)?.unwrap_or(*default_weights);
    let constraints = storage.load_constraints(event_id)?;
    let index = ConstraintIndex::build(&constraints);

    let engine = Engine::new(&guests, event.table_size, weights, &index);
    let seatings = engine.seat_rounds(event.number_of_rounds, rng);
    let assignments: Vec<Assignment> = seatings.iter().flat_map(|s| s.assignments()).collect();

    expire_stale(storage, Timestamp::now())?;

    let session_id = Uuid::new_v4();
    storage.replace_preview(event_id, session_id, Timestamp::now(), &assignments)?;

    let violations = conflicts::check(&assignments, &index, &guests);
    tracing::info!(
        event = %event_id,
        session = %session_id,
        guests = guests.len(),
        tables = engine.table_count(),
        rounds = event.number_of_rounds,
        violations = violations.len(),
        "generated preview"
    );

    Ok(GenerateReport {
        session_id,
        total_assignments: assignments.len(),
        rounds: event.number_of_rounds,
        constraint_violations: violations,
    })
}

/// Loads the event's preview, or `None` if nothing is staged.
pub fn get(storage: &Storage, event_id: Uuid) -> Result<Option<PreviewView>> {
    let staged = storage.load_preview(event_id)?;
    let Some(first) = staged.first() else {
        return Ok(None);
    };
    let (session_id, created_at) = (first.session_id, first.created_at);

    let guests = storage.load_guests(event_id)?;
    let by_id: HashMap<Uuid, _> = guests.iter().map(|g| (g.id, g)).collect();

    let mut by_round: BTreeMap<u32, Vec<StagedSeat>> = BTreeMap::new();
    for row in &staged {
        let guest = by_id.get(&row.guest_id);
        by_round.entry(row.round).or_default().push(StagedSeat {
            guest_id: row.guest_id,
            name: guest.map_or_else(|| row.guest_id.to_string(), |g| g.name.clone()),
            department: guest.and_then(|g| g.department.clone()),
            table: row.table,
        });
    }

    Ok(Some(PreviewView {
        session_id,
        created_at,
        by_round,
    }))
}

/// Moves one staged guest to `table` for `round`.
///
/// Does not re-score or check capacity; callers enforce capacity first.
pub fn update_single(
    storage: &Storage,
    event_id: Uuid,
    guest_id: Uuid,
    round: u32,
    table: u32,
) -> Result<()> {
    storage.load_guest(event_id, guest_id)?;
    let changed = storage.update_preview_table(event_id, guest_id, round, table)?;
    if changed == 0 {
        return Err(StagingError::SeatNotFound {
            guest: guest_id,
            round,
        });
    }
    tracing::debug!(event = %event_id, guest = %guest_id, round, table, "moved staged guest");
    Ok(())
}

/// Replaces the event's final assignments with its preview.
///
/// Returns the number of assignments written.
pub fn commit(storage: &Storage, event_id: Uuid) -> Result<usize> {
    let assigned = storage
        .commit_preview(event_id)?
        .ok_or(StagingError::NoPreview(event_id))?;
    tracing::info!(event = %event_id, assigned, "committed preview");
    Ok(assigned)
}

/// Deletes the event's preview without touching final assignments.
///
/// Returns the number of staged rows removed.
pub fn discard(storage: &Storage, event_id: Uuid) -> Result<usize> {
    let deleted = storage.delete_preview(event_id)?;
    if deleted == 0 {
        return Err(StagingError::NoPreview(event_id));
    }
    tracing::info!(event = %event_id, deleted, "discarded preview");
    Ok(deleted)
}

/// Deletes every preview row older than [`PREVIEW_TTL`] as of `now`, across all events.
pub fn expire_stale(storage: &Storage, now: Timestamp) -> Result<usize> {
    let cutoff = now.checked_sub(PREVIEW_TTL).unwrap_or(Timestamp::MIN);
    let removed = storage.delete_previews_before(cutoff)?;
    if removed > 0 {
        tracing::info!(removed, "expired stale preview rows");
    }
    Ok(removed)
}

/// Checks an event's committed assignments against its constraints.
pub fn check_committed(storage: &Storage, event_id: Uuid) -> Result<Vec<Violation>> {
    let assignments = storage.load_assignments(event_id)?;
    let guests = storage.load_guests(event_id)?;
    let index = ConstraintIndex::build(&storage.load_constraints(event_id)?);
    Ok(conflicts::check(&assignments, &index, &guests))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::model::{Constraint, ConstraintKind, ConstraintRule, Event, Guest, GuestPair};
    use crate::storage::tests::{sample_event, sample_guests, test_storage};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn setup(storage: &Storage, table_size: u32, rounds: u32, guests: usize) -> (Event, Vec<Guest>) {
        let event = sample_event(table_size, rounds);
        storage.create_event(&event).unwrap();
        let guests = sample_guests(&event, guests);
        storage.add_guests(event.id, &guests).unwrap();
        (event, guests)
    }

    fn add_rule(storage: &Storage, event: &Event, rule: ConstraintRule) {
        let constraint = Constraint {
            id: Uuid::new_v4(),
            event_id: event.id,
            rule,
            reason: None,
        };
        storage.add_constraints(event.id, &[constraint]).unwrap();
    }

    fn staged_assignments(storage: &Storage, event: &Event) -> Vec<Assignment> {
        storage
            .load_preview(event.id)
            .unwrap()
            .iter()
            .map(|s| Assignment {
                guest_id: s.guest_id,
                round: s.round,
                table: s.table,
            })
            .collect()
    }

    #[test]
    fn generate_stages_every_guest_every_round() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 4, 3, 10);

        let report = generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();

        assert_eq!(report.rounds, 3);
        assert_eq!(report.total_assignments, 30);
        for round in 1..=3 {
            let rows: Vec<Assignment> = staged_assignments(&storage, &event)
                .into_iter()
                .filter(|a| a.round == round)
                .collect();
            let seated: HashSet<Uuid> = rows.iter().map(|a| a.guest_id).collect();
            assert_eq!(seated.len(), guests.len());
            for table in 1..=3 {
                assert!(rows.iter().filter(|a| a.table == table).count() <= 4);
            }
        }
        assert!(storage.load_preview(event.id).unwrap().iter().all(|s| s.session_id == report.session_id));
    }

    #[test]
    fn generate_without_guests_fails() {
        let (_dir, storage) = test_storage();
        let (event, _) = setup(&storage, 4, 1, 0);

        let err = generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap_err();
        assert!(matches!(err, StagingError::NoGuests(_)));
    }

    #[test]
    fn generate_for_missing_event_fails() {
        let (_dir, storage) = test_storage();

        let err = generate(&storage, Uuid::new_v4(), &MatchingWeights::default(), &mut rng()).unwrap_err();
        assert!(matches!(err, StagingError::Storage(StorageError::EventNotFound(_))));
    }

    #[test]
    fn generate_leaves_final_assignments_alone() {
        let (_dir, storage) = test_storage();
        let (event, _) = setup(&storage, 3, 1, 6);

        generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();
        commit(&storage, event.id).unwrap();
        let committed = storage.load_assignments(event.id).unwrap();

        generate(&storage, event.id, &MatchingWeights::default(), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(storage.load_assignments(event.id).unwrap(), committed);
    }

    #[test]
    fn commit_without_preview_fails() {
        let (_dir, storage) = test_storage();
        let (event, _) = setup(&storage, 3, 1, 6);

        let err = commit(&storage, event.id).unwrap_err();
        assert!(matches!(err, StagingError::NoPreview(_)));
    }

    #[test]
    fn commit_promotes_exactly_what_was_staged() {
        let (_dir, storage) = test_storage();
        let (event, _) = setup(&storage, 3, 2, 7);

        generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();
        let mut staged = staged_assignments(&storage, &event);

        let assigned = commit(&storage, event.id).unwrap();

        let mut finals = storage.load_assignments(event.id).unwrap();
        staged.sort_by_key(|a| (a.round, a.table, a.guest_id));
        finals.sort_by_key(|a| (a.round, a.table, a.guest_id));
        assert_eq!(assigned, staged.len());
        assert_eq!(finals, staged);
        assert!(storage.load_preview(event.id).unwrap().is_empty());
        assert!(get(&storage, event.id).unwrap().is_none());
    }

    #[test]
    fn discard_keeps_final_assignments() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 3, 1, 6);

        generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();
        commit(&storage, event.id).unwrap();
        let committed = storage.load_assignments(event.id).unwrap();

        generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();
        let deleted = discard(&storage, event.id).unwrap();

        assert_eq!(deleted, guests.len());
        assert!(storage.load_preview(event.id).unwrap().is_empty());
        assert_eq!(storage.load_assignments(event.id).unwrap(), committed);
    }

    #[test]
    fn discard_without_preview_fails() {
        let (_dir, storage) = test_storage();
        let (event, _) = setup(&storage, 3, 1, 6);

        let err = discard(&storage, event.id).unwrap_err();
        assert!(matches!(err, StagingError::NoPreview(_)));
    }

    #[test]
    fn get_groups_rows_by_round_with_names() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 2, 2, 4);

        let report = generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();
        let view = get(&storage, event.id).unwrap().unwrap();

        assert_eq!(view.session_id, report.session_id);
        assert_eq!(view.by_round.len(), 2);
        for seats in view.by_round.values() {
            assert_eq!(seats.len(), guests.len());
            assert!(seats.iter().all(|s| s.name.starts_with("Guest ")));
        }
    }

    #[test]
    fn get_without_preview_is_none() {
        let (_dir, storage) = test_storage();
        let (event, _) = setup(&storage, 2, 1, 4);

        assert!(get(&storage, event.id).unwrap().is_none());
    }

    #[test]
    fn update_single_moves_one_row() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 2, 1, 4);
        generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();

        update_single(&storage, event.id, guests[0].id, 1, 5).unwrap();

        let moved: Vec<Assignment> = staged_assignments(&storage, &event)
            .into_iter()
            .filter(|a| a.table == 5)
            .collect();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].guest_id, guests[0].id);
    }

    #[test]
    fn update_single_without_row_fails() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 2, 1, 4);
        generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();

        let err = update_single(&storage, event.id, guests[0].id, 2, 1).unwrap_err();
        assert!(matches!(err, StagingError::SeatNotFound { round: 2, .. }));
    }

    #[test]
    fn update_single_for_unknown_guest_fails() {
        let (_dir, storage) = test_storage();
        let (event, _guests) = setup(&storage, 2, 1, 4);
        generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();
        let before = staged_assignments(&storage, &event);

        let stranger = Uuid::new_v4();
        let err = update_single(&storage, event.id, stranger, 1, 1).unwrap_err();
        assert!(matches!(
            err,
            StagingError::Storage(StorageError::GuestNotFound(id)) if id == stranger
        ));
        assert_eq!(staged_assignments(&storage, &event), before);
    }

    #[test]
    fn expire_stale_respects_ttl() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 2, 1, 2);
        let now = Timestamp::now();
        let rows = [Assignment {
            guest_id: guests[0].id,
            round: 1,
            table: 1,
        }];

        storage
            .replace_preview(event.id, Uuid::new_v4(), now - SignedDuration::from_mins(1), &rows)
            .unwrap();
        assert_eq!(expire_stale(&storage, now).unwrap(), 0);

        storage
            .replace_preview(event.id, Uuid::new_v4(), now - SignedDuration::from_mins(31), &rows)
            .unwrap();
        assert_eq!(expire_stale(&storage, now).unwrap(), 1);
        assert!(storage.load_preview(event.id).unwrap().is_empty());
    }

    #[test]
    fn stored_weights_override_defaults() {
        let (_dir, storage) = test_storage();
        let (event, _) = setup(&storage, 2, 2, 4);
        let stored = MatchingWeights {
            repeat_avoidance: 0.9,
            ..MatchingWeights::ZERO
        };
        storage.save_weights(event.id, &stored).unwrap();

        // Under all-zero defaults the stability bonus alone would repeat every table.
        generate(&storage, event.id, &MatchingWeights::ZERO, &mut rng()).unwrap();
        let rows = staged_assignments(&storage, &event);
        let table_of = |guest: Uuid, round: u32| {
            rows.iter()
                .find(|a| a.guest_id == guest && a.round == round)
                .map(|a| a.table)
        };
        for a in rows.iter().filter(|a| a.round == 2) {
            for b in rows.iter().filter(|b| b.round == 2 && b.table == a.table && b.guest_id != a.guest_id) {
                assert_ne!(table_of(a.guest_id, 1), table_of(b.guest_id, 1));
            }
        }
    }

    #[test]
    fn forced_repel_is_reported() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 2, 1, 2);
        add_rule(
            &storage,
            &event,
            ConstraintRule::Repel {
                pair: GuestPair::new(guests[0].id, guests[1].id),
            },
        );

        let report = generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();

        assert_eq!(report.constraint_violations.len(), 1);
        assert_eq!(report.constraint_violations[0].kind, ConstraintKind::Repel);
    }

    #[test]
    fn repel_with_room_is_not_reported() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 2, 1, 3);
        add_rule(
            &storage,
            &event,
            ConstraintRule::Repel {
                pair: GuestPair::new(guests[0].id, guests[1].id),
            },
        );

        for seed in 0..10 {
            let report =
                generate(&storage, event.id, &MatchingWeights::ZERO, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(report.constraint_violations.is_empty(), "seed {seed}");
        }
    }

    #[test]
    fn crowded_pin_falls_back_and_is_reported() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 1, 2, 3);
        add_rule(&storage, &event, ConstraintRule::Pin { guest: guests[0].id, table: 2 });
        add_rule(&storage, &event, ConstraintRule::Pin { guest: guests[1].id, table: 2 });

        let report = generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();

        let pins: Vec<&Violation> = report
            .constraint_violations
            .iter()
            .filter(|v| v.kind == ConstraintKind::Pin)
            .collect();
        assert_eq!(pins.len(), 2);
        assert_eq!(pins[0].round, 1);
        assert_eq!(pins[1].round, 2);
        assert!(pins.iter().all(|v| v.description.contains(&guests[1].name)));
    }

    #[test]
    fn check_committed_reads_final_assignments() {
        let (_dir, storage) = test_storage();
        let (event, guests) = setup(&storage, 2, 1, 2);

        generate(&storage, event.id, &MatchingWeights::default(), &mut rng()).unwrap();
        commit(&storage, event.id).unwrap();
        assert!(check_committed(&storage, event.id).unwrap().is_empty());

        add_rule(
            &storage,
            &event,
            ConstraintRule::Repel {
                pair: GuestPair::new(guests[0].id, guests[1].id),
            },
        );
        let violations = check_committed(&storage, event.id).unwrap();
        assert_eq!(violations.len(), 1);
    }
}
