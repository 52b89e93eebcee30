//! Constraint storage.

use uuid::Uuid;

use crate::model::{Constraint, ConstraintRule, GuestPair};

use super::event::require_event;
use super::{Result, Storage, StorageError, parse_count, parse_uuid};

impl Storage {
    /// Adds constraints to an event in a single transaction.
    pub fn add_constraints(&self, event_id: Uuid, constraints: &[Constraint]) -> Result<()> {
        let mut conn = self.open()?;
        require_event(&conn, event_id)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO seating_constraint (id, event_id, kind, guest_a, guest_b, table_number, reason)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for constraint in constraints {
                let (guest_a, guest_b, table) = serialize_rule(&constraint.rule);
                stmt.execute(rusqlite::params![
                    constraint.id.to_string(),
                    event_id.to_string(),
                    constraint.rule.kind().as_str(),
                    guest_a,
                    guest_b,
                    table,
                    constraint.reason.as_deref(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads all constraints for an event.
    pub fn load_constraints(&self, event_id: Uuid) -> Result<Vec<Constraint>> {
        let conn = self.open()?;
        require_event(&conn, event_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, kind, guest_a, guest_b, table_number, reason
             FROM seating_constraint WHERE event_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([event_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<i64>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut constraints = Vec::new();
        for row in rows {
            let (id, kind, guest_a, guest_b, table, reason) = row?;
            constraints.push(Constraint {
                id: parse_uuid(&id, "constraint id")?,
                event_id,
                rule: deserialize_rule(&kind, &guest_a, guest_b.as_deref(), table)?,
                reason,
            });
        }
        Ok(constraints)
    }
}

/// Converts a rule to `(guest_a, guest_b, table_number)` column values.
fn serialize_rule(rule: &ConstraintRule) -> (String, Option<String>, Option<u32>) {
    match rule {
        ConstraintRule::Pin { guest, table } => (guest.to_string(), None, Some(*table)),
        ConstraintRule::Repel { pair } | ConstraintRule::Attract { pair } => (
            pair.first().to_string(),
            Some(pair.second().to_string()),
            None,
        ),
    }
}

/// Reconstructs a rule from constraint table column values.
fn deserialize_rule(
    kind: &str,
    guest_a: &str,
    guest_b: Option<&str>,
    table: Option<i64>,
) -> Result<ConstraintRule> {
    let guest_a = parse_uuid(guest_a, "constraint guest")?;
    let pair = || -> Result<GuestPair> {
        let guest_b = guest_b
            .ok_or_else(|| StorageError::Corrupt(format!("{kind} constraint missing second guest")))?;
        Ok(GuestPair::new(guest_a, parse_uuid(guest_b, "constraint guest")?))
    };

    match kind {
        "pin" => {
            let table = table
                .ok_or_else(|| StorageError::Corrupt("pin constraint missing table".into()))?;
            Ok(ConstraintRule::Pin {
                guest: guest_a,
                table: parse_count(table, "pin table")?,
            })
        }
        "repel" => Ok(ConstraintRule::Repel { pair: pair()? }),
        "attract" => Ok(ConstraintRule::Attract { pair: pair()? }),
        other => Err(StorageError::Corrupt(format!(
            "unknown constraint kind: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::storage::tests::{sample_event, sample_guests, test_storage};

    #[test]
    fn add_and_load_constraints() {
        let (_dir, storage) = test_storage();
        let event = sample_event(4, 1);
        storage.create_event(&event).unwrap();
        let guests = sample_guests(&event, 3);
        storage.add_guests(event.id, &guests).unwrap();

        let constraints = vec![
            Constraint {
                id: Uuid::new_v4(),
                event_id: event.id,
                rule: ConstraintRule::Pin {
                    guest: guests[0].id,
                    table: 2,
                },
                reason: Some("Speaker".into()),
            },
            Constraint {
                id: Uuid::new_v4(),
                event_id: event.id,
                rule: ConstraintRule::Repel {
                    pair: GuestPair::new(guests[1].id, guests[2].id),
                },
                reason: None,
            },
            Constraint {
                id: Uuid::new_v4(),
                event_id: event.id,
                rule: ConstraintRule::Attract {
                    pair: GuestPair::new(guests[2].id, guests[0].id),
                },
                reason: None,
            },
        ];
        storage.add_constraints(event.id, &constraints).unwrap();

        assert_eq!(storage.load_constraints(event.id).unwrap(), constraints);
    }

    #[test]
    fn unknown_kind_is_corrupt() {
        let err = deserialize_rule("seat-near", &Uuid::new_v4().to_string(), None, None).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[test]
    fn pair_without_second_guest_is_corrupt() {
        let err = deserialize_rule("repel", &Uuid::new_v4().to_string(), None, None).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
