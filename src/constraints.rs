//! Constraint lookup tables for one event.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::model::{Constraint, ConstraintRule, GuestPair};

/// Pins and pair rules indexed for constant-time lookup during placement.
#[derive(Debug, Clone, Default)]
pub struct ConstraintIndex {
    pins: HashMap<Uuid, u32>,
    repel: HashSet<GuestPair>,
    attract: HashSet<GuestPair>,
}

impl ConstraintIndex {
    /// Builds the index in one pass. A later pin for the same guest replaces an earlier one.
    pub fn build<'a>(constraints: impl IntoIterator<Item = &'a Constraint>) -> Self {
        let mut index = Self::default();
        for constraint in constraints {
            match constraint.rule {
                ConstraintRule::Pin { guest, table } => {
                    index.pins.insert(guest, table);
                }
                ConstraintRule::Repel { pair } => {
                    index.repel.insert(pair);
                }
                ConstraintRule::Attract { pair } => {
                    index.attract.insert(pair);
                }
            }
        }
        index
    }

    pub fn pinned_table(&self, guest: Uuid) -> Option<u32> {
        self.pins.get(&guest).copied()
    }

    pub fn repels(&self, a: Uuid, b: Uuid) -> bool {
        self.repel.contains(&GuestPair::new(a, b))
    }

    pub fn attracts(&self, a: Uuid, b: Uuid) -> bool {
        self.attract.contains(&GuestPair::new(a, b))
    }

    pub fn pins(&self) -> impl Iterator<Item = (Uuid, u32)> + '_ {
        self.pins.iter().map(|(guest, table)| (*guest, *table))
    }

    pub fn repel_pairs(&self) -> impl Iterator<Item = GuestPair> + '_ {
        self.repel.iter().copied()
    }

    pub fn attract_pairs(&self) -> impl Iterator<Item = GuestPair> + '_ {
        self.attract.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty() && self.repel.is_empty() && self.attract.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn constraint(rule: ConstraintRule) -> Constraint {
        Constraint {
            id: Uuid::new_v4(),
            event_id: Uuid::nil(),
            rule,
            reason: None,
        }
    }

    #[test]
    fn pair_lookups_ignore_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let constraints = [
            constraint(ConstraintRule::Repel {
                pair: GuestPair::new(a, b),
            }),
            constraint(ConstraintRule::Attract {
                pair: GuestPair::new(c, a),
            }),
        ];

        let index = ConstraintIndex::build(&constraints);
        assert!(index.repels(b, a));
        assert!(index.attracts(a, c));
        assert!(!index.repels(a, c));
        assert!(!index.attracts(a, b));
    }

    #[test]
    fn last_pin_wins() {
        let a = Uuid::new_v4();
        let constraints = [
            constraint(ConstraintRule::Pin { guest: a, table: 1 }),
            constraint(ConstraintRule::Pin { guest: a, table: 3 }),
        ];

        let index = ConstraintIndex::build(&constraints);
        assert_eq!(index.pinned_table(a), Some(3));
        assert_eq!(index.pinned_table(Uuid::new_v4()), None);
    }

    #[test]
    fn empty_index() {
        assert!(ConstraintIndex::build(std::iter::empty()).is_empty());
    }
}
