//! Who has already sat with whom during one multi-round run.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// Per-guest set of previous tablemates. Built fresh for every run.
#[derive(Debug, Clone, Default)]
pub struct TablemateHistory {
    seen: HashMap<Uuid, HashSet<Uuid>>,
}

impl TablemateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every pair of co-occupants at each table as having met.
    pub fn record_round<T: AsRef<[Uuid]>>(&mut self, tables: &[T]) {
        for table in tables {
            let table = table.as_ref();
            for (i, a) in table.iter().enumerate() {
                for b in &table[i + 1..] {
                    self.seen.entry(*a).or_default().insert(*b);
                    self.seen.entry(*b).or_default().insert(*a);
                }
            }
        }
    }

    pub fn have_met(&self, a: Uuid, b: Uuid) -> bool {
        self.seen.get(&a).is_some_and(|mates| mates.contains(&b))
    }

    /// Number of `others` that `guest` has already sat with.
    pub fn repeats(&self, guest: Uuid, others: impl IntoIterator<Item = Uuid>) -> usize {
        others
            .into_iter()
            .filter(|other| self.have_met(guest, *other))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_pairs_symmetrically() {
        let [a, b, c, d] = [(); 4].map(|()| Uuid::new_v4());
        let mut history = TablemateHistory::new();

        history.record_round(&[vec![a, b, c], vec![d]]);

        assert!(history.have_met(a, c));
        assert!(history.have_met(c, a));
        assert!(!history.have_met(a, d));
        assert!(!history.have_met(a, a));
        assert_eq!(history.repeats(b, [a, c, d]), 2);
        assert_eq!(history.repeats(d, [a, b]), 0);
    }

    #[test]
    fn accumulates_across_rounds() {
        let [a, b, c] = [(); 3].map(|()| Uuid::new_v4());
        let mut history = TablemateHistory::new();

        history.record_round(&[vec![a, b], vec![c]]);
        history.record_round(&[vec![a, c], vec![b]]);

        assert_eq!(history.repeats(a, [b, c]), 2);
        assert!(!history.have_met(b, c));
    }
}
