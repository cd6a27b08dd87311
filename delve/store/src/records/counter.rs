use std::collections::BTreeMap;

use delve_common::{EntityKind, RecordId};
use serde::{Deserialize, Serialize};

use crate::schema::TableSpec;

/// Table description for the singleton counter row.
pub const COUNTERS_SPEC: TableSpec = TableSpec {
    name: "Counters",
    columns: &["Kind", "LastId"],
};

/// The singleton id-counter row of a collection. One entry per entity kind
/// the collection owns; a missing entry reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRow {
    last: BTreeMap<EntityKind, RecordId>,
}

impl CounterRow {
    /// Last issued id for a kind, zero if none was ever issued.
    pub fn get(&self, kind: EntityKind) -> RecordId {
        self.last.get(&kind).copied().unwrap_or(0)
    }

    /// Issues the next id for a kind.
    pub fn bump(&mut self, kind: EntityKind) -> RecordId {
        let next = self.get(kind) + 1;
        self.last.insert(kind, next);
        next
    }

    /// Overrides the counter, regardless of its current value.
    pub fn set(&mut self, kind: EntityKind, value: RecordId) {
        self.last.insert(kind, value);
    }

    /// Raises the counter to `value` if it is currently lower.
    pub fn raise_to(&mut self, kind: EntityKind, value: RecordId) {
        if value > self.get(kind) {
            self.set(kind, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_is_monotone() {
        let mut counters = CounterRow::default();
        assert_eq!(counters.get(EntityKind::Hold), 0);
        assert_eq!(counters.bump(EntityKind::Hold), 1);
        assert_eq!(counters.bump(EntityKind::Hold), 2);
        assert_eq!(counters.get(EntityKind::Hold), 2);
        assert_eq!(counters.get(EntityKind::Level), 0);
    }

    #[test]
    fn test_raise_to_never_lowers() {
        let mut counters = CounterRow::default();
        counters.set(EntityKind::Room, 40);
        counters.raise_to(EntityKind::Room, 25);
        assert_eq!(counters.get(EntityKind::Room), 40);
        counters.raise_to(EntityKind::Room, 41);
        assert_eq!(counters.get(EntityKind::Room), 41);
    }
}
