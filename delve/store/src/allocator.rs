//! Primary-key allocation against the singleton counter rows.

use delve_common::{CollectionKind, EntityKind, RecordId};

use crate::datastore::Datastore;
use crate::records::CounterRow;

impl Datastore {
    /// Allocates the next id for a kind. The counter row lives in the
    /// collection that owns the kind and is persisted with it on commit.
    pub fn next_id(&mut self, kind: EntityKind) -> RecordId {
        let collection = kind.collection();
        let id = self.counters_mut(collection).bump(kind);
        self.mark_dirty(collection);
        id
    }

    /// Last issued id for a kind.
    pub fn counter(&self, kind: EntityKind) -> RecordId {
        self.counters(kind.collection()).get(kind)
    }

    /// Migration override: forces a counter so post-import allocations
    /// never collide with imported rows.
    pub fn set_counter(&mut self, kind: EntityKind, value: RecordId) {
        let collection = kind.collection();
        self.counters_mut(collection).set(kind, value);
        self.mark_dirty(collection);
    }

    /// Raises a counter to `value` if it is currently lower.
    pub fn raise_counter(&mut self, kind: EntityKind, value: RecordId) {
        if value > self.counter(kind) {
            self.set_counter(kind, value);
        }
    }

    fn counters(&self, collection: CollectionKind) -> &CounterRow {
        match collection {
            CollectionKind::Hold => &self.hold.counters,
            CollectionKind::Player => &self.player.counters,
            CollectionKind::Text => &self.text.counters,
        }
    }

    fn counters_mut(&mut self, collection: CollectionKind) -> &mut CounterRow {
        match collection {
            CollectionKind::Hold => &mut self.hold.counters,
            CollectionKind::Player => &mut self.player.counters,
            CollectionKind::Text => &mut self.text.counters,
        }
    }
}
