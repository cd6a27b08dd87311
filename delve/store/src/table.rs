//! In-memory table of records, id-keyed.
//!
//! Rows live in insertion order in a `Vec`; lookups are linear scans, which
//! is how these collections have always been accessed (no table here grows
//! past a few thousand rows).

use delve_common::RecordId;
use serde::{Deserialize, Serialize};

use crate::records::Record;

/// A typed table of rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Table<T: Record> {
    rows: Vec<T>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Record> Table<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut T> {
        self.rows.iter_mut().find(|row| row.id() == id)
    }

    /// Inserts a row. A row with the same id is replaced in place and
    /// returned; otherwise the row appends at the end.
    pub fn insert(&mut self, row: T) -> Option<T> {
        match self.rows.iter().position(|existing| existing.id() == row.id()) {
            Some(index) => Some(std::mem::replace(&mut self.rows[index], row)),
            None => {
                self.rows.push(row);
                None
            }
        }
    }

    pub fn remove(&mut self, id: RecordId) -> Option<T> {
        let index = self.rows.iter().position(|row| row.id() == id)?;
        Some(self.rows.remove(index))
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.rows.retain(keep);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.rows.iter_mut()
    }

    /// Largest id present, zero for an empty table.
    pub fn max_id(&self) -> RecordId {
        self.rows.iter().map(Record::id).max().unwrap_or(0)
    }
}

impl<'a, T: Record> IntoIterator for &'a Table<T> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
