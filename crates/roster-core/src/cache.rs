//! Record cache
//!
//! The controller's copy of the last successful listing. Replaced wholesale,
//! never edited in place; views only ever get a shared read-only snapshot.

use indexmap::IndexMap;
use roster_schema::{StudentId, StudentRecord};

/// Id-keyed records in store order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCache {
    records: IndexMap<StudentId, StudentRecord>,
}

impl RecordCache {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &StudentId) -> Option<&StudentRecord> {
        self.records.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &StudentId) -> bool {
        self.records.contains_key(id)
    }

    /// Records in store order
    pub fn iter(&self) -> impl Iterator<Item = &StudentRecord> {
        self.records.values()
    }

    /// Record whose id is `needle` or uniquely starts with it
    #[must_use]
    pub fn find(&self, needle: &str) -> Option<&StudentRecord> {
        if needle.is_empty() {
            return None;
        }
        if let Some(exact) = self.records.get(&StudentId::new(needle)) {
            return Some(exact);
        }
        let mut matches = self
            .records
            .values()
            .filter(|r| r.id.as_str().starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}

impl FromIterator<StudentRecord> for RecordCache {
    fn from_iter<I: IntoIterator<Item = StudentRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }
}
