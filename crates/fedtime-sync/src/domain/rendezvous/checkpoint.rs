//! Persisted form of the manager's sync points.

use crate::domain::sync::LoggableRecord;

/// One named list and its records, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListCheckpoint {
    /// List name
    pub name: String,
    /// Records of the list's points
    pub records: Vec<LoggableRecord>,
}

/// Snapshot of every list known to a manager.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncPntCheckpoint {
    /// Lists in name order
    pub lists: Vec<ListCheckpoint>,
}

impl SyncPntCheckpoint {
    /// Total number of records across lists.
    pub fn record_count(&self) -> usize {
        self.lists.iter().map(|l| l.records.len()).sum()
    }

    /// True if no list holds a record.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// `(list name, record)` pairs.
    pub fn records(&self) -> impl Iterator<Item = (&str, &LoggableRecord)> {
        self.lists
            .iter()
            .flat_map(|l| l.records.iter().map(move |r| (l.name.as_str(), r)))
    }
}
