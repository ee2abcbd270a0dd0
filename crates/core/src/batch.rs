use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// Identifier of one batch inside the source archive.
///
/// Derived from the sub-archive entry name (`"117.zip"` -> `"117"`). Batches
/// order by numeric value; names that are not numbers sort after every
/// numeric one, by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchId {
    name: String,
    ordinal: Option<u64>,
}

impl BatchId {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let ordinal = name.trim().parse().ok();
        Self { name, ordinal }
    }

    /// Batch id from an archive entry name: directories and everything from
    /// the first `.` on are dropped.
    pub fn from_entry_name(entry: &str) -> Self {
        let base = entry.rsplit('/').next().unwrap_or(entry);
        let stem = base.split('.').next().unwrap_or(base);
        Self::new(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn ordinal(&self) -> Option<u64> {
        self.ordinal
    }
}

impl Ord for BatchId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.ordinal, other.ordinal) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.name.cmp(&other.name)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.name.cmp(&other.name),
        }
    }
}

impl PartialOrd for BatchId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for BatchId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}
