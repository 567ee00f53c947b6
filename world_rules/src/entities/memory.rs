//! Bounded memory of the vectors an entity has experienced.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::vectors::Vector;

/// Number of vector applications an entity remembers.
pub const MEMORY_CAPACITY: usize = 10;

/// A single remembered vector application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub tick: u64,
    pub vector: Vector,
    /// True when the vector reached this entity through propagation.
    #[serde(default)]
    pub echo: bool,
}

/// Ring of the most recent applications, oldest first.
///
/// Deserialized entries go through [`MemoryLog::push`], so an authored log
/// longer than [`MEMORY_CAPACITY`] keeps only its newest entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<MemoryEntry>", into = "Vec<MemoryEntry>")]
pub struct MemoryLog {
    entries: VecDeque<MemoryEntry>,
}

impl From<Vec<MemoryEntry>> for MemoryLog {
    fn from(entries: Vec<MemoryEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.push(entry);
        }
        log
    }
}

impl From<MemoryLog> for Vec<MemoryEntry> {
    fn from(log: MemoryLog) -> Self {
        log.entries.into()
    }
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, dropping the oldest once capacity is reached.
    pub fn push(&mut self, entry: MemoryEntry) {
        while self.entries.len() >= MEMORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&MemoryEntry> {
        self.entries.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &MemoryEntry> {
        self.entries.iter()
    }

    /// The last `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&MemoryEntry> {
        self.entries.iter().rev().take(n).collect()
    }
}
