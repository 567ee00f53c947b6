//! Audit log - a bounded, newest-first history of ripples.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use world_rules::{EntityId, ScenarioId, Vector};

use super::Ripple;

/// Maximum number of entries the audit log keeps.
pub const AUDIT_CAPACITY: usize = 50;

/// A denormalized log line derived from a ripple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub tick: u64,
    pub scenario: ScenarioId,
    pub entity: EntityId,
    /// Display name of the source entity at the time of the ripple.
    pub entity_name: String,
    pub vector: Vector,
    pub text: String,
    pub echoes: Vec<EntityId>,
}

impl AuditEntry {
    /// Build an entry from a ripple and the source's display name.
    pub fn from_ripple(ripple: &Ripple, entity_name: impl Into<String>) -> Self {
        Self {
            tick: ripple.tick,
            scenario: ripple.scenario.clone(),
            entity: ripple.source.clone(),
            entity_name: entity_name.into(),
            vector: ripple.vector,
            text: ripple.text.clone(),
            echoes: ripple.echo_targets().cloned().collect(),
        }
    }

    /// Single-line rendering, e.g. `[t0003] GOAL -> The Kelp: ... (echo: tide)`.
    pub fn line(&self) -> String {
        let mut line = format!(
            "[t{:04}] {} -> {}: {}",
            self.tick, self.vector, self.entity_name, self.text
        );
        if !self.echoes.is_empty() {
            let targets: Vec<_> = self.echoes.iter().map(|e| e.as_str()).collect();
            line.push_str(&format!(" (echo: {})", targets.join(", ")));
        }
        line
    }
}

/// Newest-first log capped at [`AUDIT_CAPACITY`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry at the front, dropping the oldest past capacity.
    pub fn record(&mut self, entry: AuditEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(AUDIT_CAPACITY);
    }

    pub fn latest(&self) -> Option<&AuditEntry> {
        self.entries.front()
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
