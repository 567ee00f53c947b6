//! Latent library - the table of pre-authored passages.
//!
//! Passages are keyed by `(scenario, entity, vector)`. A key may hold several
//! passages; callers pick one with a cursor so repeated applications rotate
//! through them instead of repeating the first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::EntityId;
use crate::error::{Result, RulesError};
use crate::scenario::ScenarioId;
use crate::vectors::Vector;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct PassageKey {
    scenario: ScenarioId,
    entity: EntityId,
    vector: Vector,
}

/// Static lookup of authored passages.
#[derive(Debug, Clone, Default)]
pub struct LatentLibrary {
    passages: HashMap<PassageKey, Vec<String>>,
}

impl LatentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add passages for a key, appending to any already present.
    pub fn insert(
        &mut self,
        scenario: ScenarioId,
        entity: EntityId,
        vector: Vector,
        passages: impl IntoIterator<Item = String>,
    ) {
        self.passages
            .entry(PassageKey {
                scenario,
                entity,
                vector,
            })
            .or_default()
            .extend(passages);
    }

    /// All passages for a key. Empty if the key is unknown.
    pub fn passages(&self, scenario: &ScenarioId, entity: &EntityId, vector: Vector) -> &[String] {
        let key = PassageKey {
            scenario: scenario.clone(),
            entity: entity.clone(),
            vector,
        };
        self.passages.get(&key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Pick the passage at `cursor`, wrapping around the available passages.
    pub fn passage(
        &self,
        scenario: &ScenarioId,
        entity: &EntityId,
        vector: Vector,
        cursor: usize,
    ) -> Result<&str> {
        let passages = self.passages(scenario, entity, vector);
        if passages.is_empty() {
            return Err(RulesError::MissingPassage {
                scenario: scenario.clone(),
                entity: entity.clone(),
                vector,
            });
        }
        Ok(&passages[cursor % passages.len()])
    }

    /// Total number of keys with at least one passage.
    pub fn key_count(&self) -> usize {
        self.passages.values().filter(|p| !p.is_empty()).count()
    }

    /// Merge another library into this one.
    pub fn extend(&mut self, other: LatentLibrary) {
        for (key, passages) in other.passages {
            self.passages.entry(key).or_default().extend(passages);
        }
    }
}
