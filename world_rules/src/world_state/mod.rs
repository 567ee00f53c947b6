//! World state management - the mutable session over one scenario.

use serde::{Deserialize, Serialize};

use crate::entities::{Entity, EntityId};
use crate::error::{Result, RulesError};
use crate::scenario::Scenario;

/// The state of a running scenario at any point in time.
///
/// Holds a private working copy of the scenario: only entity `state`,
/// `energy` and `memory` change while it runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    scenario: Scenario,
    selected: Option<EntityId>,
    tick: u64,
}

impl WorldState {
    /// Start a fresh session over a copy of `scenario`.
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            selected: None,
            tick: 0,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance the tick counter by one and return the new tick.
    pub fn advance_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Point the selection at an entity. Scenario data is left untouched.
    pub fn select(&mut self, id: &EntityId) -> Result<()> {
        if self.scenario.entity(id).is_none() {
            return Err(RulesError::UnknownEntity {
                scenario: self.scenario.id.clone(),
                entity: id.clone(),
            });
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    pub fn selected_entity(&self) -> Option<&Entity> {
        self.selected.as_ref().and_then(|id| self.scenario.entity(id))
    }

    /// Get entity by ID.
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.scenario.entity(id)
    }

    /// Get mutable entity by ID.
    pub fn entity_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.scenario.entity_mut(id)
    }

    /// Like [`WorldState::entity_mut`], but a missing entity is an error.
    pub fn require_entity_mut(&mut self, id: &EntityId) -> Result<&mut Entity> {
        let scenario = self.scenario.id.clone();
        self.scenario
            .entity_mut(id)
            .ok_or_else(|| RulesError::UnknownEntity {
                scenario,
                entity: id.clone(),
            })
    }
}
