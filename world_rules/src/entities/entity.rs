//! Entity definitions.

use serde::{Deserialize, Serialize};

use super::{EntityId, EntityKind, MemoryEntry, MemoryLog, Position};
use crate::vectors::Vector;

/// Upper bound of an entity's energy.
pub const MAX_ENERGY: u8 = 100;

/// State label given to a neighbor reached by an echo.
pub const ECHO_STATE: &str = "stirred";

fn default_state() -> String {
    "still".to_string()
}

fn default_energy() -> u8 {
    50
}

/// A scenario entity: a creature, object, idea or force that can receive vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub position: Position,

    // Runtime-mutable fields
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default = "default_energy")]
    pub energy: u8,
    #[serde(default)]
    pub memory: MemoryLog,
    /// Vectors received so far, echoes included. Unlike `memory` this
    /// never wraps, so it can drive passage rotation.
    #[serde(default)]
    pub received: u64,

    /// Filled from the scenario adjacency map when the scenario is linked.
    #[serde(default)]
    pub adjacent: Vec<EntityId>,
}

impl Entity {
    /// Create a new entity with the given id and display name.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind: EntityKind::default(),
            position: Position::default(),
            state: default_state(),
            energy: default_energy(),
            memory: MemoryLog::new(),
            received: 0,
            adjacent: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set the starting energy, clamped to the valid range.
    pub fn with_energy(mut self, energy: u8) -> Self {
        self.energy = energy.min(MAX_ENERGY);
        self
    }

    /// Shift energy by `delta`, clamping to `[0, 100]`. Returns the new energy.
    pub fn adjust_energy(&mut self, delta: i32) -> u8 {
        let next = (i32::from(self.energy) + delta).clamp(0, i32::from(MAX_ENERGY));
        self.energy = next as u8;
        self.energy
    }

    /// Append to the bounded memory log.
    pub fn remember(&mut self, entry: MemoryEntry) {
        self.received += 1;
        self.memory.push(entry);
    }

    /// Apply a vector directly to this entity.
    pub fn apply_vector(&mut self, vector: Vector, tick: u64) -> u8 {
        let energy = self.adjust_energy(vector.energy_delta());
        self.state = vector.state_label().to_string();
        self.remember(MemoryEntry {
            tick,
            vector,
            echo: false,
        });
        energy
    }

    /// Receive an attenuated echo of a vector applied to a neighbor.
    pub fn absorb_echo(&mut self, vector: Vector, delta: i32, tick: u64) -> u8 {
        let energy = self.adjust_energy(delta);
        self.state = ECHO_STATE.to_string();
        self.remember(MemoryEntry {
            tick,
            vector,
            echo: true,
        });
        energy
    }

    /// Check if this entity lists `other` as a neighbor.
    pub fn is_adjacent_to(&self, other: &EntityId) -> bool {
        self.adjacent.contains(other)
    }
}
