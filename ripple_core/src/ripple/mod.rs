//! Ripples - the record of one vector application and its echoes.

mod audit;

pub use audit::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use world_rules::{EntityId, ScenarioId, Vector};

/// Unique identifier for ripples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RippleId(pub Uuid);

impl RippleId {
    /// Create a new random ripple ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RippleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RippleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A secondary effect on a neighbor of the source entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub target: EntityId,
    /// Energy change actually requested for the target.
    pub delta: i32,
    pub energy_after: u8,
}

/// The application of a vector to an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ripple {
    pub id: RippleId,
    pub tick: u64,
    pub scenario: ScenarioId,
    pub source: EntityId,
    pub vector: Vector,
    /// The narrated text for this application.
    pub text: String,
    pub energy_after: u8,
    /// Neighbors the ripple propagated to, in authored order.
    pub propagated: Vec<Echo>,
}

impl Ripple {
    /// Ids of every entity that received an echo.
    pub fn echo_targets(&self) -> impl Iterator<Item = &EntityId> {
        self.propagated.iter().map(|e| &e.target)
    }

    pub fn did_propagate(&self) -> bool {
        !self.propagated.is_empty()
    }
}
