//! Entity definitions for scenarios.

mod entity;
mod memory;

pub use entity::*;
pub use memory::*;

use serde::{Deserialize, Serialize};

/// Unique identifier for an entity within a scenario.
///
/// Entities are authored by hand, so ids are readable slugs
/// (`"hermit_crab"`) rather than generated values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create an entity ID from a slug.
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse classification of what an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Animate,
    Inanimate,
    Abstract,
    Weather,
    Geological,
    Temporal,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Animate => "animate",
            EntityKind::Inanimate => "inanimate",
            EntityKind::Abstract => "abstract",
            EntityKind::Weather => "weather",
            EntityKind::Geological => "geological",
            EntityKind::Temporal => "temporal",
        }
    }
}

/// Layout position. Authored scenarios may omit `z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
