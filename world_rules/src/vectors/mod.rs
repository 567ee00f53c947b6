//! Narrative vectors: the three operators a user can inject into an entity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RulesError;

/// A narrative operator applied to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vector {
    /// Something the entity reaches toward.
    Goal,
    /// Something that stands in the entity's way.
    Obstacle,
    /// A change of footing, perspective or form.
    Shift,
}

impl Vector {
    /// All vectors in canonical order.
    pub const ALL: [Vector; 3] = [Vector::Goal, Vector::Obstacle, Vector::Shift];

    /// Energy change applied to the entity that receives the vector.
    pub fn energy_delta(&self) -> i32 {
        match self {
            Vector::Goal => 15,
            Vector::Obstacle => -20,
            Vector::Shift => 5,
        }
    }

    /// The state label an entity takes on after receiving this vector.
    pub fn state_label(&self) -> &'static str {
        match self {
            Vector::Goal => "yearning",
            Vector::Obstacle => "thwarted",
            Vector::Shift => "changed",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Vector::Goal => "goal",
            Vector::Obstacle => "obstacle",
            Vector::Shift => "shift",
        }
    }

    /// Position in [`Vector::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Vector::Goal => 0,
            Vector::Obstacle => 1,
            Vector::Shift => 2,
        }
    }
}

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.as_str().to_uppercase())
    }
}

impl FromStr for Vector {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "goal" => Ok(Vector::Goal),
            "obstacle" => Ok(Vector::Obstacle),
            "shift" => Ok(Vector::Shift),
            _ => Err(RulesError::InvalidVector(s.to_string())),
        }
    }
}
