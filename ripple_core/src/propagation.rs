//! Propagation - whether a ripple spreads to the source's neighbors.
//!
//! Each authored neighbor gets an independent biased coin flip. Neighbors
//! that pass receive an echo: the source vector's energy delta scaled down
//! by the attenuation factor.

use rand::Rng;
use serde::{Deserialize, Serialize};
use world_rules::{EntityId, Vector};

/// Configuration for propagation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Probability (0.0-1.0) that a given neighbor receives an echo.
    pub chance: f64,
    /// Fraction (0.0-1.0) of the source delta carried by an echo.
    pub attenuation: f32,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            chance: 0.5,
            attenuation: 0.5,
        }
    }
}

/// Decides which neighbors a ripple reaches.
#[derive(Debug, Clone)]
pub struct Propagator {
    config: PropagationConfig,
}

impl Propagator {
    /// Create a propagator, clamping the config into range.
    pub fn new(config: PropagationConfig) -> Self {
        Self {
            config: PropagationConfig {
                chance: config.chance.clamp(0.0, 1.0),
                attenuation: config.attenuation.clamp(0.0, 1.0),
            },
        }
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Flip a coin for each neighbor, returning those that pass in order.
    pub fn select<R: Rng>(&self, neighbors: &[EntityId], rng: &mut R) -> Vec<EntityId> {
        neighbors
            .iter()
            .filter(|_| rng.random_bool(self.config.chance))
            .cloned()
            .collect()
    }

    /// Energy delta an echo of `vector` carries.
    pub fn echo_delta(&self, vector: Vector) -> i32 {
        (vector.energy_delta() as f32 * self.config.attenuation).round() as i32
    }
}

impl Default for Propagator {
    fn default() -> Self {
        Self::new(PropagationConfig::default())
    }
}
