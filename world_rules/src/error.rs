//! Errors raised while loading or querying scenario data.

use thiserror::Error;

use crate::entities::EntityId;
use crate::scenario::ScenarioId;
use crate::vectors::Vector;

/// Errors produced by the world rules.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("unknown scenario '{0}'")]
    UnknownScenario(ScenarioId),

    #[error("scenario '{0}' is defined more than once")]
    DuplicateScenario(ScenarioId),

    #[error("scenario '{scenario}' has no entity '{entity}'")]
    UnknownEntity {
        scenario: ScenarioId,
        entity: EntityId,
    },

    #[error("no passage for {vector} on '{entity}' in scenario '{scenario}'")]
    MissingPassage {
        scenario: ScenarioId,
        entity: EntityId,
        vector: Vector,
    },

    #[error("unknown vector '{0}' (expected goal, obstacle or shift)")]
    InvalidVector(String),

    #[error("scenario '{scenario}' defines entity '{entity}' more than once")]
    DuplicateEntity {
        scenario: ScenarioId,
        entity: EntityId,
    },

    #[error("scenario '{scenario}' links '{from}' to missing entity '{to}'")]
    DanglingNeighbor {
        scenario: ScenarioId,
        from: EntityId,
        to: EntityId,
    },

    #[error("scenario '{scenario}' lists '{entity}' as its own neighbor")]
    SelfNeighbor {
        scenario: ScenarioId,
        entity: EntityId,
    },

    #[error("entity '{entity}' starts with energy {energy}, above 100")]
    EnergyOutOfRange { entity: EntityId, energy: u8 },

    #[error("failed to parse scenario document: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result alias for world rules operations.
pub type Result<T> = std::result::Result<T, RulesError>;
