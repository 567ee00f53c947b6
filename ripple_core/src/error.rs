//! Engine error type.

use thiserror::Error;
use world_rules::RulesError;

/// Errors produced by the ripple engine and its outputs.
#[derive(Debug, Error)]
pub enum RippleError {
    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error("no scenario is loaded")]
    NoScenarioLoaded,

    #[error("no entity is selected")]
    NoSelection,

    #[error("scenario '{0}' has no entities")]
    EmptyScenario(String),

    #[error("the voting window has closed")]
    VoteWindowClosed,

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for RippleError {
    fn from(err: toml::de::Error) -> Self {
        RippleError::Config(err.to_string())
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, RippleError>;
