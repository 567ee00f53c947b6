//! Runtime configuration, loaded from TOML with environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::autoplay::AutoplayConfig;
use crate::bridge::BridgeConfig;
use crate::engine::EngineConfig;
use crate::error::{Result, RippleError};
use crate::grid::GridConfig;
use crate::llm::LlmConfig;
use crate::propagation::PropagationConfig;
use crate::voting::PerformanceConfig;

pub const ENV_SEED: &str = "RIPPLES_SEED";
pub const ENV_LLM_HOST: &str = "RIPPLES_LLM_HOST";
pub const ENV_LLM_MODEL: &str = "RIPPLES_LLM_MODEL";
pub const ENV_GRID_OUT: &str = "RIPPLES_GRID_OUT";

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub seed: Option<u64>,
    pub propagation_chance: f64,
    pub echo_attenuation: f32,
}

impl Default for EngineSection {
    fn default() -> Self {
        let propagation = PropagationConfig::default();
        Self {
            seed: None,
            propagation_chance: propagation.chance,
            echo_attenuation: propagation.attenuation,
        }
    }
}

/// `[grid]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSection {
    pub width: usize,
    pub height: usize,
    /// Live grid file, rewritten after every ripple when set.
    pub output: Option<PathBuf>,
}

impl Default for GridSection {
    fn default() -> Self {
        let grid = GridConfig::default();
        Self {
            width: grid.width,
            height: grid.height,
            output: None,
        }
    }
}

impl GridSection {
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            width: self.width,
            height: self.height,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RipplesConfig {
    pub engine: EngineSection,
    pub autoplay: AutoplayConfig,
    pub performance: PerformanceConfig,
    pub grid: GridSection,
    pub bridge: BridgeConfig,
    pub llm: LlmConfig,
}

impl RipplesConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given (defaults otherwise), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in practice).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup(ENV_SEED).filter(|v| !v.trim().is_empty()) {
            let seed = seed
                .trim()
                .parse::<u64>()
                .map_err(|_| RippleError::Config(format!("{ENV_SEED} must be an integer, got '{seed}'")))?;
            self.engine.seed = Some(seed);
        }
        if let Some(host) = lookup(ENV_LLM_HOST).filter(|v| !v.trim().is_empty()) {
            self.llm.host = host;
        }
        if let Some(model) = lookup(ENV_LLM_MODEL).filter(|v| !v.trim().is_empty()) {
            self.llm.model = model;
        }
        if let Some(path) = lookup(ENV_GRID_OUT).filter(|v| !v.trim().is_empty()) {
            self.grid.output = Some(PathBuf::from(path));
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.engine.propagation_chance) {
            return Err(RippleError::Config(format!(
                "engine.propagation_chance must be within 0..=1, got {}",
                self.engine.propagation_chance
            )));
        }
        if !(0.0..=1.0).contains(&self.engine.echo_attenuation) {
            return Err(RippleError::Config(format!(
                "engine.echo_attenuation must be within 0..=1, got {}",
                self.engine.echo_attenuation
            )));
        }
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(RippleError::Config("grid dimensions must be non-zero".to_string()));
        }
        if self.autoplay.interval_ms == 0 {
            return Err(RippleError::Config("autoplay.interval_ms must be non-zero".to_string()));
        }
        if self.performance.vote_window_ms == 0 {
            return Err(RippleError::Config(
                "performance.vote_window_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            seed: self.engine.seed,
            propagation: PropagationConfig {
                chance: self.engine.propagation_chance,
                attenuation: self.engine.echo_attenuation,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RipplesConfig::from_toml_str("").unwrap();
        assert_eq!(config, RipplesConfig::default());
        assert_eq!(config.autoplay.interval_ms, 3_000);
        assert_eq!(config.bridge.ports, [49160, 49161, 49162]);
        assert!(!config.llm.enabled);
        assert_eq!(config.engine_config().propagation.chance, 0.5);
    }

    #[test]
    fn test_partial_file() {
        let config = RipplesConfig::from_toml_str(
            r#"
            [engine]
            seed = 99
            propagation_chance = 0.8

            [grid]
            output = "out/live_grid.txt"

            [llm]
            enabled = true
            model = "mistral"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.seed, Some(99));
        assert_eq!(config.engine.echo_attenuation, 0.5);
        assert_eq!(config.grid.width, 16);
        assert_eq!(config.grid.output, Some(PathBuf::from("out/live_grid.txt")));
        assert!(config.llm.enabled);
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.host, "http://localhost:1234");
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let result = RipplesConfig::from_toml_str("[engine]\npropagation_chance = 1.5\n");
        assert!(matches!(result, Err(RippleError::Config(msg)) if msg.contains("propagation_chance")));
    }

    #[test]
    fn test_zero_vote_window_is_rejected() {
        let result = RipplesConfig::from_toml_str("[performance]\nvote_window_ms = 0\n");
        assert!(matches!(result, Err(RippleError::Config(msg)) if msg.contains("vote_window_ms")));
    }

    #[test]
    fn test_type_error_is_config_error() {
        let result = RipplesConfig::from_toml_str("[autoplay]\ninterval_ms = \"soon\"\n");
        assert!(matches!(result, Err(RippleError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_SEED, "7"),
            (ENV_LLM_HOST, "http://10.0.0.2:8080"),
            (ENV_GRID_OUT, "grid.txt"),
        ]
        .into_iter()
        .collect();

        let mut config = RipplesConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.engine.seed, Some(7));
        assert_eq!(config.llm.host, "http://10.0.0.2:8080");
        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.grid.output, Some(PathBuf::from("grid.txt")));
    }

    #[test]
    fn test_bad_seed_override() {
        let mut config = RipplesConfig::default();
        let result = config.apply_overrides(|key| (key == ENV_SEED).then(|| "tomorrow".to_string()));
        assert!(matches!(result, Err(RippleError::Config(_))));
    }
}
