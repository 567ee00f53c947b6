//! Scenario catalog - the built-in scenarios and their passages.
//!
//! Each scenario is authored as a TOML document holding the scenario fields,
//! its entities, the adjacency map and the latent-library passages for that
//! scenario. The built-in documents are embedded at compile time.

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::entities::{Entity, EntityId};
use crate::error::{Result, RulesError};
use crate::library::LatentLibrary;
use crate::scenario::{EnvironmentFactors, Scenario, ScenarioId};
use crate::vectors::Vector;

const BUILTIN_DOCUMENTS: [&str; 3] = [
    include_str!("scenarios/tidepool.toml"),
    include_str!("scenarios/lighthouse.toml"),
    include_str!("scenarios/orchard.toml"),
];

/// On-disk shape of a scenario document.
#[derive(Debug, Deserialize)]
struct ScenarioDocument {
    id: ScenarioId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    physics: String,
    #[serde(default)]
    baseline: String,
    #[serde(default)]
    environment: EnvironmentFactors,
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    adjacency: BTreeMap<EntityId, Vec<EntityId>>,
    #[serde(default)]
    passages: Vec<PassageDocument>,
}

#[derive(Debug, Deserialize)]
struct PassageDocument {
    entity: EntityId,
    vector: Vector,
    text: Vec<String>,
}

/// All known scenarios plus the latent library that narrates them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    scenarios: BTreeMap<ScenarioId, Scenario>,
    library: LatentLibrary,
}

impl Catalog {
    /// Load the scenarios that ship with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_documents(BUILTIN_DOCUMENTS)
    }

    /// Parse and validate a set of TOML scenario documents.
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut catalog = Self::default();
        for source in documents {
            catalog.add_document(source)?;
        }
        Ok(catalog)
    }

    /// Parse one document and add its scenario and passages.
    ///
    /// A scenario id that is already in the catalog is rejected.
    pub fn add_document(&mut self, source: &str) -> Result<ScenarioId> {
        let document: ScenarioDocument = toml::from_str(source)?;
        if self.scenarios.contains_key(&document.id) {
            return Err(RulesError::DuplicateScenario(document.id));
        }

        let mut scenario = Scenario {
            id: document.id,
            name: document.name,
            description: document.description,
            physics: document.physics,
            baseline: document.baseline,
            entities: document.entities,
            adjacency: document.adjacency,
            environment: document.environment,
        };
        scenario.validate()?;
        scenario.link_adjacency();

        for passage in document.passages {
            scenario.require_entity(&passage.entity)?;
            self.library
                .insert(scenario.id.clone(), passage.entity, passage.vector, passage.text);
        }

        for (from, to) in scenario.asymmetric_edges() {
            debug!(scenario = %scenario.id, %from, %to, "one-way adjacency");
        }

        let id = scenario.id.clone();
        debug!(scenario = %id, entities = scenario.entities.len(), "scenario loaded into catalog");
        self.scenarios.insert(id.clone(), scenario);
        Ok(id)
    }

    /// Get a scenario by ID.
    pub fn scenario(&self, id: &ScenarioId) -> Result<&Scenario> {
        self.scenarios
            .get(id)
            .ok_or_else(|| RulesError::UnknownScenario(id.clone()))
    }

    pub fn scenario_ids(&self) -> impl Iterator<Item = &ScenarioId> {
        self.scenarios.keys()
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.values()
    }

    pub fn library(&self) -> &LatentLibrary {
        &self.library
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        let ids: Vec<_> = catalog.scenario_ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["lighthouse", "orchard", "tidepool"]);
    }

    #[test]
    fn test_every_entity_has_every_vector() {
        let catalog = Catalog::builtin().unwrap();
        for scenario in catalog.scenarios() {
            for entity in &scenario.entities {
                for vector in Vector::ALL {
                    assert!(
                        catalog
                            .library()
                            .passage(&scenario.id, &entity.id, vector, 0)
                            .is_ok(),
                        "{} / {} / {} has no passage",
                        scenario.id,
                        entity.id,
                        vector
                    );
                }
            }
        }
    }

    #[test]
    fn test_builtin_adjacency_is_linked() {
        let catalog = Catalog::builtin().unwrap();
        let tidepool = catalog.scenario(&"tidepool".into()).unwrap();
        let anemone = tidepool.entity(&"anemone".into()).unwrap();
        assert_eq!(anemone.adjacent.len(), 3);
        assert!(!tidepool.asymmetric_edges().is_empty());
    }

    #[test]
    fn test_unknown_scenario() {
        let catalog = Catalog::builtin().unwrap();
        assert!(matches!(
            catalog.scenario(&"atlantis".into()),
            Err(RulesError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_passage_for_unknown_entity_is_rejected() {
        let source = r#"
            id = "tiny"
            name = "Tiny"

            [[entities]]
            id = "pebble"
            name = "Pebble"

            [[passages]]
            entity = "boulder"
            vector = "goal"
            text = ["It rolls."]
        "#;

        assert!(matches!(
            Catalog::from_documents([source]),
            Err(RulesError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            Catalog::from_documents(["id = "]),
            Err(RulesError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_scenario_is_rejected() {
        let mut catalog = Catalog::builtin().unwrap();
        let before = catalog
            .library()
            .passages(&"tidepool".into(), &"kelp".into(), Vector::Goal)
            .to_vec();

        let result = catalog.add_document(BUILTIN_DOCUMENTS[0]);

        assert!(matches!(
            result,
            Err(RulesError::DuplicateScenario(id)) if id.as_str() == "tidepool"
        ));
        assert_eq!(
            catalog
                .library()
                .passages(&"tidepool".into(), &"kelp".into(), Vector::Goal),
            before.as_slice()
        );
    }

    #[test]
    fn test_self_loop_document_is_rejected() {
        let source = r#"
            id = "loop"
            name = "Loop"

            [[entities]]
            id = "ouroboros"
            name = "The Ouroboros"

            [adjacency]
            ouroboros = ["ouroboros"]
        "#;

        assert!(matches!(
            Catalog::from_documents([source]),
            Err(RulesError::SelfNeighbor { .. })
        ));
    }

    #[test]
    fn test_authored_memory_is_capped() {
        let memory: Vec<String> = (1..=12)
            .map(|tick| format!(r#"{{ tick = {tick}, vector = "shift" }}"#))
            .collect();
        let source = format!(
            r#"
            id = "remembering"
            name = "Remembering"

            [[entities]]
            id = "stone"
            name = "The Stone"
            memory = [{}]
            "#,
            memory.join(", ")
        );

        let catalog = Catalog::from_documents([source.as_str()]).unwrap();
        let stone = catalog
            .scenario(&"remembering".into())
            .unwrap()
            .entity(&"stone".into())
            .unwrap();

        assert_eq!(stone.memory.len(), crate::entities::MEMORY_CAPACITY);
        assert_eq!(stone.memory.latest().map(|m| m.tick), Some(12));
    }
}
