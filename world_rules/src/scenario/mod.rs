//! Scenario definitions - a bounded little world of entities and their links.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::entities::{Entity, EntityId};
use crate::error::{Result, RulesError};

/// Unique identifier for scenarios.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(pub String);

impl ScenarioId {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScenarioId {
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Ambient conditions of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentFactors {
    /// Temperature in Celsius.
    pub temperature: f32,
    /// 0.0 (arid) to 1.0 (saturated).
    pub humidity: f32,
    /// 0.0 (dark) to 1.0 (glare).
    pub light: f32,
    /// 0.0 (silent) to 1.0 (roaring).
    pub noise: f32,
}

impl Default for EnvironmentFactors {
    fn default() -> Self {
        Self {
            temperature: 15.0,
            humidity: 0.5,
            light: 0.5,
            noise: 0.2,
        }
    }
}

/// A scenario: entities, their authored adjacency, and the ambient setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    pub description: String,
    /// Boundary/physics tag, e.g. "tidal" or "enclosed".
    pub physics: String,
    /// Narrative shown before any vector has been applied.
    pub baseline: String,
    pub entities: Vec<Entity>,
    /// Entity -> neighbors. Not guaranteed to be symmetric.
    #[serde(default)]
    pub adjacency: BTreeMap<EntityId, Vec<EntityId>>,
    #[serde(default)]
    pub environment: EnvironmentFactors,
}

impl Scenario {
    /// Get entity by ID.
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    /// Get mutable entity by ID.
    pub fn entity_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| &e.id == id)
    }

    /// Like [`Scenario::entity`], but a missing entity is an error.
    pub fn require_entity(&self, id: &EntityId) -> Result<&Entity> {
        self.entity(id).ok_or_else(|| RulesError::UnknownEntity {
            scenario: self.id.clone(),
            entity: id.clone(),
        })
    }

    /// Authored neighbors of an entity, in authored order.
    pub fn neighbors(&self, id: &EntityId) -> &[EntityId] {
        self.adjacency.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter().map(|e| &e.id)
    }

    /// Check that entity ids are unique, energies are in range, and every
    /// adjacency reference names another real entity.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(&entity.id) {
                return Err(RulesError::DuplicateEntity {
                    scenario: self.id.clone(),
                    entity: entity.id.clone(),
                });
            }
            if entity.energy > crate::entities::MAX_ENERGY {
                return Err(RulesError::EnergyOutOfRange {
                    entity: entity.id.clone(),
                    energy: entity.energy,
                });
            }
        }

        for (from, neighbors) in &self.adjacency {
            if !seen.contains(from) {
                return Err(RulesError::UnknownEntity {
                    scenario: self.id.clone(),
                    entity: from.clone(),
                });
            }
            for to in neighbors {
                if to == from {
                    return Err(RulesError::SelfNeighbor {
                        scenario: self.id.clone(),
                        entity: from.clone(),
                    });
                }
                if !seen.contains(to) {
                    return Err(RulesError::DanglingNeighbor {
                        scenario: self.id.clone(),
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Copy the adjacency map onto each entity's `adjacent` list.
    pub fn link_adjacency(&mut self) {
        for entity in &mut self.entities {
            entity.adjacent = self.adjacency.get(&entity.id).cloned().unwrap_or_default();
        }
    }

    /// Edges `(a, b)` where `a` lists `b` but `b` does not list `a`.
    pub fn asymmetric_edges(&self) -> Vec<(EntityId, EntityId)> {
        let mut edges = Vec::new();
        for (from, neighbors) in &self.adjacency {
            for to in neighbors {
                if !self.neighbors(to).contains(from) {
                    edges.push((from.clone(), to.clone()));
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Entity;

    fn scenario() -> Scenario {
        let mut adjacency = BTreeMap::new();
        adjacency.insert(EntityId::from("a"), vec![EntityId::from("b")]);
        adjacency.insert(
            EntityId::from("b"),
            vec![EntityId::from("a"), EntityId::from("c")],
        );

        Scenario {
            id: ScenarioId::from("test"),
            name: "Test".to_string(),
            description: String::new(),
            physics: "open".to_string(),
            baseline: "Nothing moves.".to_string(),
            entities: vec![
                Entity::new("a", "A"),
                Entity::new("b", "B"),
                Entity::new("c", "C"),
            ],
            adjacency,
            environment: EnvironmentFactors::default(),
        }
    }

    #[test]
    fn test_neighbors() {
        let scenario = scenario();
        assert_eq!(scenario.neighbors(&"b".into()).len(), 2);
        assert!(scenario.neighbors(&"c".into()).is_empty());
    }

    #[test]
    fn test_validate_ok() {
        assert!(scenario().validate().is_ok());
    }

    #[test]
    fn test_validate_dangling_neighbor() {
        let mut scenario = scenario();
        scenario
            .adjacency
            .insert(EntityId::from("c"), vec![EntityId::from("ghost")]);

        assert!(matches!(
            scenario.validate(),
            Err(RulesError::DanglingNeighbor { to, .. }) if to.as_str() == "ghost"
        ));
    }

    #[test]
    fn test_validate_duplicate_entity() {
        let mut scenario = scenario();
        scenario.entities.push(Entity::new("a", "Another A"));
        assert!(matches!(
            scenario.validate(),
            Err(RulesError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn test_validate_self_neighbor() {
        let mut scenario = scenario();
        scenario
            .adjacency
            .insert(EntityId::from("c"), vec![EntityId::from("b"), EntityId::from("c")]);

        assert!(matches!(
            scenario.validate(),
            Err(RulesError::SelfNeighbor { entity, .. }) if entity.as_str() == "c"
        ));
    }

    #[test]
    fn test_asymmetric_edges() {
        let scenario = scenario();
        let edges = scenario.asymmetric_edges();
        assert_eq!(edges, vec![(EntityId::from("b"), EntityId::from("c"))]);
    }

    #[test]
    fn test_link_adjacency() {
        let mut scenario = scenario();
        scenario.link_adjacency();
        let b = scenario.entity(&"b".into()).unwrap();
        assert!(b.is_adjacent_to(&"c".into()));
        assert!(scenario.entity(&"c".into()).unwrap().adjacent.is_empty());
    }
}
