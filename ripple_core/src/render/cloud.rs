//! Point cloud - a 3D scatter of each entity for a spatial view.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use world_rules::{Entity, EntityId, EntityKind};

use super::{Frame, Renderer};
use crate::grid::name_hash;

/// One point in the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudPoint {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub size: f32,
}

/// The points belonging to one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCloud {
    pub entity: EntityId,
    pub center: [f32; 3],
    pub highlighted: bool,
    pub points: Vec<CloudPoint>,
}

/// A full point cloud for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub tick: u64,
    pub clouds: Vec<EntityCloud>,
}

impl PointCloud {
    pub fn point_count(&self) -> usize {
        self.clouds.iter().map(|c| c.points.len()).sum()
    }
}

fn kind_color(kind: EntityKind) -> [f32; 3] {
    match kind {
        EntityKind::Animate => [0.45, 0.85, 0.55],
        EntityKind::Inanimate => [0.75, 0.75, 0.8],
        EntityKind::Abstract => [0.7, 0.55, 0.95],
        EntityKind::Weather => [0.55, 0.75, 0.95],
        EntityKind::Geological => [0.65, 0.5, 0.4],
        EntityKind::Temporal => [0.95, 0.8, 0.45],
    }
}

/// Scatters points around each entity.
///
/// The layout is seeded from the entity id, so a cloud only moves when the
/// entity's energy changes.
#[derive(Debug, Clone)]
pub struct PointCloudRenderer {
    base_points: usize,
    base_radius: f32,
}

impl PointCloudRenderer {
    pub fn new(base_points: usize, base_radius: f32) -> Self {
        Self {
            base_points,
            base_radius,
        }
    }

    /// Build the cloud for a frame.
    pub fn cloud(&self, frame: &Frame<'_>) -> PointCloud {
        PointCloud {
            tick: frame.tick,
            clouds: frame
                .scenario
                .entities
                .iter()
                .map(|entity| {
                    let highlighted = frame.is_selected(&entity.id) || frame.is_echo_target(&entity.id);
                    self.entity_cloud(entity, highlighted)
                })
                .collect(),
        }
    }

    fn entity_cloud(&self, entity: &Entity, highlighted: bool) -> EntityCloud {
        let energy = f32::from(entity.energy) / 100.0;
        let count = self.base_points + usize::from(entity.energy) / 5;
        let radius = self.base_radius * (0.5 + energy);
        let center = [entity.position.x, entity.position.y, entity.position.z];

        let mut color = kind_color(entity.kind);
        if highlighted {
            for channel in &mut color {
                *channel = (*channel * 1.3).min(1.0);
            }
        }

        let mut rng = Pcg32::seed_from_u64(u64::from(name_hash(entity.id.as_str()).unsigned_abs()));
        let points = (0..count)
            .map(|_| {
                let offset = [
                    rng.random_range(-1.0f32..=1.0),
                    rng.random_range(-1.0f32..=1.0),
                    rng.random_range(-1.0f32..=1.0),
                ];
                CloudPoint {
                    position: [
                        center[0] + offset[0] * radius,
                        center[1] + offset[1] * radius,
                        center[2] + offset[2] * radius,
                    ],
                    color,
                    size: if highlighted { 2.0 } else { 1.0 },
                }
            })
            .collect();

        EntityCloud {
            entity: entity.id.clone(),
            center,
            highlighted,
            points,
        }
    }
}

impl Default for PointCloudRenderer {
    fn default() -> Self {
        Self::new(8, 1.0)
    }
}

impl Renderer for PointCloudRenderer {
    fn name(&self) -> &'static str {
        "pointcloud"
    }

    /// JSON encoding of [`PointCloudRenderer::cloud`].
    fn render(&self, frame: &Frame<'_>) -> String {
        serde_json::to_string(&self.cloud(frame)).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_rules::{Catalog, Vector};

    #[test]
    fn test_cloud_is_deterministic_and_grows_with_energy() {
        let catalog = Catalog::builtin().unwrap();
        let mut scenario = catalog.scenario(&"tidepool".into()).unwrap().clone();
        let renderer = PointCloudRenderer::default();

        let frame = Frame {
            scenario: &scenario,
            selected: None,
            last_ripple: None,
            tick: 0,
        };
        let first = renderer.cloud(&frame);
        assert_eq!(first, renderer.cloud(&frame));
        let before = first.clouds.iter().find(|c| c.entity.as_str() == "fog").unwrap().points.len();

        scenario
            .entity_mut(&"fog".into())
            .unwrap()
            .apply_vector(Vector::Goal, 1);
        let frame = Frame {
            scenario: &scenario,
            selected: None,
            last_ripple: None,
            tick: 1,
        };
        let after_cloud = renderer.cloud(&frame);
        let after = after_cloud
            .clouds
            .iter()
            .find(|c| c.entity.as_str() == "fog")
            .unwrap()
            .points
            .len();

        assert_eq!(before, 18);
        assert_eq!(after, 21);
    }

    #[test]
    fn test_selected_entity_is_highlighted() {
        let catalog = Catalog::builtin().unwrap();
        let scenario = catalog.scenario(&"orchard".into()).unwrap();
        let well = "well".into();
        let frame = Frame {
            scenario,
            selected: Some(&well),
            last_ripple: None,
            tick: 0,
        };

        let cloud = PointCloudRenderer::default().cloud(&frame);
        let highlighted: Vec<_> = cloud
            .clouds
            .iter()
            .filter(|c| c.highlighted)
            .map(|c| c.entity.as_str())
            .collect();
        assert_eq!(highlighted, vec!["well"]);
    }

    #[test]
    fn test_render_is_json() {
        let catalog = Catalog::builtin().unwrap();
        let scenario = catalog.scenario(&"lighthouse".into()).unwrap();
        let frame = Frame {
            scenario,
            selected: None,
            last_ripple: None,
            tick: 0,
        };

        let json = PointCloudRenderer::default().render(&frame);
        let parsed: PointCloud = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.clouds.len(), scenario.entities.len());
    }
}
