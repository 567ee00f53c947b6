//! Prompt assembly for generated narration.

use serde::{Deserialize, Serialize};
use world_rules::{EnvironmentFactors, Vector};

use super::NarrationRequest;

/// How many memory entries are shown to the model.
const PROMPT_MEMORY_DEPTH: usize = 5;

/// The context assembled for one narration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptContext {
    pub scenario_name: String,
    pub physics: String,
    pub baseline: String,
    pub environment: EnvironmentFactors,
    pub entity: EntityContext,
    pub vector: Vector,
    /// Authored passage for the same key, used as a tonal reference.
    pub seed_passage: Option<String>,
}

/// Entity details for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityContext {
    pub name: String,
    pub kind: String,
    pub description: String,
    pub state: String,
    pub energy: u8,
    /// Recent vectors, newest first. Echoes are marked.
    pub recent: Vec<String>,
}

impl PromptContext {
    /// Gather context from a request and an optional authored passage.
    pub fn from_request(request: &NarrationRequest<'_>, seed_passage: Option<&str>) -> Self {
        let entity = request.entity;
        Self {
            scenario_name: request.scenario.name.clone(),
            physics: request.scenario.physics.clone(),
            baseline: request.scenario.baseline.clone(),
            environment: request.scenario.environment,
            entity: EntityContext {
                name: entity.name.clone(),
                kind: entity.kind.as_str().to_string(),
                description: entity.description.clone(),
                state: entity.state.clone(),
                energy: entity.energy,
                recent: entity
                    .memory
                    .recent(PROMPT_MEMORY_DEPTH)
                    .into_iter()
                    .map(|m| {
                        if m.echo {
                            format!("t{} {} (echo)", m.tick, m.vector)
                        } else {
                            format!("t{} {}", m.tick, m.vector)
                        }
                    })
                    .collect(),
            },
            vector: request.vector,
            seed_passage: seed_passage.map(str::to_string),
        }
    }

    /// Format the context as a prompt string.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("## Scenario\n");
        prompt.push_str(&format!("{} ({})\n", self.scenario_name, self.physics));
        prompt.push_str(&self.baseline);
        prompt.push_str("\n\n");

        prompt.push_str("## Environment\n");
        prompt.push_str(&format!(
            "Temperature {:.0}C, humidity {:.0}%, light {:.0}%, noise {:.0}%\n\n",
            self.environment.temperature,
            self.environment.humidity * 100.0,
            self.environment.light * 100.0,
            self.environment.noise * 100.0
        ));

        prompt.push_str("## Entity\n");
        prompt.push_str(&format!(
            "- {} [{}]: {}\n- State: {}, energy {}/100\n",
            self.entity.name,
            self.entity.kind,
            self.entity.description,
            self.entity.state,
            self.entity.energy
        ));
        if !self.entity.recent.is_empty() {
            prompt.push_str(&format!("- Recent: {}\n", self.entity.recent.join(", ")));
        }
        prompt.push('\n');

        prompt.push_str("## Vector\n");
        prompt.push_str(&format!(
            "{}: the entity now faces {}.\n\n",
            self.vector,
            match self.vector {
                Vector::Goal => "something to reach for",
                Vector::Obstacle => "something in its way",
                Vector::Shift => "a change in itself or its footing",
            }
        ));

        if let Some(seed) = &self.seed_passage {
            prompt.push_str("## Tone Reference\n");
            prompt.push_str(seed);
            prompt.push_str("\n\n");
        }

        prompt.push_str("Write one or two sentences describing what happens.\n");
        prompt
    }
}
