//! Narrators - where the text of a ripple comes from.

mod prompt;

pub use prompt::*;

use tracing::debug;
use world_rules::{Entity, LatentLibrary, Scenario, Vector};

use crate::error::Result;
use crate::llm::LlmClient;

/// Everything a narrator may look at when voicing a ripple.
#[derive(Debug, Clone, Copy)]
pub struct NarrationRequest<'a> {
    pub scenario: &'a Scenario,
    pub entity: &'a Entity,
    pub vector: Vector,
    /// Tick the ripple will be recorded at.
    pub tick: u64,
}

/// Rotation index into the entity's passages for this request.
fn passage_cursor(request: &NarrationRequest<'_>) -> usize {
    usize::try_from(request.entity.received).unwrap_or(usize::MAX)
}

/// Produces the text for a ripple.
pub trait Narrator: Send {
    fn narrate(&mut self, request: &NarrationRequest<'_>) -> Result<String>;
}

/// Narrates from the latent library.
///
/// Passages rotate with the number of vectors the entity has received, so an
/// entity that keeps receiving the same vector walks through its authored
/// variants.
#[derive(Debug, Clone)]
pub struct LibraryNarrator {
    library: LatentLibrary,
}

impl LibraryNarrator {
    pub fn new(library: LatentLibrary) -> Self {
        Self { library }
    }
}

impl Narrator for LibraryNarrator {
    fn narrate(&mut self, request: &NarrationRequest<'_>) -> Result<String> {
        let text = self.library.passage(
            &request.scenario.id,
            &request.entity.id,
            request.vector,
            passage_cursor(request),
        )?;
        Ok(text.to_string())
    }
}

/// Narrates through a chat-completion model, seeding the prompt with the
/// authored passage when one exists.
pub struct LlmNarrator {
    client: LlmClient,
    library: LatentLibrary,
}

impl LlmNarrator {
    pub fn new(client: LlmClient, library: LatentLibrary) -> Self {
        Self { client, library }
    }
}

impl Narrator for LlmNarrator {
    fn narrate(&mut self, request: &NarrationRequest<'_>) -> Result<String> {
        let seed = self
            .library
            .passage(
                &request.scenario.id,
                &request.entity.id,
                request.vector,
                passage_cursor(request),
            )
            .ok();

        let context = PromptContext::from_request(request, seed);
        debug!(entity = %request.entity.id, vector = %request.vector, "requesting generated narration");
        let text = self.client.complete(&context.to_prompt_string())?;
        Ok(text.trim().to_string())
    }
}
