//! The ripple engine - scenario state, vector application and the audit log.
//!
//! A trigger runs in a fixed order:
//! 1. **Narrate**: ask the narrator for text (nothing changes if this fails)
//! 2. **Tick**: advance the tick counter by one
//! 3. **Apply**: apply the vector to the source entity
//! 4. **Propagate**: coin-flip each authored neighbor for an echo
//! 5. **Record**: one audit entry, one `RippleApplied` event, live grid refresh

use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use world_rules::{Catalog, EntityId, Scenario, ScenarioId, Vector, WorldState};

use crate::error::{Result, RippleError};
use crate::events::{EngineEvent, EventBus, SubscriptionId};
use crate::grid::GridCompiler;
use crate::narrator::{LibraryNarrator, NarrationRequest, Narrator};
use crate::propagation::{PropagationConfig, Propagator};
use crate::render::Frame;
use crate::ripple::{AuditEntry, AuditLog, Echo, Ripple, RippleId};
use crate::voting::VoteWindow;

/// Engine construction options.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Fixed PRNG seed for reproducible propagation and autoplay.
    pub seed: Option<u64>,
    pub propagation: PropagationConfig,
}

struct LiveGrid {
    compiler: GridCompiler,
    path: PathBuf,
}

/// The headless ripple engine.
pub struct RippleEngine {
    catalog: Catalog,
    world: Option<WorldState>,
    narrator: Box<dyn Narrator>,
    propagator: Propagator,
    audit: AuditLog,
    bus: EventBus,
    rng: Pcg32,
    live_grid: Option<LiveGrid>,
    last_ripple: Option<Ripple>,
}

impl RippleEngine {
    /// Create an engine narrating from the catalog's latent library.
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        let narrator = LibraryNarrator::new(catalog.library().clone());
        Self::with_narrator(catalog, config, Box::new(narrator))
    }

    pub fn with_narrator(catalog: Catalog, config: EngineConfig, narrator: Box<dyn Narrator>) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(seed, "engine rng seeded");
        Self {
            catalog,
            world: None,
            narrator,
            propagator: Propagator::new(config.propagation),
            audit: AuditLog::new(),
            bus: EventBus::new(),
            rng: Pcg32::seed_from_u64(seed),
            live_grid: None,
            last_ripple: None,
        }
    }

    /// Swap the narrator, e.g. to switch between library and generated text.
    pub fn set_narrator(&mut self, narrator: Box<dyn Narrator>) {
        self.narrator = narrator;
    }

    /// Overwrite `path` with the compiled grid after every ripple.
    pub fn attach_live_grid(&mut self, compiler: GridCompiler, path: impl Into<PathBuf>) {
        self.live_grid = Some(LiveGrid {
            compiler,
            path: path.into(),
        });
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn world(&self) -> Option<&WorldState> {
        self.world.as_ref()
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.world.as_ref().map(|w| w.scenario())
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn tick(&self) -> u64 {
        self.world.as_ref().map(|w| w.tick()).unwrap_or(0)
    }

    pub fn last_ripple(&self) -> Option<&Ripple> {
        self.last_ripple.as_ref()
    }

    /// Current view for renderers.
    pub fn frame(&self) -> Option<Frame<'_>> {
        self.world.as_ref().map(|world| Frame {
            scenario: world.scenario(),
            selected: world.selected(),
            last_ripple: self.last_ripple.as_ref(),
            tick: world.tick(),
        })
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + Send + 'static,
    {
        self.bus.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub(crate) fn emit(&mut self, event: EngineEvent) {
        self.bus.emit(&event);
    }

    /// Start a fresh session on a catalog scenario.
    pub fn load_scenario(&mut self, id: &ScenarioId) -> Result<&Scenario> {
        let scenario = self.catalog.scenario(id)?.clone();
        info!(scenario = %id, entities = scenario.entities.len(), "scenario loaded");

        self.world = Some(WorldState::new(scenario));
        self.audit.clear();
        self.last_ripple = None;
        self.emit(EngineEvent::ScenarioLoaded {
            scenario: id.clone(),
        });

        self.scenario().ok_or(RippleError::NoScenarioLoaded)
    }

    pub fn select_entity(&mut self, id: &EntityId) -> Result<()> {
        self.world_mut()?.select(id)?;
        self.emit(EngineEvent::EntitySelected { entity: id.clone() });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if let Some(world) = self.world.as_mut() {
            world.clear_selection();
            self.emit(EngineEvent::SelectionCleared);
        }
    }

    /// Apply a vector to the selected entity.
    pub fn trigger(&mut self, vector: Vector) -> Result<Ripple> {
        let selected = self
            .world()
            .ok_or(RippleError::NoScenarioLoaded)?
            .selected()
            .cloned()
            .ok_or(RippleError::NoSelection)?;
        self.trigger_on(&selected, vector)
    }

    /// Apply a vector to a specific entity.
    pub fn trigger_on(&mut self, entity_id: &EntityId, vector: Vector) -> Result<Ripple> {
        let world = self.world.as_mut().ok_or(RippleError::NoScenarioLoaded)?;

        let text = {
            let scenario = world.scenario();
            let entity = scenario.require_entity(entity_id)?;
            let request = NarrationRequest {
                scenario,
                entity,
                vector,
                tick: world.tick() + 1,
            };
            match self.narrator.narrate(&request) {
                Ok(text) => text,
                Err(err) => {
                    warn!(entity = %entity_id, %vector, error = %err, "narration failed");
                    return Err(err);
                }
            }
        };

        let tick = world.advance_tick();
        let source = world.require_entity_mut(entity_id)?;
        let energy_after = source.apply_vector(vector, tick);
        let entity_name = source.name.clone();

        let neighbors = world.scenario().neighbors(entity_id).to_vec();
        let reached = self.propagator.select(&neighbors, &mut self.rng);
        let delta = self.propagator.echo_delta(vector);

        let mut propagated = Vec::with_capacity(reached.len());
        for target in reached {
            let neighbor = world.require_entity_mut(&target)?;
            let energy_after = neighbor.absorb_echo(vector, delta, tick);
            propagated.push(Echo {
                target,
                delta,
                energy_after,
            });
        }

        let ripple = Ripple {
            id: RippleId::new(),
            tick,
            scenario: world.scenario().id.clone(),
            source: entity_id.clone(),
            vector,
            text,
            energy_after,
            propagated,
        };
        debug!(
            tick,
            entity = %entity_id,
            %vector,
            energy = energy_after,
            echoes = ripple.propagated.len(),
            "ripple applied"
        );

        self.audit.record(AuditEntry::from_ripple(&ripple, entity_name));
        self.last_ripple = Some(ripple.clone());
        self.emit(EngineEvent::RippleApplied(ripple.clone()));
        self.refresh_live_grid();

        Ok(ripple)
    }

    /// Pick a random entity and vector, select the entity and trigger.
    pub fn autoplay_step(&mut self) -> Result<Ripple> {
        let world = self.world.as_ref().ok_or(RippleError::NoScenarioLoaded)?;
        let scenario = world.scenario();
        let entity = scenario
            .entities
            .choose(&mut self.rng)
            .map(|e| e.id.clone())
            .ok_or_else(|| RippleError::EmptyScenario(scenario.id.to_string()))?;
        let vector = *Vector::ALL
            .choose(&mut self.rng)
            .ok_or_else(|| RippleError::EmptyScenario(scenario.id.to_string()))?;

        self.select_entity(&entity)?;
        self.trigger(vector)
    }

    /// Apply the majority vector of a closed vote to the selected entity.
    ///
    /// Returns `Ok(None)` when nobody voted. `VoteResolved` is only emitted
    /// once the winning vector has been applied.
    pub fn resolve_vote(&mut self, window: &VoteWindow) -> Result<Option<Ripple>> {
        let vector = window.majority();
        let ripple = match vector {
            Some(vector) => Some(self.trigger(vector)?),
            None => None,
        };

        if let Some(vector) = vector {
            info!(%vector, votes = window.total(), "vote resolved");
        }
        self.emit(EngineEvent::VoteResolved {
            vector,
            votes: window.total(),
        });
        Ok(ripple)
    }

    fn world_mut(&mut self) -> Result<&mut WorldState> {
        self.world.as_mut().ok_or(RippleError::NoScenarioLoaded)
    }

    fn refresh_live_grid(&self) {
        let (Some(live), Some(scenario)) = (&self.live_grid, self.scenario()) else {
            return;
        };
        let grid = live.compiler.compile(scenario);
        if let Err(err) = grid.write_live(&live.path) {
            warn!(path = %live.path.display(), error = %err, "failed to write live grid");
        }
    }
}

impl std::fmt::Debug for RippleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RippleEngine")
            .field("scenario", &self.scenario().map(|s| &s.id))
            .field("tick", &self.tick())
            .field("audit", &self.audit.len())
            .field("bus", &self.bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    struct FailingNarrator;

    impl Narrator for FailingNarrator {
        fn narrate(&mut self, _request: &NarrationRequest<'_>) -> Result<String> {
            Err(RippleError::Llm("offline".to_string()))
        }
    }

    fn engine(chance: f64) -> RippleEngine {
        let config = EngineConfig {
            seed: Some(11),
            propagation: PropagationConfig {
                chance,
                attenuation: 0.5,
            },
        };
        let mut engine = RippleEngine::new(Catalog::builtin().unwrap(), config);
        engine.load_scenario(&"tidepool".into()).unwrap();
        engine
    }

    #[test]
    fn test_trigger_requires_scenario_and_selection() {
        let mut engine = RippleEngine::new(Catalog::builtin().unwrap(), EngineConfig::default());
        assert!(matches!(engine.trigger(Vector::Goal), Err(RippleError::NoScenarioLoaded)));

        engine.load_scenario(&"tidepool".into()).unwrap();
        assert!(matches!(engine.trigger(Vector::Goal), Err(RippleError::NoSelection)));
    }

    #[test]
    fn test_trigger_applies_and_records() {
        let mut engine = engine(0.0);
        engine.select_entity(&"kelp".into()).unwrap();

        let ripple = engine.trigger(Vector::Goal).unwrap();

        assert_eq!(ripple.tick, 1);
        assert_eq!(ripple.energy_after, 65);
        assert!(ripple.text.contains("kelp"));
        assert!(!ripple.did_propagate());
        assert_eq!(engine.tick(), 1);
        assert_eq!(engine.audit().len(), 1);

        let kelp = engine.world().unwrap().entity(&"kelp".into()).unwrap();
        assert_eq!(kelp.state, "yearning");
        assert_eq!(kelp.memory.len(), 1);
    }

    #[test]
    fn test_full_propagation_reaches_all_neighbors() {
        let mut engine = engine(1.0);
        let ripple = engine.trigger_on(&"tide".into(), Vector::Obstacle).unwrap();

        let targets: Vec<_> = ripple.echo_targets().map(|id| id.as_str()).collect();
        assert_eq!(targets, vec!["kelp", "hermit_crab", "fog", "basalt"]);

        let basalt = engine.world().unwrap().entity(&"basalt".into()).unwrap();
        assert_eq!(basalt.energy, 10);
        assert_eq!(basalt.state, "stirred");
        assert!(basalt.memory.latest().unwrap().echo);
        assert_eq!(engine.audit().latest().unwrap().echoes.len(), 4);
    }

    #[test]
    fn test_propagation_follows_authored_direction() {
        let mut engine = engine(1.0);
        // basalt does not list tide, even though tide lists basalt.
        let ripple = engine.trigger_on(&"basalt".into(), Vector::Goal).unwrap();
        assert!(ripple.echo_targets().all(|id| id.as_str() != "tide"));
    }

    #[test]
    fn test_narration_failure_changes_nothing() {
        let mut engine = engine(1.0);
        engine.set_narrator(Box::new(FailingNarrator));
        let before = engine.scenario().unwrap().clone();

        assert!(engine.trigger_on(&"fog".into(), Vector::Shift).is_err());
        assert_eq!(engine.tick(), 0);
        assert!(engine.audit().is_empty());
        assert_eq!(engine.scenario().unwrap(), &before);
    }

    #[test]
    fn test_unknown_entity() {
        let mut engine = engine(0.5);
        assert!(matches!(
            engine.select_entity(&"whale".into()),
            Err(RippleError::Rules(_))
        ));
        assert!(engine.trigger_on(&"whale".into(), Vector::Goal).is_err());
    }

    #[test]
    fn test_events_are_emitted() {
        let mut engine = engine(0.0);
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&names);
        engine.subscribe(move |event| sink.lock().unwrap().push(event.name()));

        engine.select_entity(&"fog".into()).unwrap();
        engine.trigger(Vector::Goal).unwrap();
        engine.clear_selection();
        engine.load_scenario(&"orchard".into()).unwrap();

        assert_eq!(
            *names.lock().unwrap(),
            vec!["entity_selected", "ripple_applied", "selection_cleared", "scenario_loaded"]
        );
    }

    #[test]
    fn test_load_scenario_resets_session() {
        let mut engine = engine(0.0);
        engine.trigger_on(&"fog".into(), Vector::Goal).unwrap();

        engine.load_scenario(&"tidepool".into()).unwrap();

        assert_eq!(engine.tick(), 0);
        assert!(engine.audit().is_empty());
        assert!(engine.last_ripple().is_none());
        assert_eq!(engine.world().unwrap().entity(&"fog".into()).unwrap().energy, 50);
    }

    #[test]
    fn test_autoplay_step_selects_and_triggers() {
        let mut engine = engine(0.5);
        let ripple = engine.autoplay_step().unwrap();

        assert_eq!(engine.world().unwrap().selected(), Some(&ripple.source));
        assert_eq!(engine.tick(), 1);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut a = engine(0.5);
        let mut b = engine(0.5);
        for _ in 0..20 {
            let ra = a.autoplay_step().unwrap();
            let rb = b.autoplay_step().unwrap();
            assert_eq!(ra.source, rb.source);
            assert_eq!(ra.vector, rb.vector);
            assert_eq!(ra.propagated, rb.propagated);
        }
    }

    #[test]
    fn test_resolve_vote() {
        let mut engine = engine(0.0);
        engine.select_entity(&"anemone".into()).unwrap();

        let opened = Instant::now();
        let mut window = VoteWindow::open(opened, Duration::from_secs(5));
        window.cast(Vector::Shift, opened).unwrap();
        window.cast(Vector::Shift, opened).unwrap();
        window.cast(Vector::Goal, opened).unwrap();

        let ripple = engine.resolve_vote(&window).unwrap().unwrap();
        assert_eq!(ripple.vector, Vector::Shift);

        let empty = VoteWindow::open(opened, Duration::from_secs(5));
        assert!(engine.resolve_vote(&empty).unwrap().is_none());
        assert_eq!(engine.tick(), 1);
    }

    #[test]
    fn test_failed_vote_is_not_announced() {
        let mut engine = engine(0.0);
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&names);
        engine.subscribe(move |event| sink.lock().unwrap().push(event.name()));

        let opened = Instant::now();
        let mut window = VoteWindow::open(opened, Duration::from_secs(5));
        window.cast(Vector::Goal, opened).unwrap();

        assert!(matches!(engine.resolve_vote(&window), Err(RippleError::NoSelection)));
        assert!(names.lock().unwrap().is_empty());

        engine.select_entity(&"kelp".into()).unwrap();
        engine.resolve_vote(&window).unwrap();
        assert_eq!(
            *names.lock().unwrap(),
            vec!["entity_selected", "ripple_applied", "vote_resolved"]
        );
    }

    #[test]
    fn test_passages_keep_rotating_past_memory_capacity() {
        let mut engine = engine(0.0);
        let anemone = EntityId::from("anemone");

        let texts: Vec<String> = (0..16)
            .map(|_| engine.trigger_on(&anemone, Vector::Goal).unwrap().text)
            .collect();

        for pair in texts.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(texts[0], texts[12]);
        assert_eq!(texts[1], texts[15]);
    }

    #[test]
    fn test_live_grid_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live_grid.txt");

        let mut engine = engine(0.0);
        engine.attach_live_grid(GridCompiler::default(), &path);
        engine.trigger_on(&"tide".into(), Vector::Goal).unwrap();

        let grid = std::fs::read_to_string(&path).unwrap();
        assert_eq!(grid.lines().count(), 8);
    }

    #[test]
    fn test_frame_reflects_state() {
        let mut engine = engine(0.0);
        engine.select_entity(&"kelp".into()).unwrap();
        engine.trigger(Vector::Shift).unwrap();

        let frame = engine.frame().unwrap();
        assert_eq!(frame.tick, 1);
        assert_eq!(frame.selected.map(|id| id.as_str()), Some("kelp"));
        assert_eq!(frame.last_ripple.map(|r| r.vector), Some(Vector::Shift));
    }
}
