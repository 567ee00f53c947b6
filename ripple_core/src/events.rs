//! Engine events and the bus that delivers them.
//!
//! Subscribers are plain callbacks, invoked synchronously in registration
//! order on the thread that caused the event.

use serde::{Deserialize, Serialize};
use world_rules::{EntityId, ScenarioId, Vector};

use crate::ripple::Ripple;

/// Events emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    ScenarioLoaded {
        scenario: ScenarioId,
    },
    EntitySelected {
        entity: EntityId,
    },
    SelectionCleared,
    RippleApplied(Ripple),
    AutoplayStarted {
        interval_ms: u64,
    },
    AutoplayStopped {
        ripples: u64,
    },
    VoteResolved {
        vector: Option<Vector>,
        votes: u32,
    },
}

impl EngineEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::ScenarioLoaded { .. } => "scenario_loaded",
            EngineEvent::EntitySelected { .. } => "entity_selected",
            EngineEvent::SelectionCleared => "selection_cleared",
            EngineEvent::RippleApplied(_) => "ripple_applied",
            EngineEvent::AutoplayStarted { .. } => "autoplay_started",
            EngineEvent::AutoplayStopped { .. } => "autoplay_stopped",
            EngineEvent::VoteResolved { .. } => "vote_resolved",
        }
    }

    pub fn ripple(&self) -> Option<&Ripple> {
        match self {
            EngineEvent::RippleApplied(ripple) => Some(ripple),
            _ => None,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&EngineEvent) + Send>;

/// Registry of event callbacks.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every event.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &EngineEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        for label in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event| {
                seen.lock().unwrap().push(format!("{label}:{}", event.name()));
            });
        }

        bus.emit(&EngineEvent::SelectionCleared);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:selection_cleared", "second:selection_cleared"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();

        let counter = Arc::clone(&count);
        let id = bus.subscribe(move |_| *counter.lock().unwrap() += 1);

        bus.emit(&EngineEvent::SelectionCleared);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&EngineEvent::SelectionCleared);

        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
