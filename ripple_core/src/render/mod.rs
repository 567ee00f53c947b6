//! Pluggable renderers for the current engine state.

mod cloud;
mod worldtext;

pub use cloud::*;
pub use worldtext::*;

use world_rules::{EntityId, Scenario};

use crate::ripple::Ripple;

/// What a renderer sees: the live scenario, selection and latest ripple.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub scenario: &'a Scenario,
    pub selected: Option<&'a EntityId>,
    pub last_ripple: Option<&'a Ripple>,
    pub tick: u64,
}

impl Frame<'_> {
    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected == Some(id)
    }

    pub fn is_echo_target(&self, id: &EntityId) -> bool {
        self.last_ripple
            .map(|r| r.echo_targets().any(|t| t == id))
            .unwrap_or(false)
    }
}

/// Turns a frame into output text.
pub trait Renderer {
    fn name(&self) -> &'static str;
    fn render(&self, frame: &Frame<'_>) -> String;
}
