//! # Ripple Core
//!
//! The engine behind Ripples. This crate interfaces with `world_rules`,
//! applies narrative vectors to entities, propagates echoes through the
//! authored adjacency, keeps the audit log, and hands the result to
//! pluggable renderers and outputs.
//!
//! ## Core Components
//!
//! - **engine**: Scenario/selection state, vector application, audit log
//! - **events**: Named engine events for subscribers
//! - **narrator**: Where ripple text comes from (latent library or a local LLM)
//! - **autoplay** / **voting**: Timer-driven and crowd-driven ripples
//! - **render** / **grid** / **bridge**: Worldtext, point clouds, the live grid and UDP output

pub mod autoplay;
pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod llm;
pub mod narrator;
pub mod propagation;
pub mod render;
pub mod ripple;
pub mod voting;

mod atomic_io;

pub use autoplay::*;
pub use bridge::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use grid::*;
pub use llm::*;
pub use narrator::*;
pub use propagation::*;
pub use render::*;
pub use ripple::*;
pub use voting::*;
