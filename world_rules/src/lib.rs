//! # World Rules
//!
//! The scenario bible for Ripples - entities, narrative vectors, scenarios,
//! the latent library of authored passages, and the mutable world state.
//! This crate is the single source of truth for scenario data and does not
//! contain any engine logic.

pub mod catalog;
pub mod entities;
pub mod error;
pub mod library;
pub mod scenario;
pub mod vectors;
pub mod world_state;

pub use catalog::*;
pub use entities::*;
pub use error::*;
pub use library::*;
pub use scenario::*;
pub use vectors::*;
pub use world_state::*;
