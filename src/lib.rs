//! Serpentine: a deterministic multi-agent snake simulation.
//!
//! The engine lives in `serpentine_core`; this crate adds the session-level
//! [`World`](model::world::World) that sequences one tick, plus the headless
//! runner.

pub mod model;

pub use model::session::{run, RunEnd, SessionControl};
pub use model::world::{TickReport, World};
