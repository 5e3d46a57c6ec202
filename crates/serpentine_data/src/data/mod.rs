//! Core data structures for the Serpentine simulation.

use serde::{Deserialize, Serialize};

pub mod action;
pub mod creature;
pub mod effect;
pub mod entity;
pub mod food;
pub mod geometry;
pub mod hazard;

/// What happens to an entity whose head leaves the world rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WallMode {
    /// Reappear on the opposite edge.
    #[default]
    Wrap,
    /// Die on contact.
    Destructive,
}
