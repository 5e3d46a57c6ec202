//! Plain data types shared by the Serpentine simulation crates.
//!
//! Nothing in here knows about ticks, configuration or randomness; the
//! engine in `serpentine_core` owns all behavior.

pub mod data;

pub use data::action::Action;
pub use data::creature::{Creature, CreatureId, CreatureKind};
pub use data::effect::{ActiveEffect, EffectDescriptor, EffectFlags, EffectKind, EffectSet};
pub use data::entity::{DeathCause, Role, Snake, SnakeId, SurvivalState};
pub use data::food::{Food, FoodId, FoodKind};
pub use data::geometry::Vec2;
pub use data::hazard::{Hazard, HazardId, HazardKind, ZoneTempo};
pub use data::WallMode;
