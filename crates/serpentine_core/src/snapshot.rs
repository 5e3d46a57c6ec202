//! Read-only view of a fully resolved tick, for presentation and replay
//! comparison.

use crate::state::WorldState;
use serde::{Deserialize, Serialize};
use serpentine_data::{
    ActiveEffect, CreatureId, CreatureKind, FoodId, FoodKind, HazardId, HazardKind, Role, SnakeId,
    SurvivalState, Vec2,
};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeView {
    pub id: SnakeId,
    pub segments: Vec<Vec2>,
    pub velocity: Vec2,
    pub size: usize,
    pub role: Role,
    pub survival: SurvivalState,
    pub food_eaten: u32,
    pub effects: Vec<ActiveEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodView {
    pub id: FoodId,
    pub position: Vec2,
    pub kind: FoodKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardView {
    pub id: HazardId,
    pub kind: HazardKind,
    pub position: Vec2,
    pub radius: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureView {
    pub id: CreatureId,
    pub kind: CreatureKind,
    pub position: Vec2,
    pub target: Option<uuid::Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub elapsed: f64,
    pub snakes: Vec<SnakeView>,
    pub foods: Vec<FoodView>,
    pub hazards: Vec<HazardView>,
    pub creatures: Vec<CreatureView>,
}

impl WorldSnapshot {
    /// Captures live entities only, in state order.
    #[must_use]
    pub fn from_state(state: &WorldState) -> Self {
        Self {
            tick: state.tick,
            elapsed: state.elapsed,
            snakes: state
                .live_snakes()
                .map(|s| SnakeView {
                    id: s.id,
                    segments: s.segments.clone(),
                    velocity: s.velocity,
                    size: s.size,
                    role: s.role,
                    survival: s.survival,
                    food_eaten: s.food_eaten,
                    effects: s.effects.iter().copied().collect(),
                })
                .collect(),
            foods: state
                .foods
                .iter()
                .map(|f| FoodView {
                    id: f.id,
                    position: f.position,
                    kind: f.kind,
                })
                .collect(),
            hazards: state
                .hazards
                .iter()
                .map(|h| HazardView {
                    id: h.id,
                    kind: h.kind,
                    position: h.position,
                    radius: h.radius,
                    remaining: h.remaining,
                })
                .collect(),
            creatures: state
                .creatures
                .iter()
                .filter(|c| c.alive)
                .map(|c| CreatureView {
                    id: c.id,
                    kind: c.kind,
                    position: c.position,
                    target: c.target,
                })
                .collect(),
        }
    }

    /// SHA-256 hex over the JSON encoding. Two runs with the same seed,
    /// config and inputs produce the same digest.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        match serde_json::to_vec(self) {
            Ok(bytes) => hasher.update(&bytes),
            // Non-finite floats cannot be encoded; fall back to the debug form.
            Err(_) => hasher.update(format!("{self:?}").as_bytes()),
        }
        hex::encode(hasher.finalize())
    }
}
