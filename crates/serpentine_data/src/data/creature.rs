use super::geometry::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CreatureId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureKind {
    /// Hunts hunter snakes when hunters dominate the population.
    Ripper,
    /// Steals food when food is abundant.
    Scavenger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub kind: CreatureKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Id of a snake (Ripper) or food (Scavenger). Looked up in the world
    /// every tick; the target may vanish at any time.
    pub target: Option<uuid::Uuid>,
    /// Food items taken so far (Scavenger only).
    pub satiation: u32,
    pub alive: bool,
}

impl Creature {
    #[must_use]
    pub fn new(id: CreatureId, kind: CreatureKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            target: None,
            satiation: 0,
            alive: true,
        }
    }
}
