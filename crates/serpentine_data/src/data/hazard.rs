use super::geometry::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type HazardId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneTempo {
    Fast,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    BlackHole,
    SpeedZone(ZoneTempo),
    FoodMagnet,
}

impl HazardKind {
    /// Whether the hazard exerts a continuous pull on entities in range.
    #[must_use]
    pub fn pulls(self) -> bool {
        matches!(self, HazardKind::BlackHole | HazardKind::FoodMagnet)
    }

    /// Population-cap bucket: both zone tempos share one cap.
    #[must_use]
    pub fn same_family(self, other: HazardKind) -> bool {
        matches!(
            (self, other),
            (HazardKind::BlackHole, HazardKind::BlackHole)
                | (HazardKind::SpeedZone(_), HazardKind::SpeedZone(_))
                | (HazardKind::FoodMagnet, HazardKind::FoodMagnet)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    pub kind: HazardKind,
    pub position: Vec2,
    pub radius: f64,
    /// Pull acceleration for black holes and magnets, speed multiplier for zones.
    pub strength: f64,
    /// Seconds of lifetime left.
    pub remaining: f64,
}

impl Hazard {
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) < self.radius * self.radius
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}
