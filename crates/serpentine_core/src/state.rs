use serde::{Deserialize, Serialize};
use serpentine_data::{
    Creature, CreatureId, CreatureKind, Food, FoodId, Hazard, HazardId, HazardKind, Snake,
    SnakeId,
};

/// Single mutable root of a session: owns every entity collection.
///
/// Collections are plain vectors kept in insertion order, which is also the
/// processing order of every phase of a tick. Other components refer to
/// entities by id and resolve them here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldState {
    pub width: f64,
    pub height: f64,
    pub tick: u64,
    /// Simulated seconds since the session started.
    pub elapsed: f64,
    pub snakes: Vec<Snake>,
    pub foods: Vec<Food>,
    pub hazards: Vec<Hazard>,
    pub creatures: Vec<Creature>,
}

impl WorldState {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn snake(&self, id: SnakeId) -> Option<&Snake> {
        self.snakes.iter().find(|s| s.id == id)
    }

    pub fn snake_mut(&mut self, id: SnakeId) -> Option<&mut Snake> {
        self.snakes.iter_mut().find(|s| s.id == id)
    }

    #[must_use]
    pub fn food(&self, id: FoodId) -> Option<&Food> {
        self.foods.iter().find(|f| f.id == id)
    }

    #[must_use]
    pub fn hazard(&self, id: HazardId) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.id == id)
    }

    #[must_use]
    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.iter().find(|c| c.id == id)
    }

    pub fn live_snakes(&self) -> impl Iterator<Item = &Snake> {
        self.snakes.iter().filter(|s| s.alive)
    }

    #[must_use]
    pub fn live_snake_count(&self) -> usize {
        self.live_snakes().count()
    }

    #[must_use]
    pub fn live_hunter_count(&self) -> usize {
        self.live_snakes().filter(|s| s.is_hunter()).count()
    }

    /// Live hunters over live snakes; `0.0` for an empty population.
    #[must_use]
    pub fn hunter_fraction(&self) -> f64 {
        let total = self.live_snake_count();
        if total == 0 {
            0.0
        } else {
            self.live_hunter_count() as f64 / total as f64
        }
    }

    #[must_use]
    pub fn creature_count(&self, kind: CreatureKind) -> usize {
        self.creatures
            .iter()
            .filter(|c| c.alive && c.kind == kind)
            .count()
    }

    /// Live hazards in the same cap bucket as `kind`.
    #[must_use]
    pub fn hazard_count(&self, kind: HazardKind) -> usize {
        self.hazards
            .iter()
            .filter(|h| !h.is_expired() && h.kind.same_family(kind))
            .count()
    }

    /// Drops dead snakes and creatures. Returns the removed snakes.
    pub fn remove_dead(&mut self) -> Vec<Snake> {
        let (live, dead): (Vec<Snake>, Vec<Snake>) =
            std::mem::take(&mut self.snakes).into_iter().partition(|s| s.alive);
        self.snakes = live;
        self.creatures.retain(|c| c.alive);
        dead
    }
}
