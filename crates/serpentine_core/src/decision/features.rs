use crate::effects::EffectRegistry;
use crate::spatial_hash::SpatialIndex;
use crate::state::WorldState;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serpentine_data::{Snake, SnakeId, Vec2};

pub const FEATURE_LEN: usize = 14;

/// Distance reported when no hunter or self-segment is relevant.
pub const SENTINEL_DISTANCE: f32 = 9999.0;

/// Leading segments ignored by the self-collision feature; they always
/// overlap the head.
const SELF_SKIP: usize = 3;

pub mod index {
    pub const DIR_X: usize = 0;
    pub const DIR_Y: usize = 1;
    pub const FOOD_DX: usize = 2;
    pub const FOOD_DY: usize = 3;
    pub const WALL_UP: usize = 4;
    pub const WALL_RIGHT: usize = 5;
    pub const WALL_DOWN: usize = 6;
    pub const WALL_LEFT: usize = 7;
    pub const SELF_DIST: usize = 8;
    pub const HUNTER_DIST: usize = 9;
    pub const HUNTER_DX: usize = 10;
    pub const HUNTER_DY: usize = 11;
    pub const SIZE_DELTA: usize = 12;
    pub const EFFECT_BITS: usize = 13;
}

pub const FEATURE_NAMES: [&str; FEATURE_LEN] = [
    "dir_x",
    "dir_y",
    "food_dx",
    "food_dy",
    "wall_up",
    "wall_right",
    "wall_down",
    "wall_left",
    "self_dist",
    "hunter_dist",
    "hunter_dx",
    "hunter_dy",
    "size_delta",
    "effect_bits",
];

/// Fixed-length input of a policy. Always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f32; FEATURE_LEN]);

impl Default for FeatureVector {
    fn default() -> Self {
        let mut v = [0.0; FEATURE_LEN];
        v[index::SELF_DIST] = SENTINEL_DISTANCE;
        v[index::HUNTER_DIST] = SENTINEL_DISTANCE;
        Self(v)
    }
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> Option<f32> {
        self.0.get(i).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    fn set(&mut self, i: usize, value: f64) {
        let v = value as f32;
        self.0[i] = if v.is_finite() { v } else { 0.0 };
    }
}

/// Read-only view of the world the feature extractor works from.
#[derive(Clone, Copy)]
pub struct FeatureContext<'a> {
    pub state: &'a WorldState,
    pub spatial: &'a SpatialIndex,
    pub effects: &'a EffectRegistry,
}

/// Total and deterministic: every input yields a finite vector.
#[must_use]
pub fn extract(snake: &Snake, ctx: &FeatureContext<'_>) -> FeatureVector {
    let mut f = FeatureVector::default();
    let head = snake.head();

    let dir = snake.heading().unwrap_or(Vec2::ZERO);
    f.set(index::DIR_X, dir.x);
    f.set(index::DIR_Y, dir.y);

    if let Some(food) = ctx
        .spatial
        .nearest_food(head, f64::INFINITY)
        .and_then(|(id, _)| ctx.state.food(id))
    {
        let d = food.position - head;
        f.set(index::FOOD_DX, d.x);
        f.set(index::FOOD_DY, d.y);
    }

    let (w, h) = (ctx.state.width, ctx.state.height);
    f.set(index::WALL_UP, head.y.max(0.0));
    f.set(index::WALL_RIGHT, (w - head.x).max(0.0));
    f.set(index::WALL_DOWN, (h - head.y).max(0.0));
    f.set(index::WALL_LEFT, head.x.max(0.0));

    let self_dist = snake
        .segments
        .iter()
        .skip(SELF_SKIP)
        .map(|s| s.distance(head))
        .fold(f64::INFINITY, f64::min);
    if self_dist.is_finite() {
        f.set(index::SELF_DIST, self_dist);
    }

    if let Some((hunter, dist)) = ctx
        .spatial
        .nearest_hunter(ctx.state, head, f64::INFINITY, snake.id)
        .and_then(|(id, d)| ctx.state.snake(id).map(|s| (s, d)))
    {
        let d = hunter.head() - head;
        f.set(index::HUNTER_DIST, dist);
        f.set(index::HUNTER_DX, d.x);
        f.set(index::HUNTER_DY, d.y);
        f.set(index::SIZE_DELTA, snake.size as f64 - hunter.size as f64);
    }

    f.set(index::EFFECT_BITS, f64::from(ctx.effects.effect_flags(snake).bits()));
    f
}

/// Extracts features for every live snake in parallel, in state order.
#[must_use]
pub fn extract_all(ctx: &FeatureContext<'_>) -> Vec<(SnakeId, FeatureVector)> {
    ctx.state
        .snakes
        .par_iter()
        .filter(|s| s.alive)
        .map(|s| (s.id, extract(s, ctx)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpentine_data::{EffectDescriptor, EffectKind, Food, Role};
    use uuid::Uuid;

    fn world() -> (WorldState, SpatialIndex, EffectRegistry) {
        let mut state = WorldState::new(400.0, 300.0);
        let mut me = Snake::new(
            Uuid::from_u128(1),
            Vec2::new(100.0, 100.0),
            Vec2::new(1.0, 0.0),
            6,
            5.0,
        );
        me.velocity = Vec2::new(10.0, 0.0);
        me.effects
            .apply(EffectKind::Immunity, EffectDescriptor::new(3.0, 1.0));
        let mut hunter = Snake::new(
            Uuid::from_u128(2),
            Vec2::new(130.0, 140.0),
            Vec2::new(0.0, 1.0),
            9,
            5.0,
        );
        hunter.role = Role::Hunter;
        state.snakes.push(me);
        state.snakes.push(hunter);
        state.foods.push(Food::plain(Uuid::from_u128(10), Vec2::new(90.0, 80.0)));
        let mut spatial = SpatialIndex::new(32.0, 400.0, 300.0);
        spatial.rebuild(&state);
        (state, spatial, EffectRegistry::new())
    }

    #[test]
    fn test_feature_layout() {
        let (state, spatial, effects) = world();
        let ctx = FeatureContext {
            state: &state,
            spatial: &spatial,
            effects: &effects,
        };
        let f = extract(&state.snakes[0], &ctx);
        assert_eq!(f.0[index::DIR_X], 1.0);
        assert_eq!(f.0[index::FOOD_DX], -10.0);
        assert_eq!(f.0[index::FOOD_DY], -20.0);
        assert_eq!(f.0[index::WALL_UP], 100.0);
        assert_eq!(f.0[index::WALL_RIGHT], 300.0);
        assert_eq!(f.0[index::WALL_DOWN], 200.0);
        assert_eq!(f.0[index::WALL_LEFT], 100.0);
        assert_eq!(f.0[index::SELF_DIST], 15.0);
        assert_eq!(f.0[index::HUNTER_DIST], 50.0);
        assert_eq!(f.0[index::HUNTER_DX], 30.0);
        assert_eq!(f.0[index::SIZE_DELTA], -3.0);
        assert_eq!(f.0[index::EFFECT_BITS], 4.0);
    }

    #[test]
    fn test_sentinels_without_hunter() {
        let (state, spatial, effects) = world();
        let ctx = FeatureContext {
            state: &state,
            spatial: &spatial,
            effects: &effects,
        };
        let f = extract(&state.snakes[1], &ctx);
        assert_eq!(f.0[index::HUNTER_DIST], SENTINEL_DISTANCE);
        assert_eq!(f.0[index::SIZE_DELTA], 0.0);
        assert!(f.is_finite());
    }

    #[test]
    fn test_extract_all_keeps_order() {
        let (state, spatial, effects) = world();
        let ctx = FeatureContext {
            state: &state,
            spatial: &spatial,
            effects: &effects,
        };
        let all = extract_all(&ctx);
        let ids: Vec<SnakeId> = all.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
    }
}
