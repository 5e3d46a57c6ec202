//! Timed and environmental effects.
//!
//! Timed effects live on the snake itself ([`Snake::effects`]) or in the
//! world-scoped set held here. Environmental effects (speed zones, hazard
//! pulls) are *transient*: the interaction resolver rewrites them every tick
//! from current positions and the movement step of the following tick
//! consumes them.

use serpentine_data::{
    EffectDescriptor, EffectFlags, EffectKind, EffectSet, Snake, SnakeId, Vec2,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Per-tick environmental modifiers for one snake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientEffects {
    /// Product of the multipliers of every speed zone the head is inside.
    pub zone_multiplier: f64,
    /// Summed hazard pull, added to acceleration.
    pub pull: Vec2,
    pub flags: EffectFlags,
}

impl Default for TransientEffects {
    fn default() -> Self {
        Self {
            zone_multiplier: 1.0,
            pull: Vec2::ZERO,
            flags: EffectFlags::empty(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    world: EffectSet,
    transient: BTreeMap<SnakeId, TransientEffects>,
}

impl EffectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a timed effect to `snake`. Same-kind re-application
    /// refreshes the duration and replaces the magnitude.
    pub fn apply(&self, snake: &mut Snake, kind: EffectKind, descriptor: EffectDescriptor) -> bool {
        let refreshed = snake.effects.apply(kind, descriptor);
        debug!(
            snake = %snake.id,
            ?kind,
            duration = descriptor.duration,
            magnitude = descriptor.magnitude,
            refreshed,
            "Effect applied"
        );
        refreshed
    }

    /// Attaches a timed effect to the world; it modifies every snake.
    pub fn apply_world(&mut self, kind: EffectKind, descriptor: EffectDescriptor) -> bool {
        self.world.apply(kind, descriptor)
    }

    #[must_use]
    pub fn world_effects(&self) -> &EffectSet {
        &self.world
    }

    /// Counts down world-scoped and per-snake timed effects.
    /// Returns how many effects expired.
    pub fn advance(&mut self, snakes: &mut [Snake], dt: f64) -> usize {
        let mut expired = 0;
        for kind in self.world.advance(dt) {
            debug!(?kind, "World effect expired");
            expired += 1;
        }
        for snake in snakes.iter_mut().filter(|s| s.alive) {
            for kind in snake.effects.advance(dt) {
                debug!(snake = %snake.id, ?kind, "Effect expired");
                expired += 1;
            }
        }
        expired
    }

    pub fn clear_transients(&mut self) {
        self.transient.clear();
    }

    pub fn transient_mut(&mut self, id: SnakeId) -> &mut TransientEffects {
        self.transient.entry(id).or_default()
    }

    #[must_use]
    pub fn transient(&self, id: SnakeId) -> TransientEffects {
        self.transient.get(&id).copied().unwrap_or_default()
    }

    /// Combined speed multiplier: own timed effects, world effects and the
    /// zone the snake was in at the end of the previous tick.
    #[must_use]
    pub fn speed_multiplier(&self, snake: &Snake) -> f64 {
        let m = snake.effects.speed_multiplier()
            * self.world.speed_multiplier()
            * self.transient(snake.id).zone_multiplier;
        if m.is_finite() && m >= 0.0 {
            m
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn pull(&self, id: SnakeId) -> Vec2 {
        self.transient(id).pull
    }

    /// Own immunity or a world-wide one.
    #[must_use]
    pub fn is_immune(&self, snake: &Snake) -> bool {
        snake.is_immune() || self.world.is_active(EffectKind::Immunity)
    }

    /// Bitset of everything currently modifying `snake`.
    #[must_use]
    pub fn effect_flags(&self, snake: &Snake) -> EffectFlags {
        snake.effects.flags() | self.world.flags() | self.transient(snake.id).flags
    }

    pub fn forget(&mut self, id: SnakeId) {
        self.transient.remove(&id);
    }
}
