use super::effect::{EffectKind, EffectSet};
use super::geometry::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SnakeId = Uuid;

/// Role state machine: `Normal -> Hunter`, one way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Normal,
    Hunter,
}

/// Survival sub-state driven by the starvation timer.
///
/// `Fed -> Warning -> Dead`; any feeding returns the snake to `Fed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SurvivalState {
    #[default]
    Fed,
    Warning,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    Predation { hunter: SnakeId },
    Ripper,
    Wall,
}

/// A snake agent. Segment 0 is the head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    pub id: SnakeId,
    pub segments: Vec<Vec2>,
    pub velocity: Vec2,
    /// Velocity the snake was steering towards on its last movement step.
    pub target_velocity: Vec2,
    /// Segment count; never below 2.
    pub size: usize,
    pub role: Role,
    pub food_eaten: u32,
    /// Seconds since the last feeding.
    pub starvation_timer: f64,
    pub survival: SurvivalState,
    pub effects: EffectSet,
    pub alive: bool,
    pub death_cause: Option<DeathCause>,
    /// Tick on which the snake last consumed food.
    pub last_fed_tick: Option<u64>,
}

impl Snake {
    pub const MIN_SIZE: usize = 2;

    /// Builds a straight snake trailing behind `head` opposite to `heading`.
    #[must_use]
    pub fn new(id: SnakeId, head: Vec2, heading: Vec2, size: usize, spacing: f64) -> Self {
        let size = size.max(Self::MIN_SIZE);
        let back = heading.normalized().map_or(Vec2::new(-1.0, 0.0), |h| -h);
        let segments = (0..size).map(|i| head + back * (i as f64 * spacing)).collect();
        Self {
            id,
            segments,
            velocity: Vec2::ZERO,
            target_velocity: Vec2::ZERO,
            size,
            role: Role::Normal,
            food_eaten: 0,
            starvation_timer: 0.0,
            survival: SurvivalState::Fed,
            effects: EffectSet::new(),
            alive: true,
            death_cause: None,
            last_fed_tick: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn head(&self) -> Vec2 {
        self.segments.first().copied().unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn is_hunter(&self) -> bool {
        self.role == Role::Hunter
    }

    #[inline]
    #[must_use]
    pub fn is_immune(&self) -> bool {
        self.effects.is_active(EffectKind::Immunity)
    }

    /// Unit heading from the current velocity, if moving.
    #[must_use]
    pub fn heading(&self) -> Option<Vec2> {
        self.velocity.normalized()
    }

    pub fn grow(&mut self, amount: usize) {
        self.size += amount;
    }

    /// Reduces size, never below `floor` (itself never below 2), and trims
    /// the trailing segments immediately.
    pub fn shrink(&mut self, amount: usize, floor: usize) {
        let floor = floor.max(Self::MIN_SIZE);
        self.size = self.size.saturating_sub(amount).max(floor);
        self.segments.truncate(self.size);
    }

    /// Marks the snake dead. The first recorded cause wins.
    pub fn kill(&mut self, cause: DeathCause) {
        if self.alive {
            self.alive = false;
            self.death_cause = Some(cause);
        }
    }

    /// Promotes to `Hunter` once the food counter reaches `threshold`.
    /// Returns `true` only on the transition itself.
    pub fn promote_if_ready(&mut self, threshold: u32) -> bool {
        if self.role == Role::Normal && self.food_eaten >= threshold {
            self.role = Role::Hunter;
            true
        } else {
            false
        }
    }
}
