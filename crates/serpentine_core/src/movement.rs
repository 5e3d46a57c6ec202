//! Acceleration-limited motion with size-dependent caps.

use crate::config::{AppConfig, MotionConfig, WorldConfig};
use serpentine_data::{DeathCause, Snake, Vec2, WallMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Wrapped,
    HitWall,
}

/// Everything the movement step consumes besides the snake itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveInput {
    /// Steering intent. A zero vector means "keep the current velocity".
    pub direction: Vec2,
    /// Product of all speed-affecting effect magnitudes.
    pub speed_multiplier: f64,
    /// Hazard pull, in units/s^2.
    pub pull: Vec2,
}

impl MoveInput {
    #[must_use]
    pub fn steer(direction: Vec2) -> Self {
        Self {
            direction,
            speed_multiplier: 1.0,
            pull: Vec2::ZERO,
        }
    }
}

fn size_curve(base: f64, floor: f64, penalty: f64, size: usize, initial: usize) -> f64 {
    let growth = size.saturating_sub(initial) as f64;
    let denom = 1.0 + growth * penalty;
    if !(denom.is_finite() && denom > 0.0) {
        return base;
    }
    (base / denom).max(floor)
}

/// Top speed for a snake of `size`, before effects. Non-increasing in size.
#[must_use]
pub fn max_speed(motion: &MotionConfig, size: usize, initial_size: usize) -> f64 {
    size_curve(
        motion.base_max_speed,
        motion.min_speed,
        motion.speed_size_penalty,
        size,
        initial_size,
    )
}

/// Acceleration limit for a snake of `size`, before effects.
#[must_use]
pub fn max_acceleration(motion: &MotionConfig, size: usize, initial_size: usize) -> f64 {
    size_curve(
        motion.base_acceleration,
        motion.min_acceleration,
        motion.accel_size_penalty,
        size,
        initial_size,
    )
}

/// Clamps a tick length into the configured safe range. Non-finite input
/// falls back to the reference tick.
#[must_use]
pub fn clamp_dt(world: &WorldConfig, dt: f64) -> f64 {
    if dt.is_finite() {
        dt.clamp(world.min_dt, world.max_dt)
    } else {
        world.dt.clamp(world.min_dt, world.max_dt)
    }
}

/// One rate-limited velocity update towards `direction * max_speed`.
///
/// `extra` is an additional acceleration (hazard pull) that is not subject to
/// the steering limit. The result never exceeds `max_speed`.
#[must_use]
pub fn steer_velocity(
    velocity: Vec2,
    direction: Vec2,
    max_speed: f64,
    max_accel: f64,
    extra: Vec2,
    dt: f64,
) -> (Vec2, Vec2) {
    let desired = direction.normalized().map_or(velocity, |d| d * max_speed);
    let dv = (desired - velocity).clamp_length(max_accel * dt);
    let pulled = if extra.is_finite() { extra * dt } else { Vec2::ZERO };
    let next = (velocity + dv + pulled).clamp_length(max_speed);
    let next = if next.is_finite() { next } else { Vec2::ZERO };
    (next, desired)
}

/// Wraps `p` around a `width x height` rectangle with a margin of `margin`
/// on each side. Returns `None` when no wrap was needed.
#[must_use]
pub fn wrap_position(p: Vec2, width: f64, height: f64, margin: f64) -> Option<Vec2> {
    let mut out = p;
    if out.x > width + margin {
        out.x -= width + 2.0 * margin;
    } else if out.x < -margin {
        out.x += width + 2.0 * margin;
    }
    if out.y > height + margin {
        out.y -= height + 2.0 * margin;
    } else if out.y < -margin {
        out.y += height + 2.0 * margin;
    }
    (out != p).then_some(out)
}

#[must_use]
pub fn in_bounds(p: Vec2, width: f64, height: f64) -> bool {
    (0.0..=width).contains(&p.x) && (0.0..=height).contains(&p.y)
}

/// Advances one snake by `dt` seconds (already clamped).
///
/// The new head is pushed at the front of the trail and the tail trimmed to
/// `size`, so the body follows the exact path of the head.
pub fn advance(snake: &mut Snake, input: &MoveInput, config: &AppConfig, dt: f64) -> MoveOutcome {
    if !snake.alive {
        return MoveOutcome::Moved;
    }
    let initial = config.lifecycle.initial_snake_size;
    let mult = if input.speed_multiplier.is_finite() && input.speed_multiplier >= 0.0 {
        input.speed_multiplier
    } else {
        1.0
    };
    let top = max_speed(&config.motion, snake.size, initial) * mult;
    let accel = max_acceleration(&config.motion, snake.size, initial) * mult;

    let (velocity, desired) =
        steer_velocity(snake.velocity, input.direction, top, accel, input.pull, dt);
    snake.velocity = velocity;
    snake.target_velocity = desired;

    let mut head = snake.head() + velocity * dt;
    let (w, h) = (config.world.width, config.world.height);
    let mut outcome = MoveOutcome::Moved;
    match config.world.wall_mode {
        WallMode::Wrap => {
            if let Some(wrapped) = wrap_position(head, w, h, config.motion.segment_radius) {
                head = wrapped;
                outcome = MoveOutcome::Wrapped;
            }
        }
        WallMode::Destructive => {
            if !in_bounds(head, w, h) {
                snake.kill(DeathCause::Wall);
                outcome = MoveOutcome::HitWall;
            }
        }
    }

    snake.segments.insert(0, head);
    snake.segments.truncate(snake.size);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn config() -> AppConfig {
        AppConfig::default()
    }

    fn snake_at(p: Vec2, size: usize) -> Snake {
        Snake::new(Uuid::from_u128(1), p, Vec2::new(1.0, 0.0), size, 5.0)
    }

    #[test]
    fn test_speed_curve_is_non_increasing() {
        let motion = MotionConfig::default();
        let mut last = f64::INFINITY;
        for size in 2..200 {
            let s = max_speed(&motion, size, 3);
            assert!(s <= last);
            assert!(s >= motion.min_speed);
            last = s;
        }
        assert_eq!(max_speed(&motion, 3, 3), motion.base_max_speed);
    }

    #[test]
    fn test_negative_penalty_falls_back_to_base() {
        let motion = MotionConfig {
            speed_size_penalty: -1.0,
            ..Default::default()
        };
        assert_eq!(max_speed(&motion, 10, 3), motion.base_max_speed);
    }

    #[test]
    fn test_turns_are_rate_limited() {
        let cfg = config();
        let mut s = snake_at(Vec2::new(500.0, 400.0), 3);
        s.velocity = Vec2::new(300.0, 0.0);
        let dt = 1.0 / 60.0;
        advance(&mut s, &MoveInput::steer(Vec2::new(-1.0, 0.0)), &cfg, dt);
        let dv = 300.0 - s.velocity.x;
        assert!(dv <= cfg.motion.base_acceleration * dt + 1e-9);
        assert!(s.velocity.x > 0.0);
    }

    #[test]
    fn test_zero_direction_keeps_velocity() {
        let cfg = config();
        let mut s = snake_at(Vec2::new(500.0, 400.0), 3);
        s.velocity = Vec2::new(100.0, 50.0);
        advance(&mut s, &MoveInput::steer(Vec2::ZERO), &cfg, 0.01);
        assert_eq!(s.velocity, Vec2::new(100.0, 50.0));
        assert_eq!(s.head(), Vec2::new(501.0, 400.5));
    }

    #[test]
    fn test_speed_multiplier_caps_velocity() {
        let cfg = config();
        let mut s = snake_at(Vec2::new(500.0, 400.0), 3);
        s.velocity = Vec2::new(300.0, 0.0);
        let input = MoveInput {
            direction: Vec2::new(1.0, 0.0),
            speed_multiplier: 0.4,
            pull: Vec2::ZERO,
        };
        advance(&mut s, &input, &cfg, 1.0 / 60.0);
        assert!(s.velocity.length() <= 120.0 + 1e-9);
    }

    #[test]
    fn test_wrap_mode_wraps_head() {
        let cfg = config();
        let mut s = snake_at(Vec2::new(1007.0, 400.0), 3);
        s.velocity = Vec2::new(300.0, 0.0);
        let outcome = advance(&mut s, &MoveInput::steer(Vec2::new(1.0, 0.0)), &cfg, 0.1);
        assert_eq!(outcome, MoveOutcome::Wrapped);
        assert!(s.head().x < 50.0);
        assert!(s.alive);
    }

    #[test]
    fn test_destructive_mode_kills() {
        let mut cfg = config();
        cfg.world.wall_mode = WallMode::Destructive;
        let mut s = snake_at(Vec2::new(999.0, 400.0), 3);
        s.velocity = Vec2::new(300.0, 0.0);
        let outcome = advance(&mut s, &MoveInput::steer(Vec2::new(1.0, 0.0)), &cfg, 0.1);
        assert_eq!(outcome, MoveOutcome::HitWall);
        assert_eq!(s.death_cause, Some(DeathCause::Wall));
    }

    #[test]
    fn test_trail_follows_size() {
        let cfg = config();
        let mut s = snake_at(Vec2::new(500.0, 400.0), 3);
        s.grow(2);
        for _ in 0..4 {
            advance(&mut s, &MoveInput::steer(Vec2::new(0.0, 1.0)), &cfg, 1.0 / 60.0);
        }
        assert_eq!(s.segments.len(), 5);
        s.shrink(3, 2);
        advance(&mut s, &MoveInput::steer(Vec2::new(0.0, 1.0)), &cfg, 1.0 / 60.0);
        assert_eq!(s.segments.len(), 2);
    }

    #[test]
    fn test_dt_is_clamped() {
        let world = WorldConfig::default();
        assert_eq!(clamp_dt(&world, 10.0), world.max_dt);
        assert_eq!(clamp_dt(&world, 0.0), world.min_dt);
        assert_eq!(clamp_dt(&world, f64::NAN), world.dt);
    }
}
