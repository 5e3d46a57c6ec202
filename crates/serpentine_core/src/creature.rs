//! Ripper and Scavenger steering.
//!
//! Targets are ids re-resolved every tick. A target that died, was eaten, or
//! left detection range is dropped and a new one is picked; without one the
//! creature patrols.

use crate::config::{AppConfig, CreatureConfig};
use crate::decision::rules::wall_avoidance;
use crate::movement::{in_bounds, steer_velocity, wrap_position};
use rand::Rng;
use serpentine_data::{Creature, CreatureKind, Food, Snake, Vec2, WallMode};
use uuid::Uuid;

fn limits(kind: CreatureKind, config: &AppConfig) -> (f64, f64, f64) {
    let c: &CreatureConfig = &config.creatures;
    let m = &config.motion;
    match kind {
        CreatureKind::Ripper => (
            m.base_max_speed * c.ripper_speed_multiplier,
            m.base_acceleration * c.ripper_accel_multiplier,
            c.ripper_detection_range,
        ),
        CreatureKind::Scavenger => (
            m.base_max_speed * c.scavenger_speed_multiplier,
            m.base_acceleration * c.scavenger_accel_multiplier,
            c.scavenger_detection_range,
        ),
    }
}

fn target_position(
    kind: CreatureKind,
    target: Uuid,
    snakes: &[Snake],
    foods: &[Food],
) -> Option<Vec2> {
    match kind {
        CreatureKind::Ripper => snakes
            .iter()
            .find(|s| s.id == target && s.alive && s.is_hunter())
            .map(Snake::head),
        CreatureKind::Scavenger => foods.iter().find(|f| f.id == target).map(|f| f.position),
    }
}

fn nearest_candidate(
    kind: CreatureKind,
    from: Vec2,
    range: f64,
    snakes: &[Snake],
    foods: &[Food],
) -> Option<(Uuid, Vec2)> {
    let candidates: Box<dyn Iterator<Item = (Uuid, Vec2)>> = match kind {
        CreatureKind::Ripper => Box::new(
            snakes
                .iter()
                .filter(|s| s.alive && s.is_hunter())
                .map(|s| (s.id, s.head())),
        ),
        CreatureKind::Scavenger => Box::new(foods.iter().map(|f| (f.id, f.position))),
    };
    candidates
        .map(|(id, p)| (id, p, p.distance(from)))
        .filter(|&(_, _, d)| d <= range)
        .fold(None, |best: Option<(Uuid, Vec2, f64)>, c| match best {
            Some(b) if b.2 <= c.2 => Some(b),
            _ => Some(c),
        })
        .map(|(id, p, _)| (id, p))
}

/// Keeps the current target while it is valid and in range, otherwise picks
/// the nearest candidate. Returns the target position, if any.
pub fn retarget(
    creature: &mut Creature,
    snakes: &[Snake],
    foods: &[Food],
    config: &AppConfig,
) -> Option<Vec2> {
    let (_, _, range) = limits(creature.kind, config);
    if let Some(id) = creature.target {
        if let Some(p) = target_position(creature.kind, id, snakes, foods) {
            if p.distance(creature.position) <= range {
                return Some(p);
            }
        }
        creature.target = None;
    }
    let (id, p) = nearest_candidate(creature.kind, creature.position, range, snakes, foods)?;
    creature.target = Some(id);
    Some(p)
}

/// Moves one creature by `dt`. In destructive wall mode a creature leaving
/// the world dies.
pub fn step<R: Rng + ?Sized>(
    creature: &mut Creature,
    snakes: &[Snake],
    foods: &[Food],
    config: &AppConfig,
    dt: f64,
    rng: &mut R,
) {
    if !creature.alive {
        return;
    }
    let (speed, accel, _) = limits(creature.kind, config);
    let (w, h) = (config.world.width, config.world.height);

    let (direction, top) = match retarget(creature, snakes, foods, config) {
        Some(target) => (target - creature.position, speed),
        None => {
            let heading = creature.velocity.normalized().unwrap_or_else(|| {
                let a = rng.gen_range(0.0..std::f64::consts::TAU);
                Vec2::new(a.cos(), a.sin())
            });
            let jitter = Vec2::new(rng.gen_range(-0.5..=0.5), rng.gen_range(-0.5..=0.5));
            (heading + jitter, speed * config.creatures.patrol_speed_factor)
        }
    };
    let direction = if config.world.wall_mode == WallMode::Destructive {
        direction.normalized().unwrap_or(Vec2::ZERO)
            + wall_avoidance(creature.position, w, h, config.ai.wall_avoid_distance * 2.0, 1.0)
    } else {
        direction
    };

    let (velocity, _) = steer_velocity(creature.velocity, direction, top, accel, Vec2::ZERO, dt);
    creature.velocity = velocity;
    creature.position += velocity * dt;

    match config.world.wall_mode {
        WallMode::Wrap => {
            if let Some(p) = wrap_position(creature.position, w, h, 0.0) {
                creature.position = p;
            }
        }
        WallMode::Destructive => {
            if !in_bounds(creature.position, w, h) {
                creature.alive = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serpentine_data::Role;

    fn hunter(n: u128, at: Vec2) -> Snake {
        let mut s = Snake::new(Uuid::from_u128(n), at, Vec2::new(1.0, 0.0), 12, 5.0);
        s.role = Role::Hunter;
        s
    }

    #[test]
    fn test_ripper_picks_nearest_hunter_in_range() {
        let config = AppConfig::default();
        let snakes = vec![hunter(1, Vec2::new(200.0, 100.0)), hunter(2, Vec2::new(140.0, 100.0))];
        let mut ripper =
            Creature::new(Uuid::from_u128(9), CreatureKind::Ripper, Vec2::new(100.0, 100.0));
        retarget(&mut ripper, &snakes, &[], &config);
        assert_eq!(ripper.target, Some(Uuid::from_u128(2)));
    }

    #[test]
    fn test_vanished_target_is_replaced() {
        let config = AppConfig::default();
        let mut snakes =
            vec![hunter(1, Vec2::new(120.0, 100.0)), hunter(2, Vec2::new(160.0, 100.0))];
        let mut ripper =
            Creature::new(Uuid::from_u128(9), CreatureKind::Ripper, Vec2::new(100.0, 100.0));
        retarget(&mut ripper, &snakes, &[], &config);
        assert_eq!(ripper.target, Some(Uuid::from_u128(1)));

        snakes.remove(0);
        retarget(&mut ripper, &snakes, &[], &config);
        assert_eq!(ripper.target, Some(Uuid::from_u128(2)));

        snakes.clear();
        assert!(retarget(&mut ripper, &snakes, &[], &config).is_none());
        assert!(ripper.target.is_none());
    }

    #[test]
    fn test_scavenger_moves_towards_food() {
        let config = AppConfig::default();
        let foods = vec![Food::plain(Uuid::from_u128(5), Vec2::new(150.0, 100.0))];
        let mut scav =
            Creature::new(Uuid::from_u128(9), CreatureKind::Scavenger, Vec2::new(100.0, 100.0));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..10 {
            step(&mut scav, &[], &foods, &config, 1.0 / 60.0, &mut rng);
        }
        assert!(scav.position.x > 100.0);
        assert_eq!(scav.target, Some(Uuid::from_u128(5)));
    }

    #[test]
    fn test_patrol_is_slower_than_chase() {
        let config = AppConfig::default();
        let mut ripper =
            Creature::new(Uuid::from_u128(9), CreatureKind::Ripper, Vec2::new(500.0, 400.0));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..120 {
            step(&mut ripper, &[], &[], &config, 1.0 / 60.0, &mut rng);
        }
        let cap = config.motion.base_max_speed
            * config.creatures.ripper_speed_multiplier
            * config.creatures.patrol_speed_factor;
        assert!(ripper.velocity.length() <= cap + 1e-9);
    }
}
