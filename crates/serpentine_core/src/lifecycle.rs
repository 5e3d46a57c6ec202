//! Spawning, despawning, starvation and hazard expiry.

use crate::config::{AppConfig, HazardParams};
use crate::state::WorldState;
use rand::Rng;
use serpentine_data::{
    Creature, CreatureId, CreatureKind, DeathCause, EffectDescriptor, Food, FoodId, FoodKind,
    Hazard, HazardId, HazardKind, Snake, SnakeId, SurvivalState, Vec2, ZoneTempo,
};
use uuid::Uuid;

/// Poisson-like countdown: intervals are exponentially distributed around
/// `mean`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnTimer {
    pub mean: f64,
    pub remaining: f64,
}

impl SpawnTimer {
    pub fn new<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> Self {
        Self {
            mean,
            remaining: Self::sample(mean, rng),
        }
    }

    fn sample<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> f64 {
        let u: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
        -u.ln() * mean
    }

    /// Counts down by `dt`. Returns `true` when the timer fired; it is then
    /// re-armed with a fresh interval.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> bool {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = Self::sample(self.mean, rng);
            true
        } else {
            false
        }
    }
}

/// What one lifecycle pass changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LifecycleReport {
    pub starved: Vec<SnakeId>,
    pub warnings: Vec<SnakeId>,
    pub spawned_snakes: Vec<SnakeId>,
    pub spawned_food: usize,
    pub spawned_hazards: Vec<HazardKind>,
    pub expired_hazards: usize,
    pub spawned_creatures: Vec<CreatureKind>,
    pub despawned_creatures: Vec<CreatureKind>,
    /// Timer firings dropped because a cap or a gate condition blocked them.
    pub skipped_spawns: usize,
}

#[derive(Debug, Clone)]
pub struct LifecycleManager {
    food: SpawnTimer,
    snakes: SpawnTimer,
    black_holes: SpawnTimer,
    speed_zones: SpawnTimer,
    food_magnets: SpawnTimer,
    rippers: SpawnTimer,
    scavengers: SpawnTimer,
}

fn new_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Uuid::from_u128(rng.gen::<u128>())
}

/// Uniform point at least `margin` away from every edge, or the centre when
/// the world is too small for that margin.
fn random_point<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64, margin: f64) -> Vec2 {
    let axis = |rng: &mut R, extent: f64| {
        let (lo, hi) = (margin, extent - margin);
        if hi > lo {
            rng.gen_range(lo..hi)
        } else {
            extent / 2.0
        }
    };
    let x = axis(rng, width);
    let y = axis(rng, height);
    Vec2::new(x, y)
}

fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    Vec2::new(angle.cos(), angle.sin())
}

fn hazard_params(kind: HazardKind, config: &AppConfig) -> HazardParams {
    match kind {
        HazardKind::BlackHole => config.hazards.black_hole,
        HazardKind::SpeedZone(_) => config.hazards.speed_zone,
        HazardKind::FoodMagnet => config.hazards.food_magnet,
    }
}

impl LifecycleManager {
    pub fn new<R: Rng + ?Sized>(config: &AppConfig, rng: &mut R) -> Self {
        let h = &config.hazards;
        let c = &config.creatures;
        Self {
            food: SpawnTimer::new(config.food.spawn_interval, rng),
            snakes: SpawnTimer::new(config.lifecycle.snake_spawn_interval, rng),
            black_holes: SpawnTimer::new(h.black_hole.spawn_interval, rng),
            speed_zones: SpawnTimer::new(h.speed_zone.spawn_interval, rng),
            food_magnets: SpawnTimer::new(h.food_magnet.spawn_interval, rng),
            rippers: SpawnTimer::new(c.ripper_spawn_interval, rng),
            scavengers: SpawnTimer::new(c.scavenger_spawn_interval, rng),
        }
    }

    /// Runs after interaction resolution. Draws from `rng` in a fixed order.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        state: &mut WorldState,
        config: &AppConfig,
        dt: f64,
        rng: &mut R,
    ) -> LifecycleReport {
        let mut report = LifecycleReport::default();

        self.update_starvation(state, config, dt, &mut report);
        self.expire_hazards(state, dt, &mut report);
        self.govern_rippers(state, config, dt, rng, &mut report);
        self.govern_scavengers(state, config, dt, rng, &mut report);
        self.spawn_food_batch(state, config, dt, rng, &mut report);

        if self.snakes.tick(dt, rng) {
            if state.live_snake_count() < config.lifecycle.max_snakes {
                report.spawned_snakes.push(spawn_snake(state, config, rng));
            } else {
                report.skipped_spawns += 1;
            }
        }

        let fired = [
            (self.black_holes.tick(dt, rng), HazardKind::BlackHole),
            (self.speed_zones.tick(dt, rng), HazardKind::SpeedZone(ZoneTempo::Fast)),
            (self.food_magnets.tick(dt, rng), HazardKind::FoodMagnet),
        ];
        for (hit, kind) in fired {
            if !hit {
                continue;
            }
            let kind = match kind {
                HazardKind::SpeedZone(_) if rng.gen_bool(0.5) => {
                    HazardKind::SpeedZone(ZoneTempo::Slow)
                }
                other => other,
            };
            if state.hazard_count(kind) >= hazard_params(kind, config).max {
                report.skipped_spawns += 1;
                continue;
            }
            match spawn_hazard(state, kind, config, rng) {
                Some(_) => report.spawned_hazards.push(kind),
                None => report.skipped_spawns += 1,
            }
        }

        report
    }

    fn update_starvation(
        &self,
        state: &mut WorldState,
        config: &AppConfig,
        dt: f64,
        report: &mut LifecycleReport,
    ) {
        let l = &config.lifecycle;
        let tick = state.tick;
        for snake in state.snakes.iter_mut().filter(|s| s.alive) {
            if snake.last_fed_tick == Some(tick) {
                continue;
            }
            snake.starvation_timer += dt;
            if snake.starvation_timer >= l.starvation_death {
                snake.kill(DeathCause::Starvation);
                snake.survival = SurvivalState::Dead;
                tracing::debug!(snake = %snake.id, size = snake.size, "Snake starved");
                report.starved.push(snake.id);
            } else if snake.starvation_timer >= l.starvation_warning
                && snake.survival == SurvivalState::Fed
            {
                snake.survival = SurvivalState::Warning;
                report.warnings.push(snake.id);
            }
        }
    }

    fn expire_hazards(&self, state: &mut WorldState, dt: f64, report: &mut LifecycleReport) {
        for hazard in &mut state.hazards {
            hazard.remaining -= dt;
        }
        let before = state.hazards.len();
        state.hazards.retain(|h| {
            let keep = !h.is_expired();
            if !keep {
                tracing::debug!(hazard = %h.id, kind = ?h.kind, "Hazard expired");
            }
            keep
        });
        report.expired_hazards = before - state.hazards.len();
    }

    /// Rippers exist only while hunters dominate. The first one appears as
    /// soon as the fraction is exceeded; more follow on the ripper timer.
    fn govern_rippers<R: Rng + ?Sized>(
        &mut self,
        state: &mut WorldState,
        config: &AppConfig,
        dt: f64,
        rng: &mut R,
        report: &mut LifecycleReport,
    ) {
        let c = &config.creatures;
        let fired = self.rippers.tick(dt, rng);
        let fraction = state.hunter_fraction();

        if fraction <= c.hunter_fraction_threshold {
            for creature in state
                .creatures
                .iter_mut()
                .filter(|cr| cr.alive && cr.kind == CreatureKind::Ripper)
            {
                creature.alive = false;
                report.despawned_creatures.push(CreatureKind::Ripper);
            }
            if !report.despawned_creatures.is_empty() {
                tracing::info!(fraction, "Hunter share dropped, rippers withdrawn");
            }
            state.creatures.retain(|cr| cr.alive);
            return;
        }

        let count = state.creature_count(CreatureKind::Ripper);
        if count >= c.max_rippers {
            if fired {
                report.skipped_spawns += 1;
            }
            return;
        }
        if count == 0 || fired {
            spawn_creature(state, CreatureKind::Ripper, rng);
            tracing::info!(fraction, rippers = count + 1, "Ripper spawned");
            report.spawned_creatures.push(CreatureKind::Ripper);
        }
    }

    fn govern_scavengers<R: Rng + ?Sized>(
        &mut self,
        state: &mut WorldState,
        config: &AppConfig,
        dt: f64,
        rng: &mut R,
        report: &mut LifecycleReport,
    ) {
        let c = &config.creatures;
        for creature in state
            .creatures
            .iter_mut()
            .filter(|cr| {
                cr.alive
                    && cr.kind == CreatureKind::Scavenger
                    && cr.satiation >= c.satiation_limit
            })
        {
            creature.alive = false;
            tracing::info!(
                scavenger = %creature.id,
                satiation = creature.satiation,
                "Scavenger left"
            );
            report.despawned_creatures.push(CreatureKind::Scavenger);
        }
        state.creatures.retain(|cr| cr.alive);

        if !self.scavengers.tick(dt, rng) {
            return;
        }
        if state.foods.len() >= c.scavenger_food_threshold
            && state.creature_count(CreatureKind::Scavenger) < c.max_scavengers
        {
            spawn_creature(state, CreatureKind::Scavenger, rng);
            tracing::info!(food = state.foods.len(), "Scavenger spawned");
            report.spawned_creatures.push(CreatureKind::Scavenger);
        } else {
            report.skipped_spawns += 1;
        }
    }

    fn spawn_food_batch<R: Rng + ?Sized>(
        &mut self,
        state: &mut WorldState,
        config: &AppConfig,
        dt: f64,
        rng: &mut R,
        report: &mut LifecycleReport,
    ) {
        if !self.food.tick(dt, rng) {
            return;
        }
        let room = config.food.max_food.saturating_sub(state.foods.len());
        if room == 0 {
            report.skipped_spawns += 1;
            return;
        }
        let batch = rng.gen_range(1..=config.food.batch_size.max(1)).min(room);
        for _ in 0..batch {
            spawn_food(state, config, rng);
        }
        report.spawned_food += batch;
    }
}

/// Adds a Normal snake at a random position with a random heading.
pub fn spawn_snake<R: Rng + ?Sized>(
    state: &mut WorldState,
    config: &AppConfig,
    rng: &mut R,
) -> SnakeId {
    let id = new_id(rng);
    let head = random_point(rng, state.width, state.height, 50.0);
    let heading = random_heading(rng);
    let mut snake = Snake::new(
        id,
        head,
        heading,
        config.lifecycle.initial_snake_size,
        config.motion.segment_spacing,
    );
    snake.velocity = heading * (config.motion.base_max_speed * 0.5);
    state.snakes.push(snake);
    tracing::debug!(snake = %id, x = head.x, y = head.y, "Snake spawned");
    id
}

fn food_effect(kind: FoodKind, config: &AppConfig) -> EffectDescriptor {
    let f = &config.food;
    match kind {
        FoodKind::SpeedBoost => f.speed_boost,
        FoodKind::Slow => f.slow,
        FoodKind::Immunity => f.immunity,
        FoodKind::Growth => f.growth,
        FoodKind::Shrink => f.shrink,
        FoodKind::Plain => EffectDescriptor::new(0.0, 0.0),
    }
}

/// Adds one food item; special with probability `food.special_chance`.
pub fn spawn_food<R: Rng + ?Sized>(
    state: &mut WorldState,
    config: &AppConfig,
    rng: &mut R,
) -> FoodId {
    let id = new_id(rng);
    let position = random_point(rng, state.width, state.height, config.food.radius);
    let food = if rng.gen_bool(config.food.special_chance) {
        let kind = FoodKind::SPECIAL[rng.gen_range(0..FoodKind::SPECIAL.len())];
        Food::special(id, position, kind, food_effect(kind, config))
    } else {
        Food::plain(id, position)
    };
    state.foods.push(food);
    id
}

/// Places a hazard of `kind`. Black holes keep their minimum separation from
/// each other; when no valid spot is found within the configured number of
/// attempts the spawn is abandoned.
pub fn spawn_hazard<R: Rng + ?Sized>(
    state: &mut WorldState,
    kind: HazardKind,
    config: &AppConfig,
    rng: &mut R,
) -> Option<HazardId> {
    let h = &config.hazards;
    let params = hazard_params(kind, config);
    let margin = params.radius + 30.0;

    let mut position = None;
    for _ in 0..h.placement_attempts {
        let p = random_point(rng, state.width, state.height, margin);
        let clear = kind != HazardKind::BlackHole
            || state
                .hazards
                .iter()
                .filter(|z| z.kind == HazardKind::BlackHole)
                .all(|z| z.position.distance(p) >= h.black_hole_min_separation);
        if clear {
            position = Some(p);
            break;
        }
    }
    let Some(position) = position else {
        tracing::debug!(?kind, "No room for hazard");
        return None;
    };

    let strength = match kind {
        HazardKind::SpeedZone(ZoneTempo::Fast) => h.fast_zone_multiplier,
        HazardKind::SpeedZone(ZoneTempo::Slow) => h.slow_zone_multiplier,
        _ => params.strength,
    };
    let id = new_id(rng);
    state.hazards.push(Hazard {
        id,
        kind,
        position,
        radius: params.radius,
        strength,
        remaining: params.lifetime,
    });
    tracing::info!(hazard = %id, ?kind, x = position.x, y = position.y, "Hazard spawned");
    Some(id)
}

pub fn spawn_creature<R: Rng + ?Sized>(
    state: &mut WorldState,
    kind: CreatureKind,
    rng: &mut R,
) -> CreatureId {
    let id = new_id(rng);
    let position = random_point(rng, state.width, state.height, 20.0);
    state.creatures.push(Creature::new(id, kind, position));
    id
}
