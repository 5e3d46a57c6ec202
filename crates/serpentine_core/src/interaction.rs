//! Collision detection and resolution.
//!
//! Detection reads a frozen snapshot of the live snakes taken after movement
//! and emits [`InteractionCommand`]s; nothing is mutated until every check of
//! the tick has run. Commands are then applied in a fixed order:
//! consumption, predation growth, scavenging, deaths.

use crate::config::AppConfig;
use crate::effects::EffectRegistry;
use crate::spatial_hash::SpatialHash;
use crate::state::WorldState;
use serpentine_data::{
    CreatureId, CreatureKind, DeathCause, EffectFlags, FoodId, FoodKind, HazardKind,
    SnakeId, SurvivalState, Vec2, ZoneTempo,
};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionCommand {
    EatFood {
        snake: SnakeId,
        food: FoodId,
    },
    Kill {
        prey: SnakeId,
        hunter: SnakeId,
        growth: usize,
    },
    RipperKill {
        target: SnakeId,
        ripper: CreatureId,
    },
    Scavenge {
        scavenger: CreatureId,
        food: FoodId,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InteractionResult {
    pub foods_eaten: usize,
    pub foods_scavenged: usize,
    pub effects_applied: usize,
    pub promotions: Vec<SnakeId>,
    pub deaths: Vec<(SnakeId, DeathCause)>,
}

/// Frozen per-snake data the detection phase reads.
#[derive(Debug, Clone)]
struct SnakeFrame {
    id: SnakeId,
    head: Vec2,
    size: usize,
    hunter: bool,
    immune: bool,
}

#[derive(Debug, Default)]
pub struct InteractionResolver {
    frames: Vec<SnakeFrame>,
    segments: SpatialHash,
    segment_owner: Vec<usize>,
    commands: Vec<InteractionCommand>,
}

impl InteractionResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one full resolution pass. `dt` only scales hazard-driven food
    /// drift.
    pub fn resolve(
        &mut self,
        state: &mut WorldState,
        effects: &mut EffectRegistry,
        config: &AppConfig,
        dt: f64,
    ) -> InteractionResult {
        self.snapshot(state, effects, config);
        self.commands.clear();

        let claimed_food = self.detect_food(state, config);
        self.detect_scavenging(state, config, claimed_food);
        let claimed_prey = self.detect_predation(config);
        self.detect_rippers(state, config, claimed_prey);

        let result = self.apply(state, effects, config);
        apply_hazards(state, effects, config, dt);
        result
    }

    fn snapshot(&mut self, state: &WorldState, effects: &EffectRegistry, config: &AppConfig) {
        self.frames.clear();
        self.segment_owner.clear();
        let mut points = Vec::new();
        for snake in state.live_snakes() {
            let owner = self.frames.len();
            self.frames.push(SnakeFrame {
                id: snake.id,
                head: snake.head(),
                size: snake.size,
                hunter: snake.is_hunter(),
                immune: effects.is_immune(snake),
            });
            for &segment in &snake.segments {
                points.push(segment);
                self.segment_owner.push(owner);
            }
        }
        let cell = (config.motion.segment_radius * 4.0).max(1.0);
        if self.segments.cell_size != cell
            || self.segments.width != state.width
            || self.segments.height != state.height
        {
            self.segments = SpatialHash::new(cell, state.width, state.height);
        }
        self.segments.build(&points);
    }

    fn detect_food(&mut self, state: &WorldState, config: &AppConfig) -> HashSet<FoodId> {
        let reach = config.motion.segment_radius + config.food.radius;
        let mut claimed = HashSet::new();
        for frame in &self.frames {
            for food in &state.foods {
                if !claimed.contains(&food.id) && frame.head.distance(food.position) < reach {
                    claimed.insert(food.id);
                    self.commands.push(InteractionCommand::EatFood {
                        snake: frame.id,
                        food: food.id,
                    });
                }
            }
        }
        claimed
    }

    fn detect_scavenging(
        &mut self,
        state: &WorldState,
        config: &AppConfig,
        mut claimed: HashSet<FoodId>,
    ) {
        let reach = config.creatures.scavenger_eat_range + config.food.radius;
        for scavenger in state
            .creatures
            .iter()
            .filter(|c| c.alive && c.kind == CreatureKind::Scavenger)
        {
            let hit = state.foods.iter().find(|f| {
                !claimed.contains(&f.id) && f.position.distance(scavenger.position) < reach
            });
            if let Some(food) = hit {
                claimed.insert(food.id);
                self.commands.push(InteractionCommand::Scavenge {
                    scavenger: scavenger.id,
                    food: food.id,
                });
            }
        }
    }

    /// Hunters go largest first (ties by id). A snake is eaten at most once,
    /// a hunter eats at most one prey, and a hunter already claimed as prey
    /// this tick does not hunt.
    fn detect_predation(&mut self, config: &AppConfig) -> HashSet<SnakeId> {
        let reach = config.motion.segment_radius * 2.0;
        let mut order: Vec<usize> = (0..self.frames.len())
            .filter(|&i| self.frames[i].hunter)
            .collect();
        order.sort_by(|&a, &b| {
            let (fa, fb) = (&self.frames[a], &self.frames[b]);
            fb.size.cmp(&fa.size).then(fa.id.cmp(&fb.id))
        });

        let mut eaten: HashSet<SnakeId> = HashSet::new();
        let mut candidates = Vec::new();
        for hi in order {
            let hunter = &self.frames[hi];
            if eaten.contains(&hunter.id) {
                continue;
            }
            self.segments.query_into(hunter.head, reach, &mut candidates);
            let mut best: Option<(usize, f64)> = None;
            for &slot in &candidates {
                let owner = self.segment_owner[slot];
                let prey = &self.frames[owner];
                if owner == hi
                    || prey.immune
                    || prey.size >= hunter.size
                    || eaten.contains(&prey.id)
                {
                    continue;
                }
                let d = self
                    .segments
                    .point(slot)
                    .map_or(f64::INFINITY, |p| p.distance(hunter.head));
                let better = match best {
                    None => true,
                    Some((b_owner, b_d)) => d < b_d || (d == b_d && owner < b_owner),
                };
                if better {
                    best = Some((owner, d));
                }
            }
            if let Some((owner, _)) = best {
                let prey = &self.frames[owner];
                eaten.insert(prey.id);
                self.commands.push(InteractionCommand::Kill {
                    prey: prey.id,
                    hunter: hunter.id,
                    growth: (prey.size / 3).max(1),
                });
            }
        }
        eaten
    }

    fn detect_rippers(
        &mut self,
        state: &WorldState,
        config: &AppConfig,
        mut eaten: HashSet<SnakeId>,
    ) {
        let reach = config.creatures.ripper_attack_range + config.motion.segment_radius;
        for ripper in state
            .creatures
            .iter()
            .filter(|c| c.alive && c.kind == CreatureKind::Ripper)
        {
            let Some(target) = ripper.target else {
                continue;
            };
            let Some(frame) = self.frames.iter().find(|f| f.id == target) else {
                continue;
            };
            if frame.hunter
                && !eaten.contains(&target)
                && frame.head.distance(ripper.position) <= reach
            {
                eaten.insert(target);
                self.commands.push(InteractionCommand::RipperKill {
                    target,
                    ripper: ripper.id,
                });
            }
        }
    }

    fn apply(
        &self,
        state: &mut WorldState,
        effects: &mut EffectRegistry,
        config: &AppConfig,
    ) -> InteractionResult {
        let mut result = InteractionResult::default();
        let tick = state.tick;

        for cmd in &self.commands {
            let InteractionCommand::EatFood { snake, food } = *cmd else {
                continue;
            };
            let Some(idx) = state.foods.iter().position(|f| f.id == food) else {
                continue;
            };
            let item = state.foods.remove(idx);
            let Some(s) = state.snake_mut(snake) else {
                continue;
            };

            match item.kind {
                FoodKind::Growth => {
                    let bonus = item.effect.map_or(1.0, |e| e.magnitude).max(0.0) as usize;
                    s.grow(bonus.max(1));
                }
                FoodKind::Shrink => {
                    let loss = item.effect.map_or(0.0, |e| e.magnitude).max(0.0) as usize;
                    s.shrink(loss, config.food.shrink_floor);
                }
                _ => s.grow(1),
            }
            if let (Some(kind), Some(desc)) = (item.kind.effect_kind(), item.effect) {
                effects.apply(s, kind, desc);
                result.effects_applied += 1;
            }

            s.food_eaten += 1;
            s.starvation_timer = 0.0;
            s.survival = SurvivalState::Fed;
            s.last_fed_tick = Some(tick);
            result.foods_eaten += 1;

            if s.promote_if_ready(config.lifecycle.hunter_food_threshold) {
                info!(
                    snake = %s.id,
                    size = s.size,
                    food_eaten = s.food_eaten,
                    "Snake became a hunter"
                );
                result.promotions.push(s.id);
            }
        }

        for cmd in &self.commands {
            if let InteractionCommand::Kill { hunter, growth, .. } = *cmd {
                if let Some(h) = state.snake_mut(hunter) {
                    h.grow(growth);
                }
            }
        }

        for cmd in &self.commands {
            if let InteractionCommand::Scavenge { scavenger, food } = *cmd {
                let before = state.foods.len();
                state.foods.retain(|f| f.id != food);
                if state.foods.len() < before {
                    if let Some(c) = state.creatures.iter_mut().find(|c| c.id == scavenger) {
                        c.satiation += 1;
                    }
                    result.foods_scavenged += 1;
                }
            }
        }

        for cmd in &self.commands {
            let (target, cause) = match *cmd {
                InteractionCommand::Kill { prey, hunter, .. } => {
                    (prey, DeathCause::Predation { hunter })
                }
                InteractionCommand::RipperKill { target, .. } => (target, DeathCause::Ripper),
                _ => continue,
            };
            if let Some(s) = state.snake_mut(target) {
                if s.alive {
                    s.kill(cause);
                    s.survival = SurvivalState::Dead;
                    debug!(snake = %target, ?cause, "Snake killed");
                    result.deaths.push((target, cause));
                }
            }
        }

        result
    }
}

/// Pull acceleration towards a hazard centre, zero inside the dead zone and
/// outside the radius.
#[must_use]
pub fn hazard_pull(center: Vec2, radius: f64, strength: f64, dead_zone: f64, at: Vec2) -> Vec2 {
    let offset = center - at;
    let d = offset.length();
    if d <= dead_zone || d >= radius || radius <= 0.0 {
        return Vec2::ZERO;
    }
    offset.normalized().map_or(Vec2::ZERO, |dir| dir * (strength * (radius - d) / radius))
}

/// Rewrites the transient effects of every live snake from current hazard
/// overlap and drifts food towards pulling hazards.
fn apply_hazards(
    state: &mut WorldState,
    effects: &mut EffectRegistry,
    config: &AppConfig,
    dt: f64,
) {
    let h = &config.hazards;
    effects.clear_transients();

    for snake in state.snakes.iter().filter(|s| s.alive) {
        let head = snake.head();
        for hazard in state.hazards.iter().filter(|z| !z.is_expired()) {
            match hazard.kind {
                HazardKind::BlackHole | HazardKind::FoodMagnet => {
                    let pull = hazard_pull(
                        hazard.position,
                        hazard.radius,
                        hazard.strength,
                        h.pull_dead_zone,
                        head,
                    );
                    if pull != Vec2::ZERO {
                        let t = effects.transient_mut(snake.id);
                        t.pull += pull;
                        t.flags |= EffectFlags::HAZARD_PULL;
                    }
                }
                HazardKind::SpeedZone(tempo) => {
                    if hazard.contains(head) {
                        let t = effects.transient_mut(snake.id);
                        t.zone_multiplier *= hazard.strength;
                        t.flags |= match tempo {
                            ZoneTempo::Fast => EffectFlags::FAST_ZONE,
                            ZoneTempo::Slow => EffectFlags::SLOW_ZONE,
                        };
                    }
                }
            }
        }
    }

    if h.food_drift_factor <= 0.0 {
        return;
    }
    let pulling: Vec<(Vec2, f64, f64)> = state
        .hazards
        .iter()
        .filter(|z| !z.is_expired() && z.kind.pulls())
        .map(|z| (z.position, z.radius, z.strength))
        .collect();
    for food in &mut state.foods {
        let drift = pulling.iter().fold(Vec2::ZERO, |acc, &(c, r, s)| {
            acc + hazard_pull(c, r, s, h.pull_dead_zone, food.position)
        });
        food.position += drift * (h.food_drift_factor * dt);
    }
}
