//! Rule ladder used when no classifier is loaded, when a classifier fails,
//! and on exploration ticks.
//!
//! Priority, first match wins:
//! 1. hunter with visible prey and no threat: hunt
//! 2. hunter with visible prey under threat: weigh hunting against fleeing
//! 3. any snake under threat and not immune: flee
//! 4. food somewhere: seek the nearest food on a safe path
//! 5. otherwise wander

use crate::config::AppConfig;
use crate::effects::EffectRegistry;
use crate::movement;
use crate::spatial_hash::SpatialIndex;
use crate::state::WorldState;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serpentine_data::{HazardKind, Snake, SnakeId, Vec2, WallMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    Hunt,
    EvaluateRisk,
    Flee,
    SeekFood,
    Wander,
}

/// Steering mode a rule resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    Hunt,
    Flee,
    SeekFood,
    Wander,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleDecision {
    pub rule: Rule,
    pub behavior: Behavior,
    pub direction: Vec2,
}

#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub state: &'a WorldState,
    pub spatial: &'a SpatialIndex,
    pub effects: &'a EffectRegistry,
    pub config: &'a AppConfig,
}

struct Threat {
    head: Vec2,
    distance: f64,
}

/// Hunters at least `fear_margin` larger than `snake`, inside the threat
/// detection radius, in index order.
fn threats(snake: &Snake, ctx: &RuleContext<'_>) -> Vec<Threat> {
    let head = snake.head();
    let margin = ctx.config.ai.fear_margin;
    let mut nearby = Vec::new();
    ctx.spatial
        .snakes_within(head, ctx.config.ai.threat_detection_radius, &mut nearby);
    nearby
        .into_iter()
        .filter(|&id| id != snake.id)
        .filter_map(|id| ctx.state.snake(id))
        .filter(|other| other.alive && other.is_hunter() && other.size >= snake.size + margin)
        .map(|other| Threat {
            head: other.head(),
            distance: other.head().distance(head),
        })
        .collect()
}

fn nearest_prey<'a>(snake: &Snake, ctx: &RuleContext<'a>) -> Option<(&'a Snake, f64)> {
    let state = ctx.state;
    ctx.spatial
        .nearest_snake(snake.head(), ctx.config.ai.prey_detection_radius, |id: SnakeId| {
            id != snake.id
                && state
                    .snake(id)
                    .is_some_and(|o| o.alive && o.size < snake.size && !ctx.effects.is_immune(o))
        })
        .and_then(|(id, d)| state.snake(id).map(|s| (s, d)))
}

/// Point to steer at when chasing `prey`.
///
/// The head is chased directly while its lateral offset from our heading is
/// reachable within the time it takes to get there. Otherwise the body
/// segment ahead of us that is easiest to reach is targeted instead.
#[must_use]
pub fn intercept_point(hunter: &Snake, prey: &Snake, max_speed: f64, max_accel: f64) -> Vec2 {
    let head = hunter.head();
    let Some(heading) = hunter.heading() else {
        return prey.head();
    };
    let side = heading.perp();
    let slack = |target: Vec2| {
        let offset = target - head;
        let t = offset.length() / max_speed.max(f64::EPSILON);
        let reachable = 0.5 * max_accel * t * t;
        offset.dot(side).abs() - reachable
    };
    if slack(prey.head()) <= 0.0 {
        return prey.head();
    }
    prey.segments
        .iter()
        .copied()
        .filter(|&s| (s - head).dot(heading) > 0.0)
        .map(|s| (s, slack(s)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(prey.head(), |(s, _)| s)
}

/// Push away from walls closer than the configured avoidance distance.
#[must_use]
pub fn wall_avoidance(head: Vec2, width: f64, height: f64, distance: f64, strength: f64) -> Vec2 {
    if distance <= 0.0 {
        return Vec2::ZERO;
    }
    let mut push = Vec2::ZERO;
    if head.x < distance {
        push.x += strength * (1.0 - head.x.max(0.0) / distance);
    }
    if width - head.x < distance {
        push.x -= strength * (1.0 - (width - head.x).max(0.0) / distance);
    }
    if head.y < distance {
        push.y += strength * (1.0 - head.y.max(0.0) / distance);
    }
    if height - head.y < distance {
        push.y -= strength * (1.0 - (height - head.y).max(0.0) / distance);
    }
    push
}

/// Push out of the nearest black hole whose radius contains `head`,
/// strongest near the centre.
fn black_hole_avoidance(head: Vec2, ctx: &RuleContext<'_>) -> Vec2 {
    let state = ctx.state;
    let Some(hole) = ctx
        .spatial
        .nearest_hazard(head, f64::INFINITY, |id| {
            state.hazard(id).is_some_and(|h| h.kind == HazardKind::BlackHole)
        })
        .and_then(|(id, _)| state.hazard(id))
    else {
        return Vec2::ZERO;
    };
    let distance = head.distance(hole.position);
    if distance >= hole.radius {
        return Vec2::ZERO;
    }
    (head - hole.position).normalized().map_or(Vec2::ZERO, |away| {
        away * (ctx.config.ai.avoidance_strength * (1.0 - distance / hole.radius))
    })
}

fn flee_direction(snake: &Snake, threats: &[Threat], ctx: &RuleContext<'_>) -> Vec2 {
    let head = snake.head();
    let mut away = Vec2::ZERO;
    for threat in threats {
        if let Some(dir) = (head - threat.head).normalized() {
            away += dir * (1.0 / threat.distance.max(1.0));
        }
    }
    let away = away.normalized().unwrap_or_else(|| {
        snake
            .heading()
            .map_or(Vec2::new(1.0, 0.0), |h| h.perp())
    });
    let ai = &ctx.config.ai;
    away + wall_avoidance(
        head,
        ctx.state.width,
        ctx.state.height,
        ai.wall_avoid_distance,
        ai.avoidance_strength,
    )
}

fn seek_food(snake: &Snake, ctx: &RuleContext<'_>) -> Option<Vec2> {
    let head = snake.head();
    let radius = ctx.config.ai.threat_detection_radius;
    let dangers: Vec<Vec2> = if ctx.effects.is_immune(snake) {
        Vec::new()
    } else {
        ctx.state
            .live_snakes()
            .filter(|o| o.id != snake.id && o.is_hunter() && o.size > snake.size)
            .map(Snake::head)
            .collect()
    };
    let safe = ctx.spatial.nearest_food_where(head, f64::INFINITY, |_, food| {
        dangers
            .iter()
            .all(|d| d.distance_to_segment(head, food) >= radius)
    });
    let (id, _) = safe.or_else(|| ctx.spatial.nearest_food(head, f64::INFINITY))?;
    ctx.state.food(id).map(|f| f.position - head)
}

fn wander<R: Rng + ?Sized>(snake: &Snake, jitter: f64, rng: &mut R) -> Vec2 {
    let base = match snake.heading() {
        Some(h) => h,
        None => {
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            Vec2::new(angle.cos(), angle.sin())
        }
    };
    let turn = if jitter > 0.0 {
        rng.gen_range(-jitter..=jitter)
    } else {
        0.0
    };
    let (sin, cos) = turn.sin_cos();
    Vec2::new(base.x * cos - base.y * sin, base.x * sin + base.y * cos)
}

/// Runs the ladder for one snake.
pub fn evaluate<R: Rng + ?Sized>(
    snake: &Snake,
    ctx: &RuleContext<'_>,
    rng: &mut R,
) -> RuleDecision {
    let threats = threats(snake, ctx);
    let immune = ctx.effects.is_immune(snake);
    let prey = if snake.is_hunter() {
        nearest_prey(snake, ctx)
    } else {
        None
    };

    let decision = |rule, behavior, direction| RuleDecision {
        rule,
        behavior,
        direction,
    };

    if let Some((prey, prey_dist)) = prey {
        let initial = ctx.config.lifecycle.initial_snake_size;
        let mult = ctx.effects.speed_multiplier(snake);
        let speed = movement::max_speed(&ctx.config.motion, snake.size, initial) * mult;
        let accel = movement::max_acceleration(&ctx.config.motion, snake.size, initial) * mult;
        let chase = intercept_point(snake, prey, speed, accel) - snake.head();

        if threats.is_empty() {
            return decision(Rule::Hunt, Behavior::Hunt, chase);
        }

        let gain = (prey.size / 3).max(1) as f64;
        let p_success = (1.0 - prey_dist / ctx.config.ai.prey_detection_radius).clamp(0.0, 1.0);
        let nearest_threat = threats
            .iter()
            .map(|t| t.distance)
            .fold(f64::INFINITY, f64::min);
        let p_caught = if immune {
            0.0
        } else {
            (1.0 - nearest_threat / ctx.config.ai.threat_detection_radius).clamp(0.0, 1.0)
        };
        let size = snake.size as f64;
        let ev_hunt = p_success * gain - p_caught * size;
        let ev_flee = -0.5 * p_caught * size;
        return if ev_hunt > ev_flee {
            decision(Rule::EvaluateRisk, Behavior::Hunt, chase)
        } else {
            decision(
                Rule::EvaluateRisk,
                Behavior::Flee,
                flee_direction(snake, &threats, ctx),
            )
        };
    }

    if !threats.is_empty() && !immune {
        return decision(Rule::Flee, Behavior::Flee, flee_direction(snake, &threats, ctx));
    }

    let ai = &ctx.config.ai;
    let walls = if ctx.config.world.wall_mode == WallMode::Destructive {
        wall_avoidance(
            snake.head(),
            ctx.state.width,
            ctx.state.height,
            ai.wall_avoid_distance,
            ai.avoidance_strength,
        )
    } else {
        Vec2::ZERO
    };
    let walls = walls + black_hole_avoidance(snake.head(), ctx);

    if let Some(to_food) = seek_food(snake, ctx) {
        let dir = to_food.normalized().unwrap_or(Vec2::ZERO) + walls;
        return decision(Rule::SeekFood, Behavior::SeekFood, dir);
    }

    decision(
        Rule::Wander,
        Behavior::Wander,
        wander(snake, ai.wander_jitter, rng) + walls,
    )
}
