//! Configuration management for simulation parameters.
//!
//! Every tunable of a session lives in [`AppConfig`], which maps one-to-one
//! onto a `config.toml` file. The configuration is read once at session start,
//! validated, and then treated as immutable for the lifetime of the session.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 1000.0
//! height = 800.0
//! seed = 42
//! wall_mode = "destructive"
//!
//! [food]
//! max_food = 15
//! special_chance = 0.15
//!
//! [ai]
//! fear_margin = 5
//! exploration_rate = 0.1
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serpentine_data::data::effect::EffectDescriptor;
use serpentine_data::data::WallMode;

/// World bounds, tick timing and the initial population.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Seed of the session RNG. `None` draws one from the OS at start.
    pub seed: Option<u64>,
    pub wall_mode: WallMode,
    /// Reference tick length in seconds.
    pub dt: f64,
    pub min_dt: f64,
    pub max_dt: f64,
    pub initial_snakes: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
            seed: None,
            wall_mode: WallMode::Wrap,
            dt: 1.0 / 60.0,
            min_dt: 1e-4,
            max_dt: 0.1,
            initial_snakes: 6,
        }
    }
}

/// Size-dependent speed and acceleration curves.
///
/// `max_speed(size) = base_max_speed / (1 + (size - initial_size) * speed_size_penalty)`,
/// floored at `min_speed`. Acceleration follows the same shape.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MotionConfig {
    pub segment_radius: f64,
    pub segment_spacing: f64,
    /// Units per second.
    pub base_max_speed: f64,
    pub min_speed: f64,
    /// Units per second squared.
    pub base_acceleration: f64,
    pub min_acceleration: f64,
    pub speed_size_penalty: f64,
    pub accel_size_penalty: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            segment_radius: 8.0,
            segment_spacing: 5.0,
            base_max_speed: 300.0,
            min_speed: 30.0,
            base_acceleration: 720.0,
            min_acceleration: 180.0,
            speed_size_penalty: 0.01,
            accel_size_penalty: 0.01,
        }
    }
}

/// Food placement and the effects carried by special food.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FoodConfig {
    pub radius: f64,
    pub max_food: usize,
    pub initial_food: usize,
    /// Mean seconds between batch spawns.
    pub spawn_interval: f64,
    pub batch_size: usize,
    /// Probability that a spawned item is of a special kind.
    pub special_chance: f64,
    pub speed_boost: EffectDescriptor,
    pub slow: EffectDescriptor,
    pub immunity: EffectDescriptor,
    /// Magnitude is the instant size gain.
    pub growth: EffectDescriptor,
    /// Magnitude is the instant size loss.
    pub shrink: EffectDescriptor,
    /// Smallest size shrink food can leave behind (never below 2).
    pub shrink_floor: usize,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            radius: 7.0,
            max_food: 15,
            initial_food: 10,
            spawn_interval: 0.5,
            batch_size: 5,
            special_chance: 0.15,
            speed_boost: EffectDescriptor::new(5.0, 1.5),
            slow: EffectDescriptor::new(5.0, 0.5),
            immunity: EffectDescriptor::new(8.0, 1.0),
            growth: EffectDescriptor::new(1.0, 3.0),
            shrink: EffectDescriptor::new(1.0, 2.0),
            shrink_floor: 2,
        }
    }
}

/// Spawn governance and geometry of one hazard kind.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HazardParams {
    pub max: usize,
    pub spawn_interval: f64,
    pub lifetime: f64,
    pub radius: f64,
    /// Pull acceleration (units/s^2) for black holes and magnets.
    pub strength: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HazardConfig {
    pub black_hole: HazardParams,
    pub speed_zone: HazardParams,
    pub food_magnet: HazardParams,
    pub fast_zone_multiplier: f64,
    pub slow_zone_multiplier: f64,
    pub black_hole_min_separation: f64,
    pub placement_attempts: u32,
    /// No pull is applied closer than this to a hazard centre.
    pub pull_dead_zone: f64,
    /// Fraction of a hazard's pull converted into food drift speed.
    pub food_drift_factor: f64,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            black_hole: HazardParams {
                max: 2,
                spawn_interval: 15.0,
                lifetime: 12.0,
                radius: 120.0,
                strength: 360.0,
            },
            speed_zone: HazardParams {
                max: 2,
                spawn_interval: 10.0,
                lifetime: 10.0,
                radius: 90.0,
                strength: 1.0,
            },
            food_magnet: HazardParams {
                max: 1,
                spawn_interval: 20.0,
                lifetime: 10.0,
                radius: 150.0,
                strength: 120.0,
            },
            fast_zone_multiplier: 1.5,
            slow_zone_multiplier: 0.5,
            black_hole_min_separation: 250.0,
            placement_attempts: 10,
            pull_dead_zone: 5.0,
            food_drift_factor: 0.25,
        }
    }
}

/// Ripper and Scavenger governance and motion.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CreatureConfig {
    pub max_rippers: usize,
    pub ripper_spawn_interval: f64,
    /// Live hunter fraction above which rippers appear.
    pub hunter_fraction_threshold: f64,
    pub ripper_speed_multiplier: f64,
    pub ripper_accel_multiplier: f64,
    pub ripper_detection_range: f64,
    pub ripper_attack_range: f64,
    pub max_scavengers: usize,
    pub scavenger_spawn_interval: f64,
    pub scavenger_food_threshold: usize,
    pub scavenger_speed_multiplier: f64,
    pub scavenger_accel_multiplier: f64,
    pub scavenger_detection_range: f64,
    pub scavenger_eat_range: f64,
    /// Foods a scavenger takes before leaving.
    pub satiation_limit: u32,
    /// Fraction of full speed used while no target is in range.
    pub patrol_speed_factor: f64,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            max_rippers: 3,
            ripper_spawn_interval: 5.0,
            hunter_fraction_threshold: 0.5,
            ripper_speed_multiplier: 2.5,
            ripper_accel_multiplier: 3.0,
            ripper_detection_range: 150.0,
            ripper_attack_range: 20.0,
            max_scavengers: 2,
            scavenger_spawn_interval: 8.0,
            scavenger_food_threshold: 10,
            scavenger_speed_multiplier: 1.8,
            scavenger_accel_multiplier: 2.0,
            scavenger_detection_range: 120.0,
            scavenger_eat_range: 8.0,
            satiation_limit: 10,
            patrol_speed_factor: 0.4,
        }
    }
}

/// Decision pipeline parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AiConfig {
    /// Size advantage a hunter needs before it counts as a threat.
    pub fear_margin: usize,
    pub threat_detection_radius: f64,
    pub prey_detection_radius: f64,
    pub wall_avoid_distance: f64,
    pub avoidance_strength: f64,
    /// Probability per snake per tick of ignoring a loaded classifier and
    /// consulting the rule ladder instead.
    pub exploration_rate: f64,
    /// Heading jitter applied while wandering, in radians.
    pub wander_jitter: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            fear_margin: 5,
            threat_detection_radius: 80.0,
            prey_detection_radius: 200.0,
            wall_avoid_distance: 32.0,
            avoidance_strength: 0.5,
            exploration_rate: 0.0,
            wander_jitter: 0.3,
        }
    }
}

/// Snake spawning, starvation and role transition.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LifecycleConfig {
    pub initial_snake_size: usize,
    pub max_snakes: usize,
    pub snake_spawn_interval: f64,
    pub hunter_food_threshold: u32,
    pub starvation_warning: f64,
    pub starvation_death: f64,
    /// Ticks between metrics summaries.
    pub report_interval: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            initial_snake_size: 3,
            max_snakes: 20,
            snake_spawn_interval: 2.0,
            hunter_food_threshold: 10,
            starvation_warning: 8.0,
            starvation_death: 10.0,
            report_interval: 1000,
        }
    }
}

/// Complete session configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub motion: MotionConfig,
    pub food: FoodConfig,
    pub hazards: HazardConfig,
    pub creatures: CreatureConfig,
    pub ai: AiConfig,
    pub lifecycle: LifecycleConfig,
}

fn ensure(condition: bool, field: &'static str, reason: &str) -> ConfigResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, reason))
    }
}

fn positive(value: f64, field: &'static str) -> ConfigResult<()> {
    ensure(
        value.is_finite() && value > 0.0,
        field,
        "must be finite and positive",
    )
}

fn non_negative(value: f64, field: &'static str) -> ConfigResult<()> {
    ensure(
        value.is_finite() && value >= 0.0,
        field,
        "must be finite and non-negative",
    )
}

fn probability(value: f64, field: &'static str) -> ConfigResult<()> {
    ensure(
        (0.0..=1.0).contains(&value),
        field,
        "must lie in [0.0, 1.0]",
    )
}

fn effect(descriptor: &EffectDescriptor, field: &'static str) -> ConfigResult<()> {
    positive(descriptor.duration, field)?;
    non_negative(descriptor.magnitude, field)
}

fn hazard(params: &HazardParams, field: &'static str) -> ConfigResult<()> {
    positive(params.spawn_interval, field)?;
    positive(params.lifetime, field)?;
    positive(params.radius, field)?;
    non_negative(params.strength, field)
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns the first offending field. Values are never clamped here:
    /// anything that defines world bounds or thresholds is authoritative.
    pub fn validate(&self) -> ConfigResult<()> {
        let w = &self.world;
        positive(w.width, "world.width")?;
        positive(w.height, "world.height")?;
        positive(w.dt, "world.dt")?;
        positive(w.min_dt, "world.min_dt")?;
        positive(w.max_dt, "world.max_dt")?;
        ensure(w.min_dt <= w.max_dt, "world.min_dt", "must not exceed world.max_dt")?;

        let m = &self.motion;
        positive(m.segment_radius, "motion.segment_radius")?;
        positive(m.segment_spacing, "motion.segment_spacing")?;
        positive(m.base_max_speed, "motion.base_max_speed")?;
        positive(m.min_speed, "motion.min_speed")?;
        ensure(
            m.min_speed <= m.base_max_speed,
            "motion.min_speed",
            "must not exceed motion.base_max_speed",
        )?;
        positive(m.base_acceleration, "motion.base_acceleration")?;
        positive(m.min_acceleration, "motion.min_acceleration")?;
        ensure(
            m.min_acceleration <= m.base_acceleration,
            "motion.min_acceleration",
            "must not exceed motion.base_acceleration",
        )?;
        non_negative(m.speed_size_penalty, "motion.speed_size_penalty")?;
        non_negative(m.accel_size_penalty, "motion.accel_size_penalty")?;

        let f = &self.food;
        positive(f.radius, "food.radius")?;
        positive(f.spawn_interval, "food.spawn_interval")?;
        ensure(f.batch_size > 0, "food.batch_size", "must be at least 1")?;
        ensure(
            f.initial_food <= f.max_food,
            "food.initial_food",
            "must not exceed food.max_food",
        )?;
        probability(f.special_chance, "food.special_chance")?;
        effect(&f.speed_boost, "food.speed_boost")?;
        effect(&f.slow, "food.slow")?;
        effect(&f.immunity, "food.immunity")?;
        effect(&f.growth, "food.growth")?;
        effect(&f.shrink, "food.shrink")?;

        let h = &self.hazards;
        hazard(&h.black_hole, "hazards.black_hole")?;
        hazard(&h.speed_zone, "hazards.speed_zone")?;
        hazard(&h.food_magnet, "hazards.food_magnet")?;
        positive(h.fast_zone_multiplier, "hazards.fast_zone_multiplier")?;
        positive(h.slow_zone_multiplier, "hazards.slow_zone_multiplier")?;
        non_negative(h.black_hole_min_separation, "hazards.black_hole_min_separation")?;
        ensure(
            h.placement_attempts > 0,
            "hazards.placement_attempts",
            "must be at least 1",
        )?;
        non_negative(h.pull_dead_zone, "hazards.pull_dead_zone")?;
        non_negative(h.food_drift_factor, "hazards.food_drift_factor")?;

        let c = &self.creatures;
        positive(c.ripper_spawn_interval, "creatures.ripper_spawn_interval")?;
        probability(c.hunter_fraction_threshold, "creatures.hunter_fraction_threshold")?;
        positive(c.ripper_speed_multiplier, "creatures.ripper_speed_multiplier")?;
        positive(c.ripper_accel_multiplier, "creatures.ripper_accel_multiplier")?;
        non_negative(c.ripper_detection_range, "creatures.ripper_detection_range")?;
        positive(c.ripper_attack_range, "creatures.ripper_attack_range")?;
        positive(c.scavenger_spawn_interval, "creatures.scavenger_spawn_interval")?;
        positive(c.scavenger_speed_multiplier, "creatures.scavenger_speed_multiplier")?;
        positive(c.scavenger_accel_multiplier, "creatures.scavenger_accel_multiplier")?;
        non_negative(c.scavenger_detection_range, "creatures.scavenger_detection_range")?;
        positive(c.scavenger_eat_range, "creatures.scavenger_eat_range")?;
        ensure(c.satiation_limit > 0, "creatures.satiation_limit", "must be at least 1")?;
        probability(c.patrol_speed_factor, "creatures.patrol_speed_factor")?;

        let a = &self.ai;
        positive(a.threat_detection_radius, "ai.threat_detection_radius")?;
        positive(a.prey_detection_radius, "ai.prey_detection_radius")?;
        non_negative(a.wall_avoid_distance, "ai.wall_avoid_distance")?;
        non_negative(a.avoidance_strength, "ai.avoidance_strength")?;
        probability(a.exploration_rate, "ai.exploration_rate")?;
        non_negative(a.wander_jitter, "ai.wander_jitter")?;

        let l = &self.lifecycle;
        ensure(
            l.initial_snake_size >= 2,
            "lifecycle.initial_snake_size",
            "must be at least 2",
        )?;
        ensure(
            w.initial_snakes <= l.max_snakes,
            "world.initial_snakes",
            "must not exceed lifecycle.max_snakes",
        )?;
        positive(l.snake_spawn_interval, "lifecycle.snake_spawn_interval")?;
        ensure(
            l.hunter_food_threshold > 0,
            "lifecycle.hunter_food_threshold",
            "must be at least 1",
        )?;
        positive(l.starvation_warning, "lifecycle.starvation_warning")?;
        positive(l.starvation_death, "lifecycle.starvation_death")?;
        ensure(
            l.starvation_warning < l.starvation_death,
            "lifecycle.starvation_warning",
            "must be below lifecycle.starvation_death",
        )?;
        ensure(l.report_interval > 0, "lifecycle.report_interval", "must be at least 1")?;

        Ok(())
    }

    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// SHA-256 over every section that shapes simulation outcomes. Two
    /// sessions with the same fingerprint and seed produce the same run.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.motion).as_bytes());
        hasher.update(format!("{:?}", self.food).as_bytes());
        hasher.update(format!("{:?}", self.hazards).as_bytes());
        hasher.update(format!("{:?}", self.creatures).as_bytes());
        hasher.update(format!("{:?}", self.ai).as_bytes());
        hasher.update(format!("{:?}", self.lifecycle).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_world_width() {
        let config = AppConfig {
            world: WorldConfig {
                width: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "world.width",
                ..
            })
        ));
    }

    #[test]
    fn test_non_finite_height_rejected() {
        let config = AppConfig {
            world: WorldConfig {
                height: f64::NAN,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_starvation_thresholds() {
        let config = AppConfig {
            lifecycle: LifecycleConfig {
                starvation_warning: 10.0,
                starvation_death: 8.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_size_below_floor() {
        let config = AppConfig {
            lifecycle: LifecycleConfig {
                initial_snake_size: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_exploration_rate() {
        let config = AppConfig {
            ai: AiConfig {
                exploration_rate: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [world]
            width = 640.0
            height = 480.0
            seed = 7
            wall_mode = "destructive"

            [ai]
            exploration_rate = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.world.width, 640.0);
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.wall_mode, WallMode::Destructive);
        assert_eq!(config.ai.exploration_rate, 0.25);
        assert_eq!(config.food.max_food, 15);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = AppConfig::from_toml("[world\nwidth = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let a = AppConfig::default();
        let mut b = AppConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.ai.fear_margin = 6;
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }
}
