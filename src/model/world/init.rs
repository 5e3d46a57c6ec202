use crate::model::config::AppConfig;
use crate::model::decision::DecisionPipeline;
use crate::model::effects::EffectRegistry;
use crate::model::interaction::InteractionResolver;
use crate::model::lifecycle::{self, LifecycleManager};
use crate::model::metrics::Metrics;
use crate::model::snapshot::WorldSnapshot;
use crate::model::spatial_hash::SpatialIndex;
use crate::model::state::WorldState;
use crate::model::world::World;
use anyhow::Context;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

impl World {
    /// Creates a session with the rule-based policy and no sample recorder.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        Self::new_with(config, DecisionPipeline::default())
    }

    /// Creates a session with initial snakes and food placed from the seeded
    /// RNG. A config without a seed gets one from the OS; it is logged so
    /// the run can be replayed.
    pub fn new_with(config: AppConfig, pipeline: DecisionPipeline) -> anyhow::Result<Self> {
        let mut world = Self::empty_with(config, pipeline)?;
        let config = Arc::clone(&world.config);

        for _ in 0..config.world.initial_snakes.min(config.lifecycle.max_snakes) {
            lifecycle::spawn_snake(&mut world.state, &config, &mut world.rng);
        }
        for _ in 0..config.food.initial_food.min(config.food.max_food) {
            lifecycle::spawn_food(&mut world.state, &config, &mut world.rng);
        }
        world.reindex();

        tracing::info!(
            seed = world.seed,
            snakes = world.state.snakes.len(),
            food = world.state.foods.len(),
            policy = world.pipeline.policy().name(),
            "World created"
        );
        Ok(world)
    }

    /// Creates a session with no entities. Spawn timers are armed.
    pub fn empty_with(config: AppConfig, pipeline: DecisionPipeline) -> anyhow::Result<Self> {
        config
            .validate()
            .context("Rejected session configuration")?;

        let seed = config.world.seed.unwrap_or_else(rand::random::<u64>);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let lifecycle = LifecycleManager::new(&config, &mut rng);
        let state = WorldState::new(config.world.width, config.world.height);
        let cell = (config.motion.segment_radius * 4.0).max(1.0);
        let spatial = SpatialIndex::new(cell, config.world.width, config.world.height);

        tracing::debug!(
            seed,
            fingerprint = %config.fingerprint(),
            wall_mode = ?config.world.wall_mode,
            "Session configuration accepted"
        );

        Ok(Self {
            metrics: Metrics::new(config.lifecycle.report_interval),
            config: Arc::new(config),
            state,
            spatial,
            effects: EffectRegistry::new(),
            lifecycle,
            resolver: InteractionResolver::new(),
            pipeline,
            rng,
            seed,
            snapshot: WorldSnapshot::default(),
            dropped_samples_seen: 0,
        })
    }
}
