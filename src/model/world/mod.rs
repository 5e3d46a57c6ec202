use crate::model::config::AppConfig;
use crate::model::decision::DecisionPipeline;
use crate::model::effects::EffectRegistry;
use crate::model::interaction::{InteractionResolver, InteractionResult};
use crate::model::lifecycle::{LifecycleManager, LifecycleReport};
use crate::model::metrics::Metrics;
use crate::model::snapshot::WorldSnapshot;
use crate::model::spatial_hash::SpatialIndex;
use crate::model::state::WorldState;
use rand_chacha::ChaCha8Rng;
use serpentine_data::{DeathCause, EffectDescriptor, EffectKind, Snake, SnakeId};
use std::sync::Arc;

pub mod finalize;
pub mod init;
pub mod update;

/// A running session: the world state plus every component that acts on it.
///
/// One `World` owns one RNG, one effect registry and one set of spawn
/// timers, so independent sessions never share mutable state.
pub struct World {
    pub config: Arc<AppConfig>,
    pub state: WorldState,
    pub spatial: SpatialIndex,
    pub effects: EffectRegistry,
    pub lifecycle: LifecycleManager,
    pub resolver: InteractionResolver,
    pub pipeline: DecisionPipeline,
    pub metrics: Metrics,
    pub rng: ChaCha8Rng,
    seed: u64,
    snapshot: WorldSnapshot,
    dropped_samples_seen: u64,
}

/// Everything that happened during one tick.
#[derive(Debug, Default, Clone)]
pub struct TickReport {
    /// Index of the tick that produced this report.
    pub tick: u64,
    /// Tick length after clamping.
    pub dt: f64,
    pub decisions: usize,
    pub policy_failures: usize,
    pub samples: usize,
    pub effects_expired: usize,
    pub wall_deaths: Vec<SnakeId>,
    pub interactions: InteractionResult,
    pub lifecycle: LifecycleReport,
    /// Snakes removed at the end of the tick, with their cause of death.
    pub removed: Vec<(SnakeId, Option<DeathCause>)>,
}

impl World {
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    /// Seed the session RNG was created from. Reusing it with the same
    /// config and inputs replays the session.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// View of the last fully resolved tick.
    #[must_use]
    pub fn snapshot(&self) -> &WorldSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn snake(&self, id: SnakeId) -> Option<&Snake> {
        self.state.snake(id)
    }

    pub fn snake_mut(&mut self, id: SnakeId) -> Option<&mut Snake> {
        self.state.snake_mut(id)
    }

    /// Starts a timed effect that modifies every snake, e.g. a scripted
    /// world-wide slowdown. Re-applying the same kind refreshes it.
    pub fn apply_world_effect(&mut self, kind: EffectKind, descriptor: EffectDescriptor) -> bool {
        let refreshed = self.effects.apply_world(kind, descriptor);
        tracing::info!(
            ?kind,
            duration = descriptor.duration,
            magnitude = descriptor.magnitude,
            refreshed,
            "World effect applied"
        );
        refreshed
    }
}
