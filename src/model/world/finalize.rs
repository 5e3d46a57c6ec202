use crate::model::metrics::{self, Population};
use crate::model::snapshot::WorldSnapshot;
use crate::model::world::{TickReport, World};
use std::time::Instant;

impl World {
    /// Rebuilds the spatial index and snapshot after the state was edited
    /// from outside a tick.
    pub fn reindex(&mut self) {
        self.spatial.rebuild(&self.state);
        self.snapshot = WorldSnapshot::from_state(&self.state);
    }

    pub(crate) fn finalize_tick(&mut self, report: &mut TickReport, started: Instant) {
        for snake in self.state.remove_dead() {
            self.effects.forget(snake.id);
            match snake.death_cause {
                Some(cause) => {
                    self.metrics.increment_counter(metrics::death_counter(cause));
                    tracing::info!(
                        snake = %snake.id,
                        size = snake.size,
                        role = ?snake.role,
                        cause = ?cause,
                        "Snake died"
                    );
                }
                None => tracing::warn!(snake = %snake.id, "Snake removed without a cause"),
            }
            report.removed.push((snake.id, snake.death_cause));
        }

        self.spatial.rebuild(&self.state);
        self.state.tick += 1;
        self.state.elapsed += report.dt;
        self.snapshot = WorldSnapshot::from_state(&self.state);

        self.record_metrics(report, started);
    }

    fn record_metrics(&mut self, report: &TickReport, started: Instant) {
        let m = &self.metrics;
        m.add(metrics::FOOD_EATEN, report.interactions.foods_eaten as u64);
        m.add(metrics::FOOD_SCAVENGED, report.interactions.foods_scavenged as u64);
        m.add(metrics::PROMOTIONS, report.interactions.promotions.len() as u64);
        m.add(metrics::POLICY_FAILURES, report.policy_failures as u64);
        m.add(metrics::EFFECTS_EXPIRED, report.effects_expired as u64);

        let dropped = self.pipeline.recorder().dropped();
        m.add(
            metrics::SAMPLES_DROPPED,
            dropped.saturating_sub(self.dropped_samples_seen),
        );
        self.dropped_samples_seen = dropped;

        m.record_tick(
            started.elapsed(),
            Population {
                snakes: self.state.live_snake_count(),
                hunters: self.state.live_hunter_count(),
                food: self.state.foods.len(),
                hazards: self.state.hazards.len(),
                creatures: self.state.creatures.len(),
            },
        );
    }
}
