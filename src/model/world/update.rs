use crate::model::creature;
use crate::model::decision::DecisionBatch;
use crate::model::movement::{self, clamp_dt, MoveInput, MoveOutcome};
use crate::model::state::WorldState;
use crate::model::world::{TickReport, World};
use serpentine_data::{Action, SnakeId, Vec2};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

impl World {
    /// Advances the session by one reference tick (`world.dt`).
    pub fn step(&mut self) -> TickReport {
        self.update(self.config.world.dt)
    }

    /// Advances the session by one tick of length `dt`.
    ///
    /// Order is fixed: decide, move snakes, move creatures, count down timed
    /// effects, resolve interactions, run lifecycle, then finalize (remove the dead, rebuild
    /// the spatial index, publish the snapshot).
    pub fn update(&mut self, dt: f64) -> TickReport {
        self.update_with_overrides(dt, &BTreeMap::new())
    }

    /// Like [`World::update`], with caller-chosen actions replacing the
    /// policy for the listed snakes on this tick.
    pub fn update_with_overrides(
        &mut self,
        dt: f64,
        overrides: &BTreeMap<SnakeId, Action>,
    ) -> TickReport {
        let started = Instant::now();
        let config = Arc::clone(&self.config);
        let dt = clamp_dt(&config.world, dt);
        let mut report = TickReport {
            tick: self.state.tick,
            dt,
            ..Default::default()
        };

        let batch = self.pipeline.decide_all(
            &self.state,
            &self.spatial,
            &self.effects,
            &config,
            overrides,
            &mut self.rng,
        );
        report.decisions = batch.decisions.len();
        report.policy_failures = batch.policy_failures;
        report.samples = batch.samples;

        self.pass_movement(&batch, dt, &mut report);
        self.pass_creatures(dt);

        // Effects applied during resolution start counting on the next tick.
        report.effects_expired = self.effects.advance(&mut self.state.snakes, dt);
        report.interactions = self
            .resolver
            .resolve(&mut self.state, &mut self.effects, &config, dt);
        report.lifecycle = self
            .lifecycle
            .tick(&mut self.state, &config, dt, &mut self.rng);

        self.finalize_tick(&mut report, started);
        report
    }

    fn pass_movement(&mut self, batch: &DecisionBatch, dt: f64, report: &mut TickReport) {
        let directions: BTreeMap<SnakeId, Vec2> = batch
            .decisions
            .iter()
            .map(|(id, d)| (*id, d.direction))
            .collect();

        for snake in self.state.snakes.iter_mut().filter(|s| s.alive) {
            let input = MoveInput {
                direction: directions.get(&snake.id).copied().unwrap_or(Vec2::ZERO),
                speed_multiplier: self.effects.speed_multiplier(snake),
                pull: self.effects.pull(snake.id),
            };
            if movement::advance(snake, &input, &self.config, dt) == MoveOutcome::HitWall {
                tracing::debug!(snake = %snake.id, size = snake.size, "Snake hit the wall");
                report.wall_deaths.push(snake.id);
            }
        }
    }

    fn pass_creatures(&mut self, dt: f64) {
        let WorldState {
            snakes,
            foods,
            creatures,
            ..
        } = &mut self.state;
        for c in creatures.iter_mut() {
            creature::step(
                c,
                snakes.as_slice(),
                foods.as_slice(),
                &self.config,
                dt,
                &mut self.rng,
            );
        }
    }
}
