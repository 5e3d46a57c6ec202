//! Per-tick decision pipeline: features, policy, action, sample.

pub mod features;
pub mod policy;
pub mod recorder;
pub mod rules;

use crate::config::AppConfig;
use crate::effects::EffectRegistry;
use crate::spatial_hash::SpatialIndex;
use crate::state::WorldState;
use features::{FeatureContext, FeatureVector};
use policy::Policy;
use rand::Rng;
use recorder::{NullRecorder, Recorder, Sample};
use rules::{Behavior, Rule, RuleContext};
use serpentine_data::{Action, SnakeId, Vec2};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionSource {
    Classifier,
    Rules,
    /// Classifier loaded but skipped by the exploration roll.
    Exploration,
    /// Classifier failed; rules stood in for this tick.
    Fallback,
    /// Supplied by the caller for this tick.
    Override,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Steering intent handed to the movement step.
    pub direction: Vec2,
    /// Discrete label of the intent, when it has a dominant axis.
    pub action: Option<Action>,
    pub rule: Option<Rule>,
    pub behavior: Option<Behavior>,
    pub source: DecisionSource,
}

#[derive(Debug, Default)]
pub struct DecisionBatch {
    /// One entry per live snake, in state order.
    pub decisions: Vec<(SnakeId, Decision)>,
    pub policy_failures: usize,
    pub samples: usize,
}

pub struct DecisionPipeline {
    policy: Policy,
    recorder: Arc<dyn Recorder>,
}

impl Default for DecisionPipeline {
    fn default() -> Self {
        Self::new(Policy::RuleBased, Arc::new(NullRecorder))
    }
}

impl DecisionPipeline {
    pub fn new(policy: Policy, recorder: Arc<dyn Recorder>) -> Self {
        Self { policy, recorder }
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub fn recorder(&self) -> &Arc<dyn Recorder> {
        &self.recorder
    }

    /// Decides for every live snake.
    ///
    /// Features are extracted in parallel; the policy then runs sequentially
    /// in state order so every draw from `rng` happens in a fixed sequence.
    pub fn decide_all<R: Rng + ?Sized>(
        &self,
        state: &WorldState,
        spatial: &SpatialIndex,
        effects: &EffectRegistry,
        config: &AppConfig,
        overrides: &BTreeMap<SnakeId, Action>,
        rng: &mut R,
    ) -> DecisionBatch {
        let view = FeatureContext {
            state,
            spatial,
            effects,
        };
        let rules = RuleContext {
            state,
            spatial,
            effects,
            config,
        };
        let mut batch = DecisionBatch::default();
        let extracted = features::extract_all(&view);
        batch.decisions.reserve(extracted.len());

        for (id, feats) in extracted {
            let decision = if let Some(&action) = overrides.get(&id) {
                Decision {
                    direction: action.direction(),
                    action: Some(action),
                    rule: None,
                    behavior: None,
                    source: DecisionSource::Override,
                }
            } else {
                self.decide(id, &feats, &rules, config.ai.exploration_rate, rng, &mut batch)
            };

            if let Some(action) = decision.action {
                self.recorder.record(Sample {
                    tick: state.tick,
                    snake_id: id,
                    features: feats,
                    action,
                });
                batch.samples += 1;
            }
            batch.decisions.push((id, decision));
        }
        batch
    }

    fn decide<R: Rng + ?Sized>(
        &self,
        id: SnakeId,
        feats: &FeatureVector,
        ctx: &RuleContext<'_>,
        exploration_rate: f64,
        rng: &mut R,
        batch: &mut DecisionBatch,
    ) -> Decision {
        let source = match &self.policy {
            Policy::Learned(classifier) => {
                if exploration_rate > 0.0 && rng.gen::<f64>() < exploration_rate {
                    DecisionSource::Exploration
                } else {
                    match classifier.predict(feats) {
                        Ok(action) => {
                            return Decision {
                                direction: action.direction(),
                                action: Some(action),
                                rule: None,
                                behavior: None,
                                source: DecisionSource::Classifier,
                            };
                        }
                        Err(err) => {
                            debug!(
                                snake = %id,
                                error = %err,
                                "Policy inference failed, using rules"
                            );
                            batch.policy_failures += 1;
                            DecisionSource::Fallback
                        }
                    }
                }
            }
            Policy::RuleBased => DecisionSource::Rules,
        };

        let Some(snake) = ctx.state.snake(id) else {
            return Decision {
                direction: Vec2::ZERO,
                action: None,
                rule: None,
                behavior: None,
                source,
            };
        };
        let ruled = rules::evaluate(snake, ctx, rng);
        Decision {
            direction: ruled.direction,
            action: Action::from_direction(ruled.direction),
            rule: Some(ruled.rule),
            behavior: Some(ruled.behavior),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;
    use policy::Classifier;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use recorder::MemoryRecorder;
    use serpentine_data::{Food, Snake};
    use uuid::Uuid;

    struct Always(Action);

    impl Classifier for Always {
        fn name(&self) -> &str {
            "always"
        }
        fn predict(&self, _: &FeatureVector) -> Result<Action, PolicyError> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn predict(&self, _: &FeatureVector) -> Result<Action, PolicyError> {
            Err(PolicyError::Unavailable("offline".into()))
        }
    }

    fn world() -> (WorldState, SpatialIndex) {
        let mut state = WorldState::new(1000.0, 800.0);
        for n in 1..=3u128 {
            let mut s = Snake::new(
                Uuid::from_u128(n),
                Vec2::new(100.0 * n as f64, 400.0),
                Vec2::new(1.0, 0.0),
                3,
                5.0,
            );
            s.velocity = Vec2::new(50.0, 0.0);
            state.snakes.push(s);
        }
        state.foods.push(Food::plain(Uuid::from_u128(50), Vec2::new(100.0, 700.0)));
        let mut spatial = SpatialIndex::new(32.0, 1000.0, 800.0);
        spatial.rebuild(&state);
        (state, spatial)
    }

    fn run(pipeline: &DecisionPipeline, config: &AppConfig) -> DecisionBatch {
        let (state, spatial) = world();
        let effects = EffectRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        pipeline.decide_all(&state, &spatial, &effects, config, &BTreeMap::new(), &mut rng)
    }

    #[test]
    fn test_classifier_drives_decisions_and_samples() {
        let recorder = Arc::new(MemoryRecorder::new());
        let pipeline = DecisionPipeline::new(Policy::learned(Always(Action::Up)), recorder.clone());
        let batch = run(&pipeline, &AppConfig::default());
        assert_eq!(batch.decisions.len(), 3);
        assert!(batch
            .decisions
            .iter()
            .all(|(_, d)| d.source == DecisionSource::Classifier && d.action == Some(Action::Up)));
        assert_eq!(recorder.len(), 3);
    }

    #[test]
    fn test_failing_classifier_falls_back_to_rules() {
        let pipeline = DecisionPipeline::new(Policy::learned(Broken), Arc::new(NullRecorder));
        let batch = run(&pipeline, &AppConfig::default());
        assert_eq!(batch.policy_failures, 3);
        assert!(batch
            .decisions
            .iter()
            .all(|(_, d)| d.source == DecisionSource::Fallback && d.rule == Some(Rule::SeekFood)));
    }

    #[test]
    fn test_full_exploration_ignores_classifier() {
        let mut config = AppConfig::default();
        config.ai.exploration_rate = 1.0;
        let pipeline =
            DecisionPipeline::new(Policy::learned(Always(Action::Up)), Arc::new(NullRecorder));
        let batch = run(&pipeline, &config);
        assert!(batch
            .decisions
            .iter()
            .all(|(_, d)| d.source == DecisionSource::Exploration));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let (state, spatial) = world();
        let effects = EffectRegistry::new();
        let pipeline = DecisionPipeline::default();
        let mut overrides = BTreeMap::new();
        overrides.insert(Uuid::from_u128(2), Action::Left);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let batch = pipeline.decide_all(
            &state,
            &spatial,
            &effects,
            &AppConfig::default(),
            &overrides,
            &mut rng,
        );
        let (_, d) = batch.decisions[1];
        assert_eq!(d.source, DecisionSource::Override);
        assert_eq!(d.direction, Vec2::new(-1.0, 0.0));
    }
}
