//! Session counters and periodic population reports.

use serpentine_data::DeathCause;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const FOOD_EATEN: &str = "food.eaten";
pub const FOOD_SCAVENGED: &str = "food.scavenged";
pub const POLICY_FAILURES: &str = "policy.failures";
pub const SAMPLES_DROPPED: &str = "samples.dropped";
pub const EFFECTS_EXPIRED: &str = "effects.expired";
pub const PROMOTIONS: &str = "snakes.promoted";

#[must_use]
pub fn death_counter(cause: DeathCause) -> &'static str {
    match cause {
        DeathCause::Starvation => "deaths.starvation",
        DeathCause::Predation { .. } => "deaths.predation",
        DeathCause::Ripper => "deaths.ripper",
        DeathCause::Wall => "deaths.wall",
    }
}

/// Population figures attached to a tick report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Population {
    pub snakes: usize,
    pub hunters: usize,
    pub food: usize,
    pub hazards: usize,
    pub creatures: usize,
}

pub struct Metrics {
    tick_count: AtomicU64,
    snake_count: AtomicU64,
    food_count: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    report_interval: u64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Metrics {
    /// `report_interval` of zero disables the periodic report.
    #[must_use]
    pub fn new(report_interval: u64) -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            snake_count: AtomicU64::new(0),
            food_count: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            report_interval,
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick. Logs a population report every
    /// `report_interval` ticks.
    pub fn record_tick(&self, duration: Duration, population: Population) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.snake_count.store(population.snakes as u64, Ordering::Relaxed);
        self.food_count.store(population.food as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if self.report_interval > 0 && tick % self.report_interval == 0 {
            tracing::info!(
                tick = tick,
                snakes = population.snakes,
                hunters = population.hunters,
                food = population.food,
                hazards = population.hazards,
                creatures = population.creatures,
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn increment_counter(&self, name: &str) {
        self.add(name, 1);
    }

    pub fn add(&self, name: &str, amount: u64) {
        if amount == 0 {
            return;
        }
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(amount, Ordering::Relaxed);
    }

    /// Current value of a named counter; zero if it was never touched.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Counters sorted by name.
    #[must_use]
    pub fn counters_snapshot(&self) -> Vec<(String, u64)> {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<(String, u64)> = counters
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();
        out.sort();
        out
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snake_count(&self) -> u64 {
        self.snake_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn food_count(&self) -> u64 {
        self.food_count.load(Ordering::Relaxed)
    }

    /// Wall-clock time since the collector was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the
/// default `info` level. Safe to call more than once.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
