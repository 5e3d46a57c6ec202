//! Stopping and driving a session between ticks.

use crate::model::world::{TickReport, World};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag. Clones observe the same flag; a stop request takes
/// effect before the next tick starts.
#[derive(Debug, Clone, Default)]
pub struct SessionControl {
    stop_requested: Arc<AtomicBool>,
}

impl SessionControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        if !self.stop_requested.swap(true, Ordering::SeqCst) {
            tracing::info!("Session stop requested");
        }
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Stopped,
    TickLimit,
    Extinct,
}

/// Runs reference ticks until stopped, `max_ticks` is reached or the last
/// snake is gone. `on_tick` sees every fully resolved tick. Returns the end
/// reason and the number of ticks run.
pub fn run<F>(
    world: &mut World,
    control: &SessionControl,
    max_ticks: Option<u64>,
    mut on_tick: F,
) -> (RunEnd, u64)
where
    F: FnMut(&World, &TickReport),
{
    let mut ran = 0;
    loop {
        if control.is_stop_requested() {
            return (RunEnd::Stopped, ran);
        }
        if max_ticks.is_some_and(|limit| ran >= limit) {
            return (RunEnd::TickLimit, ran);
        }
        let report = world.step();
        ran += 1;
        on_tick(world, &report);
        if world.state.live_snake_count() == 0 {
            tracing::info!(tick = world.tick(), "No snakes left");
            return (RunEnd::Extinct, ran);
        }
    }
}
