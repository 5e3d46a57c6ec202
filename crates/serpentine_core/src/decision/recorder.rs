//! Training-sample sinks.
//!
//! Emission is fire-and-forget: a recorder never blocks the tick and never
//! reports failure back into the simulation.

use super::features::{FeatureVector, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use serpentine_data::{Action, SnakeId};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub tick: u64,
    pub snake_id: SnakeId,
    pub features: FeatureVector,
    pub action: Action,
}

impl Sample {
    /// Column header matching [`Sample::to_csv_row`].
    #[must_use]
    pub fn csv_header() -> String {
        let mut header = FEATURE_NAMES.join(",");
        header.push_str(",label");
        header
    }

    /// Features in vector order followed by the action label.
    #[must_use]
    pub fn to_csv_row(&self) -> String {
        let mut row = String::with_capacity(128);
        for (i, v) in self.features.as_slice().iter().enumerate() {
            if i > 0 {
                row.push(',');
            }
            let _ = write!(row, "{v}");
        }
        row.push(',');
        row.push_str(self.action.label());
        row
    }
}

pub trait Recorder: Send + Sync {
    fn record(&self, sample: Sample);

    /// Samples this recorder had to discard.
    fn dropped(&self) -> u64 {
        0
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn record(&self, _sample: Sample) {}
}

/// Keeps every sample in memory.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    samples: Mutex<Vec<Sample>>,
}

impl MemoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().map(|s| s.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.lock().map(|s| s.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, sample: Sample) {
        if let Ok(mut samples) = self.samples.lock() {
            samples.push(sample);
        }
    }
}

/// Hands samples to a bounded channel drained elsewhere. A full or closed
/// channel drops the sample.
#[derive(Debug)]
pub struct ChannelRecorder {
    tx: mpsc::Sender<Sample>,
    dropped: AtomicU64,
}

impl ChannelRecorder {
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Sample>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx,
                dropped: AtomicU64::new(0),
            },
            rx,
        )
    }
}

impl Recorder for ChannelRecorder {
    fn record(&self, sample: Sample) {
        if let Err(err) = self.tx.try_send(sample) {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if total == 1 || total % 1000 == 0 {
                let reason = match err {
                    mpsc::error::TrySendError::Full(_) => "full",
                    mpsc::error::TrySendError::Closed(_) => "closed",
                };
                warn!(reason, total, "Dropping training samples");
            }
        }
    }

    fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
