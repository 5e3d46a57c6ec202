use anyhow::{Context, Result};
use clap::Parser;
use serpentine_data::WallMode;
use serpentine_lib::model::config::AppConfig;
use serpentine_lib::model::decision::policy::{DecisionTree, Policy};
use serpentine_lib::model::decision::recorder::{ChannelRecorder, NullRecorder, Recorder, Sample};
use serpentine_lib::model::decision::DecisionPipeline;
use serpentine_lib::model::metrics::init_logging;
use serpentine_lib::model::snapshot::WorldSnapshot;
use serpentine_lib::{run, SessionControl, World};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless snake arena simulation", long_about = None)]
struct Args {
    /// Config file path; defaults are used when it does not exist
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `world.seed`
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to run; runs until Ctrl-C when omitted
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Frozen decision tree (JSON) used instead of the rule ladder
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Write (features, action) samples to this CSV file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Overrides `world.wall_mode`
    #[arg(long, value_enum)]
    walls: Option<Walls>,

    /// Write the final world snapshot as JSON
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Walls {
    Wrap,
    Destructive,
}

fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    AppConfig::from_toml(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

fn load_policy(path: Option<&Path>) -> Result<Policy> {
    let Some(path) = path else {
        return Ok(Policy::RuleBased);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file {}", path.display()))?;
    let tree = DecisionTree::from_json(&json)
        .with_context(|| format!("Invalid policy file {}", path.display()))?;
    Ok(Policy::learned(tree))
}

fn write_snapshot(path: &Path, snapshot: &WorldSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))
}

/// Drains samples into a CSV file until every sender is gone.
fn write_samples(
    path: PathBuf,
    fingerprint: String,
    mut rx: mpsc::Receiver<Sample>,
) -> Result<u64> {
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create sample file {}", path.display()))?;
    let mut out = std::io::BufWriter::new(file);
    writeln!(out, "# config {fingerprint}")?;
    writeln!(out, "{}", Sample::csv_header())?;
    let mut written = 0;
    while let Some(sample) = rx.blocking_recv() {
        writeln!(out, "{}", sample.to_csv_row())?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    match args.walls {
        Some(Walls::Wrap) => config.world.wall_mode = WallMode::Wrap,
        Some(Walls::Destructive) => config.world.wall_mode = WallMode::Destructive,
        None => {}
    }
    let policy = load_policy(args.policy.as_deref())?;

    let (recorder, writer) = match args.record {
        Some(path) => {
            let (recorder, rx) = ChannelRecorder::new(4096);
            let fingerprint = config.fingerprint();
            let writer = tokio::task::spawn_blocking(move || write_samples(path, fingerprint, rx));
            (Arc::new(recorder) as Arc<dyn Recorder>, Some(writer))
        }
        None => (Arc::new(NullRecorder) as Arc<dyn Recorder>, None),
    };

    let mut world = World::new_with(config, DecisionPipeline::new(policy, recorder))?;

    let control = SessionControl::new();
    let ctrl_c = control.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        ctrl_c.request_stop();
    });

    let max_ticks = args.ticks;
    let world_task = tokio::task::spawn_blocking(move || {
        let (end, ran) = run(&mut world, &control, max_ticks, |_, _| {});
        tracing::info!(
            ?end,
            ticks = ran,
            seed = world.seed(),
            digest = %world.snapshot().digest(),
            elapsed_ms = world.metrics.elapsed().as_millis() as u64,
            "Session finished"
        );
        for (name, value) in world.metrics.counters_snapshot() {
            tracing::info!(counter = %name, value, "Session counter");
        }
        world.snapshot().clone()
    });
    // The world (and with it the recorder's sender) is dropped when the task
    // ends, which lets the writer drain and exit.
    let last = world_task.await.context("Simulation task panicked")?;
    if let Some(path) = args.snapshot.as_deref() {
        write_snapshot(path, &last)?;
        tracing::info!(path = %path.display(), tick = last.tick, "Snapshot written");
    }

    if let Some(writer) = writer {
        let written = writer.await.context("Sample writer panicked")??;
        tracing::info!(samples = written, "Samples written");
    }
    Ok(())
}
