//! Command line runner for the drone pollination simulation.
//!
//! Loads a config file or preset, builds the simulation, and ticks it until
//! Ctrl+C or the tick budget, publishing snapshots through the configured
//! transport. A summary of discoveries and tick timings is logged at exit.

use clap::Parser;
use hdrhistogram::Histogram;
use log::{error, info, warn};
use pollinate_config::{load_config, Config, ConfigError, Preset};
use pollinate_core::{Counters, RunSummary, Scheduler, Simulation, SimulationError};
use pollinate_transport::{TransportController, TransportError};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drones sweeping a flower field", long_about = None)]
struct Args {
    /// Path to the simulation configuration file (.json or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Preset to run, or to apply under the config file's overrides
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// Seed for the random source
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Tick as fast as possible instead of pacing to the framerate
    #[arg(long)]
    headless: bool,
}

#[derive(Error, Debug)]
enum RunnerError {
    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build simulation: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Failed to set up transport: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Failed to create tick histogram: {0}")]
    Histogram(#[from] hdrhistogram::CreationError),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), RunnerError> {
    let config = resolve_config(args)?;
    let params = config.simulation_params();
    info!("Running preset {:?} with {:?}", config.preset, params);

    let mut simulation = Simulation::new(params)?;
    let mut transport = TransportController::from_config(&config.transport)?;

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;

    let frame_duration = Duration::from_secs_f64(1.0 / f64::from(config.framerate));
    let mut scheduler = Scheduler::new();
    if !args.headless {
        scheduler.with_fixed_timestep(frame_duration);
    }
    if let Some(budget) = config.max_ticks {
        scheduler.with_tick_budget(budget);
    }

    let mut stats = TickStats::new()?;
    let check_lag = !args.headless && config.framerate > 10;
    info!("Running simulation at {} ticks per second...", config.framerate);

    let summary = scheduler.run_loop(&mut simulation, &stop, |sim, outcome| {
        stats.record(outcome.busy);
        if check_lag && outcome.busy > frame_duration {
            warn!(
                "Tick {} exceeded frame budget: {:?} > {:?}",
                outcome.report.tick, outcome.busy, frame_duration
            );
        }
        if let Err(e) = transport.publish(sim) {
            error!("Failed to publish tick {}: {}", outcome.report.tick, e);
        }
    });

    if let Err(e) = transport.flush() {
        error!("Failed to flush transport: {}", e);
    }
    report(&summary, &simulation.counters(), &stats, transport.published());
    Ok(())
}

/// Loads the config file (or the preset alone) and applies command line overrides.
fn resolve_config(args: &Args) -> Result<Config, ConfigError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Using configuration from {}", path.display());
            load_config(path)?
        }
        None => Config::from_preset(args.preset.unwrap_or_default()),
    };

    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.max_ticks.is_some() {
        config.max_ticks = args.max_ticks;
    }
    config.validate()?;
    Ok(config)
}

/// Distribution of per-tick simulation time, in microseconds.
struct TickStats {
    histogram: Histogram<u64>,
}

impl TickStats {
    fn new() -> Result<Self, hdrhistogram::CreationError> {
        // 1µs to 60s at three significant digits
        Ok(TickStats {
            histogram: Histogram::new_with_bounds(1, 60_000_000, 3)?,
        })
    }

    fn record(&mut self, busy: Duration) {
        let micros = u64::try_from(busy.as_micros()).unwrap_or(u64::MAX).max(1);
        self.histogram.saturating_record(micros);
    }
}

fn report(summary: &RunSummary, counters: &Counters, stats: &TickStats, published: u64) {
    info!(
        "Stopped by {:?} after {} ticks in {:.2?} ({} snapshots published)",
        summary.stopped_by, summary.ticks, summary.elapsed, published
    );
    info!("Total Flowers: {}", counters.total);
    info!(
        "Flowers Seen: {} : {:.1}%",
        counters.discovered,
        counters.seen_percentage()
    );
    info!(
        "Flowers Clustered: {} : {:.1}% of seen, in {} clusters",
        counters.clustered,
        counters.clustered_percentage(),
        counters.clusters
    );

    let histogram = &stats.histogram;
    if histogram.len() > 0 {
        info!(
            "Tick time (µs): p50 {} p99 {} max {} mean {:.1}",
            histogram.value_at_quantile(0.5),
            histogram.value_at_quantile(0.99),
            histogram.max(),
            histogram.mean()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(config: Option<PathBuf>, preset: Option<Preset>) -> Args {
        Args {
            config,
            preset,
            seed: Some(3),
            max_ticks: Some(10),
            headless: true,
        }
    }

    #[test]
    fn preset_without_config_file() {
        let config = resolve_config(&args(None, Some(Preset::RandomStart))).unwrap();
        assert_eq!(config.preset, Preset::RandomStart);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.max_ticks, Some(10));
        assert_eq!(config.simulation_params().drone_count, 1);
    }

    #[test]
    fn command_line_overrides_the_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "seed": 1, "max_ticks": 99, "drones": {{ "count": 2 }} }}"#).unwrap();

        let config = resolve_config(&args(Some(file.path().to_path_buf()), None)).unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.max_ticks, Some(10));
        assert_eq!(config.simulation_params().drone_count, 2);
    }

    #[test]
    fn tick_stats_record_sub_microsecond_ticks() {
        let mut stats = TickStats::new().unwrap();
        stats.record(Duration::from_nanos(10));
        stats.record(Duration::from_millis(3));
        assert_eq!(stats.histogram.len(), 2);
        assert_eq!(stats.histogram.min(), 1);
    }

    #[test]
    fn headless_budgeted_run_completes() {
        let mut simulation = Simulation::new(
            resolve_config(&args(None, Some(Preset::RandomStart)))
                .unwrap()
                .simulation_params(),
        )
        .unwrap();
        let stop = AtomicBool::new(false);
        let summary = Scheduler::new()
            .with_tick_budget(10)
            .run_loop(&mut simulation, &stop, |_, _| {});
        assert_eq!(summary.ticks, 10);
        assert!(simulation.counters().discovered > 0);
    }
}
