//! Engine binary for the Matchday league simulation.
//!
//! Loads configuration, seeds the leagues, and runs the periodic tasks
//! until the process receives Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `matchday-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Seed rosters and schedule the first season
//! 4. Start the match engine, season manager, and statistics tasks
//! 5. Wait for the shutdown signal
//! 6. Stop the tasks, cancel pending cooldowns, and log the result

mod error;

use std::path::Path;

use matchday_core::config::{LogFormat, LoggingConfig};
use matchday_core::{RunSummary, Simulation, SimulationConfig, run_simulation};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Configuration file, relative to the working directory.
const CONFIG_PATH: &str = "matchday-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if startup fails or a periodic task dies.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration; the log settings live in it.
    let (config, from_file) = load_config(Path::new(CONFIG_PATH))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("matchday-engine starting");
    if !from_file {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    info!(
        name = config.simulation.name,
        seed = config.simulation.seed,
        match_tick_ms = config.timing.match_tick_ms,
        max_simultaneous_matches = config.league.max_simultaneous_matches,
        cooldown_secs = config.timing.cooldown_secs,
        "Configuration loaded"
    );

    // 3-6. Run until interrupted.
    let summary = run(config).await?;
    info!(
        match_ticks = summary.match_ticks,
        season_checks = summary.season_checks,
        cancelled_cooldowns = summary.cancelled_cooldowns,
        "matchday-engine shutdown complete"
    );
    Ok(())
}

/// Build the simulation and drive it until Ctrl-C.
async fn run(config: SimulationConfig) -> Result<RunSummary, EngineError> {
    let sim = Simulation::with_system_clock(config)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = tokio::spawn(run_simulation(sim.clone(), shutdown_rx));

    let signal = tokio::signal::ctrl_c().await;
    info!("Shutdown requested");
    if shutdown_tx.send(true).is_err() {
        warn!("Periodic tasks had already stopped");
    }
    let outcome = runner.await;
    signal?;
    let summary = outcome.map_err(matchday_core::RunnerError::from)??;

    let season = sim.season_info().await;
    info!(
        season = season.season,
        matchweek = season.current_matchweek,
        fixtures_played = season.fixtures_played,
        total_fixtures = season.total_fixtures,
        "Final season state"
    );
    Ok(summary)
}

/// Load the simulation configuration from `path`.
///
/// Falls back to defaults (with environment overrides) when the file does
/// not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        Ok((config, true))
    } else {
        let config = SimulationConfig::parse("")?;
        Ok((config, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. An unparseable level falls
/// back to `info`.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
