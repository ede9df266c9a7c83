//! Periodic task runner.
//!
//! This module provides [`run_simulation`], which drives a [`Simulation`]
//! with four independently-ticking tasks:
//!
//! - **Match engine**: sweeps every active match (seconds scale)
//! - **Season manager**: closes a completed season and opens the next
//! - **Statistics processor**: recomputes player season averages
//! - **Global aggregator**: refreshes the simulation-wide figures
//!
//! The tasks never talk to each other; they only meet in the shared state.
//! All of them stop when the shutdown channel flips to `true`, after which
//! pending cooldowns are cancelled.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::simulation::Simulation;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A periodic task panicked or was aborted.
    #[error("periodic task failed: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}

/// How often each periodic task ran before shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Match engine sweeps.
    pub match_ticks: u64,
    /// Season completion checks.
    pub season_checks: u64,
    /// Player statistics passes.
    pub stats_passes: u64,
    /// Global aggregate refreshes.
    pub global_refreshes: u64,
    /// Cooldowns still pending at shutdown.
    pub cancelled_cooldowns: usize,
}

/// Run the periodic tasks until `shutdown` becomes `true` (or its sender
/// is dropped).
///
/// # Errors
///
/// Returns [`RunnerError`] if a task panicked.
pub async fn run_simulation(
    sim: Simulation,
    shutdown: watch::Receiver<bool>,
) -> Result<RunSummary, RunnerError> {
    let timing = sim.config().timing.clone();
    info!(
        match_tick_ms = timing.match_tick_ms,
        season_check_secs = timing.season_check_secs,
        stats_interval_secs = timing.stats_interval_secs,
        global_stats_interval_secs = timing.global_stats_interval_secs,
        cooldown_secs = timing.cooldown_secs,
        "Simulation starting"
    );

    let match_engine = spawn_every(
        "match_engine",
        timing.match_tick(),
        &shutdown,
        &sim,
        |sim| async move {
            sim.tick_matches().await;
        },
    );
    let season_manager = spawn_every(
        "season_manager",
        timing.season_check(),
        &shutdown,
        &sim,
        |sim| async move {
            sim.check_season().await;
        },
    );
    let statistics = spawn_every(
        "statistics",
        timing.stats_interval(),
        &shutdown,
        &sim,
        |sim| async move {
            sim.process_statistics().await;
        },
    );
    let global_stats = spawn_every(
        "global_stats",
        timing.global_stats_interval(),
        &shutdown,
        &sim,
        |sim| async move {
            sim.refresh_global_stats().await;
        },
    );

    let match_ticks = match_engine.await?;
    let season_checks = season_manager.await?;
    let stats_passes = statistics.await?;
    let global_refreshes = global_stats.await?;
    let cancelled_cooldowns = sim.cancel_cooldowns();

    let summary = RunSummary {
        match_ticks,
        season_checks,
        stats_passes,
        global_refreshes,
        cancelled_cooldowns,
    };
    info!(
        match_ticks,
        season_checks,
        stats_passes,
        global_refreshes,
        cancelled_cooldowns,
        "Simulation stopped"
    );
    Ok(summary)
}

/// Spawn a periodic task that hands each run its own clone of the handle.
fn spawn_every<W, Fut>(
    task: &'static str,
    period: Duration,
    shutdown: &watch::Receiver<bool>,
    sim: &Simulation,
    work: W,
) -> JoinHandle<u64>
where
    W: Fn(Simulation) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let sim = sim.clone();
    tokio::spawn(every(task, period, shutdown.clone(), move || work(sim.clone())))
}

/// Run `work` every `period` until shutdown. Returns the number of runs.
///
/// The first run happens immediately. A run that overruns its period delays
/// the next one instead of bunching up.
async fn every<F, Fut>(
    task: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut work: F,
) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut runs = 0_u64;

    info!(task, period_ms = period.as_millis(), "Periodic task started");
    loop {
        if *shutdown.borrow_and_update() {
            break;
        }
        tokio::select! {
            _ = interval.tick() => {
                work().await;
                runs = runs.saturating_add(1);
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    info!(task, runs, "Periodic task stopped");
    runs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::SystemClock;
    use crate::config::SimulationConfig;

    fn make_simulation() -> Simulation {
        let mut config = SimulationConfig::default();
        config.timing.match_tick_ms = 5;
        config.timing.cooldown_secs = 3600;
        Simulation::new(config, Arc::new(SystemClock)).unwrap()
    }

    #[tokio::test]
    async fn tasks_run_until_shutdown() {
        let sim = make_simulation();
        let (tx, rx) = watch::channel(false);
        let runner = tokio::spawn(run_simulation(sim.clone(), rx));

        tokio::time::sleep(Duration::from_millis(60)).await;
        tx.send(true).unwrap();
        let summary = runner.await.unwrap().unwrap();

        assert!(summary.match_ticks >= 2);
        assert!(summary.season_checks >= 1);
        assert!(summary.stats_passes >= 1);
        assert!(summary.global_refreshes >= 1);
        assert_eq!(sim.matches().await.len(), 8);
    }

    #[tokio::test]
    async fn shutdown_before_start_runs_nothing() {
        let sim = make_simulation();
        let (tx, rx) = watch::channel(true);
        let summary = run_simulation(sim.clone(), rx).await.unwrap();
        drop(tx);

        assert_eq!(summary, RunSummary::default());
        assert!(sim.matches().await.is_empty());
    }

    #[tokio::test]
    async fn dropped_sender_stops_the_tasks() {
        let sim = make_simulation();
        let (tx, rx) = watch::channel(false);
        let runner = tokio::spawn(run_simulation(sim, rx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(tx);

        let summary = runner.await.unwrap().unwrap();
        assert!(summary.match_ticks >= 1);
    }
}
