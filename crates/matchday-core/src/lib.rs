//! Shared simulation state, periodic tasks, and season orchestration for
//! the Matchday league engine.
//!
//! This crate ties the league and match crates together: it owns the
//! active match set, activates fixtures under the capacity and fairness
//! rules, closes seasons, and runs the four periodic tasks that keep the
//! simulation moving.
//!
//! # Modules
//!
//! - [`clock`] -- [`TimeSource`] with system and manual clocks
//! - [`config`] -- Configuration loading from `matchday-config.yaml`
//! - [`engine`] -- Match sweep, fixture activation, and archiving
//! - [`error`] -- [`SimulationError`]
//! - [`runner`] -- The periodic task runner
//! - [`season`] -- Season completion and rollover
//! - [`simulation`] -- [`Simulation`] handle and read accessors
//! - [`state`] -- [`SimulationState`] and scheduling
//! - [`stats`] -- Global aggregates and player averages
//!
//! [`TimeSource`]: clock::TimeSource
//! [`SimulationError`]: error::SimulationError
//! [`Simulation`]: simulation::Simulation
//! [`SimulationState`]: state::SimulationState

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod runner;
pub mod season;
pub mod simulation;
pub mod state;
pub mod stats;

pub use clock::{ManualClock, SystemClock, TimeSource};
pub use config::{ConfigError, SimulationConfig};
pub use engine::{Activation, SweepReport};
pub use error::SimulationError;
pub use runner::{RunSummary, RunnerError, run_simulation};
pub use simulation::{PlayerFilter, Simulation};
pub use state::SimulationState;
