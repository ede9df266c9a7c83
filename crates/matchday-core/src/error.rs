//! Error types for the `matchday-core` crate.

use matchday_league::LeagueError;
use matchday_match::MatchError;

/// Errors raised while setting up a simulation or rolling a season over.
///
/// Runtime ticks never return errors; only set-up paths that cannot
/// continue without a valid roster or schedule do.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Schedule generation failed.
    #[error("league error: {source}")]
    League {
        /// The underlying league error.
        #[from]
        source: LeagueError,
    },

    /// A match could not be created.
    #[error("match error: {source}")]
    Match {
        /// The underlying match error.
        #[from]
        source: MatchError,
    },
}
