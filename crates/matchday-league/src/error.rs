//! Error types for the `matchday-league` crate.

use matchday_types::{FixtureId, League, TeamId};

/// Errors raised while building rosters or schedules.
#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    /// A round-robin needs at least two teams.
    #[error("{league} has {count} teams, at least 2 are required")]
    TooFewTeams {
        /// League being scheduled.
        league: League,
        /// Number of teams supplied.
        count: usize,
    },

    /// The same team was listed twice for one league.
    #[error("team {0} appears more than once in the schedule input")]
    DuplicateTeam(TeamId),
}

/// Errors raised when claiming a fixture.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// Another caller activated the fixture first.
    #[error("fixture {0} has already been played")]
    AlreadyClaimed(FixtureId),

    /// The fixture id is not in the book.
    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),
}
