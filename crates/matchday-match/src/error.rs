//! Error types for the `matchday-match` crate.

use matchday_types::TeamId;

/// Errors raised while setting up a match.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The squad has no goalkeeper to put in goal.
    #[error("team {team} has no goalkeeper")]
    NoGoalkeeper {
        /// Club whose squad was checked.
        team: TeamId,
    },

    /// The squad cannot field a full eleven.
    #[error("team {team} has only {available} players, 11 are required")]
    ShortSquad {
        /// Club whose squad was checked.
        team: TeamId,
        /// Players found in the squad.
        available: usize,
    },
}
