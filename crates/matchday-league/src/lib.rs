//! Rosters, fixture scheduling, standings, and season awards.
//!
//! This crate holds the league-level logic that sits outside any single
//! match: who plays whom and when, how results move the table, and who
//! wins what at the end of a season.
//!
//! # Modules
//!
//! - [`roster`] -- Club table and generated squads
//! - [`schedule`] -- Double round-robin generation
//! - [`fixtures`] -- [`FixtureBook`] with guarded next-fixture selection
//! - [`table`] -- Standings, form, and streaks
//! - [`strength`] -- Team strength, attack strength, pre-match odds
//! - [`awards`] -- Champions and player honours
//! - [`error`] -- [`LeagueError`] and [`ScheduleError`]
//!
//! [`FixtureBook`]: fixtures::FixtureBook
//! [`LeagueError`]: error::LeagueError
//! [`ScheduleError`]: error::ScheduleError

pub mod awards;
pub mod error;
pub mod fixtures;
pub mod roster;
pub mod schedule;
pub mod strength;
pub mod table;

pub use awards::{SeasonAwards, champions, compute_awards};
pub use error::{LeagueError, ScheduleError};
pub use fixtures::{FixtureBook, ScheduleProgress, Selection, SelectionRequest};
pub use roster::{BASE_MATCH_RATING, Roster, seed_roster};
pub use schedule::{ScheduleRequest, double_round_robin};
pub use strength::{PreMatchOdds, attack_strength, pre_match_odds, team_strength};
pub use table::{LeagueTables, MatchResult, apply_form};
