//! Live match simulation for the Matchday league engine.
//!
//! A match is created from a claimed fixture and then advanced once per
//! tick. Each tick moves the clock, may fire an in-match event, repositions
//! players, moves the ball, and refreshes running statistics.
//!
//! # Modules
//!
//! - [`live`] -- [`LiveMatch`] bundle, [`TickContext`], and match creation
//! - [`lifecycle`] -- Match clock, halftime, full time
//! - [`events`] -- Weighted event generator: goals, cards, corners, fouls
//! - [`ball`] -- Ball state machine, passing, restarts
//! - [`positioning`] -- Formation templates and set-piece shapes
//! - [`lineup`] -- Picking starters and substitutes
//! - [`availability`] -- Red cards, injuries, substitutions
//! - [`momentum`] -- Per-side momentum
//! - [`probability`] -- Live outcome probabilities
//! - [`ratings`] -- In-match and final player ratings
//! - [`stats`] -- Possession and passing
//! - [`commentary`] -- Commentary buffer and flavour lines
//! - [`pitch`] -- Pitch geometry
//! - [`config`] -- [`MatchRules`]
//! - [`error`] -- [`MatchError`]
//!
//! [`LiveMatch`]: live::LiveMatch
//! [`TickContext`]: live::TickContext
//! [`MatchRules`]: config::MatchRules
//! [`MatchError`]: error::MatchError

pub mod availability;
pub mod ball;
pub mod commentary;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod lineup;
pub mod live;
pub mod momentum;
pub mod pitch;
pub mod positioning;
pub mod probability;
pub mod ratings;
pub mod stats;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod testing;

pub use config::MatchRules;
pub use error::MatchError;
pub use lifecycle::{Transition, advance};
pub use live::{LiveMatch, MatchSetup, Stint, TickContext, create_match};
