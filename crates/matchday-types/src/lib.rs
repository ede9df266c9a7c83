//! Shared type definitions for the Matchday league simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types defined here are exported to `TypeScript` via
//! `ts-rs` so polling clients can consume the snapshots with typed bindings.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe numeric wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (leagues, positions, match and ball states)
//! - [`structs`] -- Entity and snapshot structs (teams, players, matches,
//!   fixtures, standings, analytics)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AvailabilityStatus, BallEvent, CardColor, EventKind, FormResult, Formation, League,
    MatchPeriod, MatchStatus, Position, PositionGroup, Side, Tactic, Weather,
};
pub use ids::{CommentaryId, FixtureId, MatchId, PlayerId, TeamId};
pub use structs::{
    AwardWinner, BallPosition, CareerStats, Champion, CommentaryEntry, DynamicMatchProbabilities,
    FORM_LENGTH, Fixture, GlobalStats, LeagueTableRow, Match, MatchMomentum, MatchStats,
    MomentumMark, Player, PlayerAvailability, PlayerCharacteristics, PlayerLocation,
    PlayerSeasonStats, SeasonHistory, SeasonInfo, TeamInfo, TeamMatchStats,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::TeamId::export_all();
        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::MatchId::export_all();
        let _ = crate::ids::FixtureId::export_all();
        let _ = crate::ids::CommentaryId::export_all();

        // Enums
        let _ = crate::enums::League::export_all();
        let _ = crate::enums::Side::export_all();
        let _ = crate::enums::Position::export_all();
        let _ = crate::enums::PositionGroup::export_all();
        let _ = crate::enums::AvailabilityStatus::export_all();
        let _ = crate::enums::MatchStatus::export_all();
        let _ = crate::enums::MatchPeriod::export_all();
        let _ = crate::enums::BallEvent::export_all();
        let _ = crate::enums::Formation::export_all();
        let _ = crate::enums::Tactic::export_all();
        let _ = crate::enums::Weather::export_all();
        let _ = crate::enums::EventKind::export_all();
        let _ = crate::enums::CardColor::export_all();
        let _ = crate::enums::FormResult::export_all();

        // Structs
        let _ = crate::structs::TeamInfo::export_all();
        let _ = crate::structs::Player::export_all();
        let _ = crate::structs::Match::export_all();
        let _ = crate::structs::MatchStats::export_all();
        let _ = crate::structs::BallPosition::export_all();
        let _ = crate::structs::PlayerLocation::export_all();
        let _ = crate::structs::MatchMomentum::export_all();
        let _ = crate::structs::DynamicMatchProbabilities::export_all();
        let _ = crate::structs::PlayerAvailability::export_all();
        let _ = crate::structs::CommentaryEntry::export_all();
        let _ = crate::structs::Fixture::export_all();
        let _ = crate::structs::LeagueTableRow::export_all();
        let _ = crate::structs::SeasonHistory::export_all();
        let _ = crate::structs::GlobalStats::export_all();
        let _ = crate::structs::SeasonInfo::export_all();
    }
}
