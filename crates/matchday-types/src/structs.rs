//! Core entity and snapshot structs.
//!
//! Everything here is plain data: the simulation crates mutate these
//! structs under the shared-state lock and the read accessors hand out
//! clones of them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AvailabilityStatus, BallEvent, EventKind, FormResult, Formation, League, MatchPeriod,
    MatchStatus, Position, Side, Tactic, Weather,
};
use crate::ids::{CommentaryId, FixtureId, MatchId, PlayerId, TeamId};

/// Number of results kept in a team's form sequence.
pub const FORM_LENGTH: usize = 5;

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// A club and its rolling form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamInfo {
    /// Unique team identifier.
    pub id: TeamId,
    /// Full club name.
    pub name: String,
    /// Three-letter abbreviation.
    pub short_name: String,
    /// Home ground, used as match venue.
    pub stadium: String,
    /// Current manager.
    pub manager: String,
    /// Year the club was founded.
    pub founded: u16,
    /// League the club plays in.
    pub league: League,
    /// Most recent results, newest first, at most [`FORM_LENGTH`] long.
    pub form: Vec<FormResult>,
    /// Points earned across `form`.
    pub form_points: u32,
    /// Consecutive home wins (positive) or winless home games (negative).
    pub home_streak: i32,
    /// Consecutive away wins (positive) or winless away games (negative).
    pub away_streak: i32,
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Fixed attributes, each 1-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerCharacteristics {
    /// Pace.
    pub speed: u8,
    /// Finishing.
    pub shooting: u8,
    /// Distribution.
    pub passing: u8,
    /// Tackling and positioning.
    pub defending: u8,
    /// Strength and stamina.
    pub physicality: u8,
    /// Composure.
    pub mentality: u8,
    /// Mean of the six attributes above.
    pub overall: u8,
}

/// Totals accumulated across a player's whole career.
///
/// Only ever grows: season totals are folded in when a season ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CareerStats {
    /// Matches started or entered as a substitute.
    pub appearances: u32,
    /// Goals scored.
    pub goals: u32,
    /// Goals assisted.
    pub assists: u32,
    /// Yellow cards received.
    pub yellow_cards: u32,
    /// Red cards received.
    pub red_cards: u32,
    /// Fouls committed.
    pub fouls: u32,
}

/// Totals for the season in progress. Reset at every season boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerSeasonStats {
    /// Matches played this season.
    pub matches_played: u32,
    /// Minutes on the pitch this season.
    pub minutes_played: u32,
    /// Goals this season.
    pub goals: u32,
    /// Assists this season.
    pub assists: u32,
    /// Yellow cards this season.
    pub yellow_cards: u32,
    /// Red cards this season.
    pub red_cards: u32,
    /// Fouls committed this season.
    pub fouls: u32,
    /// Sum of full-time match ratings.
    pub total_rating: f64,
    /// `total_rating / matches_played`, or 0 before the first match.
    pub average_rating: f64,
}

/// A squad member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Unique player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Natural position.
    pub position: Position,
    /// Shirt number.
    pub number: u8,
    /// Age in years.
    pub age: u8,
    /// Nationality.
    pub nationality: String,
    /// Club the player belongs to.
    pub team_id: TeamId,
    /// Estimated transfer value in millions.
    pub market_value: u32,
    /// Fixed attributes.
    pub characteristics: PlayerCharacteristics,
    /// Lifetime totals.
    pub career: CareerStats,
    /// Totals for the current season.
    pub season: PlayerSeasonStats,
    /// In-match rating accumulator; 6.0 at kick-off, reset after each match.
    pub current_rating: f64,
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

/// An activated fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Match {
    /// Unique match identifier.
    pub id: MatchId,
    /// Fixture this match was activated from.
    pub fixture_id: FixtureId,
    /// Competition.
    pub league: League,
    /// Season number the match belongs to.
    pub season: u32,
    /// Matchday of the underlying fixture.
    pub matchday: u32,
    /// Home team as it stood at kick-off.
    pub home_team: TeamInfo,
    /// Away team as it stood at kick-off.
    pub away_team: TeamInfo,
    /// Goals scored by the home side.
    pub home_score: u32,
    /// Goals scored by the away side.
    pub away_score: u32,
    /// Match minute; one wall-clock second per minute.
    pub minute: u32,
    /// Lifecycle state.
    pub status: MatchStatus,
    /// Half being played.
    pub period: MatchPeriod,
    /// Stadium name.
    pub venue: String,
    /// Spectators in the ground.
    pub attendance: u32,
    /// Weather conditions.
    pub weather: Weather,
    /// Temperature in degrees Celsius.
    pub temperature: i32,
    /// Home team shape.
    pub home_formation: Formation,
    /// Away team shape.
    pub away_formation: Formation,
    /// Home team instructions.
    pub home_tactic: Tactic,
    /// Away team instructions.
    pub away_tactic: Tactic,
    /// Minutes added after 90.
    pub injury_time: u32,
    /// Kick-off time, rebased forward when the second half starts.
    pub start_time: DateTime<Utc>,
    /// When the halftime break started.
    pub halftime_started_at: Option<DateTime<Utc>>,
    /// When the halftime break ends.
    pub halftime_end_time: Option<DateTime<Utc>>,
    /// Whether the match is paused for halftime.
    pub is_in_break: bool,
    /// Final whistle time.
    pub end_time: Option<DateTime<Utc>>,
    /// Full-time ratings per player.
    pub player_ratings: BTreeMap<PlayerId, f64>,
    /// Home players on the pitch, in formation slot order.
    pub home_lineup: Vec<PlayerId>,
    /// Away players on the pitch, in formation slot order.
    pub away_lineup: Vec<PlayerId>,
    /// Unused home substitutes.
    pub home_bench: Vec<PlayerId>,
    /// Unused away substitutes.
    pub away_bench: Vec<PlayerId>,
    /// Home substitutions made so far.
    pub home_substitutions: u32,
    /// Away substitutions made so far.
    pub away_substitutions: u32,
    /// Last time any part of the match changed.
    pub last_update: DateTime<Utc>,
}

impl Match {
    /// Team id for a side.
    pub const fn team_id(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team.id,
            Side::Away => self.away_team.id,
        }
    }

    /// Team snapshot for a side.
    pub const fn team(&self, side: Side) -> &TeamInfo {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    /// Goals for a side.
    pub const fn score(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    /// Mutable goal counter for a side.
    pub const fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Home => &mut self.home_score,
            Side::Away => &mut self.away_score,
        }
    }

    /// Formation for a side.
    pub const fn formation(&self, side: Side) -> Formation {
        match side {
            Side::Home => self.home_formation,
            Side::Away => self.away_formation,
        }
    }

    /// Tactic for a side.
    pub const fn tactic(&self, side: Side) -> Tactic {
        match side {
            Side::Home => self.home_tactic,
            Side::Away => self.away_tactic,
        }
    }

    /// Players on the pitch for a side.
    pub fn lineup(&self, side: Side) -> &[PlayerId] {
        match side {
            Side::Home => &self.home_lineup,
            Side::Away => &self.away_lineup,
        }
    }

    /// Mutable lineup for a side.
    pub const fn lineup_mut(&mut self, side: Side) -> &mut Vec<PlayerId> {
        match side {
            Side::Home => &mut self.home_lineup,
            Side::Away => &mut self.away_lineup,
        }
    }

    /// Substitutes still available to a side.
    pub fn bench(&self, side: Side) -> &[PlayerId] {
        match side {
            Side::Home => &self.home_bench,
            Side::Away => &self.away_bench,
        }
    }

    /// Mutable bench for a side.
    pub const fn bench_mut(&mut self, side: Side) -> &mut Vec<PlayerId> {
        match side {
            Side::Home => &mut self.home_bench,
            Side::Away => &mut self.away_bench,
        }
    }

    /// Substitutions a side has made.
    pub const fn substitutions(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_substitutions,
            Side::Away => self.away_substitutions,
        }
    }

    /// Mutable substitution counter for a side.
    pub const fn substitutions_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Home => &mut self.home_substitutions,
            Side::Away => &mut self.away_substitutions,
        }
    }

    /// Which side a player is on, if they appear in either lineup or bench.
    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        if self.home_lineup.contains(&player) || self.home_bench.contains(&player) {
            Some(Side::Home)
        } else if self.away_lineup.contains(&player) || self.away_bench.contains(&player) {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Total goals in the match.
    pub const fn total_goals(&self) -> u32 {
        self.home_score.saturating_add(self.away_score)
    }
}

/// Running counters for one side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamMatchStats {
    /// Share of possession in percent.
    pub possession: u32,
    /// Goal attempts.
    pub shots: u32,
    /// Goal attempts on target.
    pub shots_on_target: u32,
    /// Corners won.
    pub corners: u32,
    /// Fouls committed.
    pub fouls: u32,
    /// Yellow cards received.
    pub yellow_cards: u32,
    /// Red cards received.
    pub red_cards: u32,
    /// Completed passes.
    pub passes: u32,
    /// Pass accuracy in percent.
    pub pass_accuracy: f64,
}

impl Default for TeamMatchStats {
    fn default() -> Self {
        Self {
            possession: 50,
            shots: 0,
            shots_on_target: 0,
            corners: 0,
            fouls: 0,
            yellow_cards: 0,
            red_cards: 0,
            passes: 0,
            pass_accuracy: 100.0,
        }
    }
}

/// Per-match statistics for both sides.
///
/// `home.possession + away.possession` is always 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MatchStats {
    /// Match these counters belong to.
    pub match_id: MatchId,
    /// Home side counters.
    pub home: TeamMatchStats,
    /// Away side counters.
    pub away: TeamMatchStats,
    /// Last update time.
    pub last_update: DateTime<Utc>,
}

impl MatchStats {
    /// Fresh counters for a newly created match.
    pub fn new(match_id: MatchId, now: DateTime<Utc>) -> Self {
        Self {
            match_id,
            home: TeamMatchStats::default(),
            away: TeamMatchStats::default(),
            last_update: now,
        }
    }

    /// Counters for a side.
    pub const fn side(&self, side: Side) -> &TeamMatchStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Mutable counters for a side.
    pub const fn side_mut(&mut self, side: Side) -> &mut TeamMatchStats {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

// ---------------------------------------------------------------------------
// Pitch
// ---------------------------------------------------------------------------

/// The ball and its restart state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BallPosition {
    /// Match the ball belongs to.
    pub match_id: MatchId,
    /// Horizontal coordinate, 0 (home goal line) to pitch length.
    pub x: f64,
    /// Vertical coordinate, 0 to pitch width.
    pub y: f64,
    /// Player currently controlling the ball.
    pub possessor: Option<PlayerId>,
    /// Player who touched the ball before the current possessor.
    pub last_touch: Option<PlayerId>,
    /// Speed in pitch units per second.
    pub speed: f64,
    /// Heading in radians.
    pub direction: f64,
    /// Restart sub-state.
    pub state: BallEvent,
    /// When `state` was entered.
    pub state_since: DateTime<Utc>,
    /// Side awarded the current restart, if any.
    pub restart_side: Option<Side>,
    /// Last update time.
    pub last_update: DateTime<Utc>,
}

/// A player's coordinates on the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerLocation {
    /// Player being tracked.
    pub player_id: PlayerId,
    /// Side the player is on.
    pub side: Side,
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Time of the last refresh.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Side and minute of a remembered moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MomentumMark {
    /// Side the moment favoured or punished.
    pub side: Side,
    /// Match minute.
    pub minute: u32,
}

/// Event-driven psychological advantage. Each scalar lies in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MatchMomentum {
    /// Match the momentum belongs to.
    pub match_id: MatchId,
    /// Home momentum.
    pub home: f64,
    /// Away momentum.
    pub away: f64,
    /// Most recent goal.
    pub last_goal: Option<MomentumMark>,
    /// Most recent sending off; `side` is the side that lost the player.
    pub last_red_card: Option<MomentumMark>,
    /// Half the momentum gap, positive when the home side is on top.
    pub pressure: f64,
    /// Last update time.
    pub last_update: DateTime<Utc>,
}

/// Live outcome probabilities.
///
/// `home_win + draw + away_win` is 1 within floating point tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DynamicMatchProbabilities {
    /// Match the probabilities describe.
    pub match_id: MatchId,
    /// Chance the home side wins.
    pub home_win: f64,
    /// Chance of a draw.
    pub draw: f64,
    /// Chance the away side wins.
    pub away_win: f64,
    /// Chance the home side scores next.
    pub home_next_goal: f64,
    /// Chance the away side scores next.
    pub away_next_goal: f64,
    /// Named inputs behind the current numbers.
    pub factors: BTreeMap<String, f64>,
    /// Last update time.
    pub last_update: DateTime<Utc>,
}

/// A change in a player's eligibility during a match.
///
/// Players with no entry are available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerAvailability {
    /// Affected player.
    pub player_id: PlayerId,
    /// Side the player was on.
    pub side: Side,
    /// New status.
    pub status: AvailabilityStatus,
    /// Minute of the change.
    pub minute: u32,
    /// Human-readable cause.
    pub reason: String,
}

/// A line of live commentary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CommentaryEntry {
    /// Unique entry identifier.
    pub id: CommentaryId,
    /// Match the entry belongs to.
    pub match_id: MatchId,
    /// Match minute.
    pub minute: u32,
    /// Display text.
    pub text: String,
    /// Event category.
    pub kind: EventKind,
    /// Player the entry is about.
    pub player_id: Option<PlayerId>,
    /// Name of that player.
    pub player_name: Option<String>,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Text tuned for speech synthesis.
    pub audio_text: String,
    /// Playback speed hint; 1.0 is neutral.
    pub audio_speed: f64,
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// One scheduled pairing in a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Fixture {
    /// Unique fixture identifier; increases in schedule order.
    pub id: FixtureId,
    /// Round of the season, starting at 1.
    pub matchday: u32,
    /// Competition.
    pub league: League,
    /// Home team.
    pub home_team: TeamId,
    /// Away team.
    pub away_team: TeamId,
    /// Set exactly once, when the fixture is activated.
    pub played: bool,
    /// Match created from this fixture.
    pub match_id: Option<MatchId>,
    /// Nominal date of the fixture.
    pub scheduled_at: DateTime<Utc>,
}

impl Fixture {
    /// Whether the team takes part in this fixture.
    pub fn involves(&self, team: TeamId) -> bool {
        self.home_team == team || self.away_team == team
    }
}

/// A standings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeagueTableRow {
    /// Rank, starting at 1.
    pub position: u32,
    /// Team.
    pub team_id: TeamId,
    /// Team name.
    pub team_name: String,
    /// Team abbreviation.
    pub short_name: String,
    /// Matches completed.
    pub played: u32,
    /// Wins.
    pub won: u32,
    /// Draws.
    pub drawn: u32,
    /// Defeats.
    pub lost: u32,
    /// Goals scored.
    pub goals_for: u32,
    /// Goals conceded.
    pub goals_against: u32,
    /// `goals_for - goals_against`.
    pub goal_difference: i32,
    /// League points.
    pub points: u32,
    /// Recent results, newest first.
    pub form: Vec<FormResult>,
    /// Last update time.
    pub last_update: DateTime<Utc>,
}

/// A player honoured at season end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AwardWinner {
    /// Player.
    pub player_id: PlayerId,
    /// Player name.
    pub name: String,
    /// Club.
    pub team_id: TeamId,
    /// Stat that won the award (goals, assists, fouls or average rating).
    pub value: f64,
}

/// Champion of one league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Champion {
    /// Winning team.
    pub team_id: TeamId,
    /// Winning team name.
    pub team_name: String,
    /// Final points tally.
    pub points: u32,
}

/// Immutable record of a completed season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeasonHistory {
    /// Season number.
    pub season: u32,
    /// Champion per league.
    pub champions: BTreeMap<League, Champion>,
    /// Most goals.
    pub top_scorer: Option<AwardWinner>,
    /// Most assists.
    pub top_assists: Option<AwardWinner>,
    /// Most fouls.
    pub most_fouls: Option<AwardWinner>,
    /// Highest average rating among regular starters.
    pub player_of_season: Option<AwardWinner>,
    /// Goals scored across all leagues.
    pub total_goals: u32,
    /// Matches played across all leagues.
    pub total_matches: u32,
    /// When the season was closed.
    pub end_date: DateTime<Utc>,
}

/// Simulation-wide aggregates, refreshed periodically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GlobalStats {
    /// Matches currently in the active set.
    pub active_matches: u32,
    /// Goals across active matches.
    pub total_goals: u32,
    /// `total_goals / active_matches`.
    pub average_goals: f64,
    /// Active match with the most goals.
    pub most_goals_match: Option<MatchId>,
    /// Active match with the most commentary.
    pub most_active_match: Option<MatchId>,
    /// Simulated audience size.
    pub active_viewers: u32,
    /// Leading scorer this season.
    pub top_scorer: Option<AwardWinner>,
    /// Season in progress.
    pub current_season: u32,
    /// Lowest matchday with unplayed fixtures.
    pub current_matchweek: u32,
    /// Share of the season's fixtures already activated, in percent.
    pub season_progress: f64,
    /// Last refresh time.
    pub last_update: DateTime<Utc>,
}

/// Where the current season stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeasonInfo {
    /// Season in progress.
    pub season: u32,
    /// Lowest matchday with unplayed fixtures.
    pub current_matchweek: u32,
    /// Matchdays in a season.
    pub total_matchweeks: u32,
    /// Fixtures across all leagues.
    pub total_fixtures: u32,
    /// Fixtures already activated.
    pub fixtures_played: u32,
    /// Share of the season's fixtures already activated, in percent.
    pub progress: f64,
    /// Current leader of each league.
    pub leaders: BTreeMap<League, Champion>,
    /// When the season started.
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fresh_match_stats_split_possession_evenly() {
        let stats = MatchStats::new(MatchId::new(1), Utc::now());
        assert_eq!(stats.home.possession + stats.away.possession, 100);
        assert_eq!(stats.side(Side::Away).shots, 0);
    }

    #[test]
    fn fixture_involves_both_teams() {
        let fixture = Fixture {
            id: FixtureId::new(1),
            matchday: 1,
            league: League::LaLiga,
            home_team: TeamId::new(21),
            away_team: TeamId::new(22),
            played: false,
            match_id: None,
            scheduled_at: Utc::now(),
        };
        assert!(fixture.involves(TeamId::new(21)));
        assert!(fixture.involves(TeamId::new(22)));
        assert!(!fixture.involves(TeamId::new(23)));
    }

    #[test]
    fn season_history_serializes_league_keys_by_name() {
        let mut champions = BTreeMap::new();
        champions.insert(
            League::PremierLeague,
            Champion {
                team_id: TeamId::new(3),
                team_name: String::from("Liverpul"),
                points: 88,
            },
        );
        let history = SeasonHistory {
            season: 1,
            champions,
            top_scorer: None,
            top_assists: None,
            most_fouls: None,
            player_of_season: None,
            total_goals: 0,
            total_matches: 0,
            end_date: Utc::now(),
        };
        let json = serde_json::to_value(&history).unwrap();
        assert!(json["champions"]["Premier League"].is_object());
    }
}
