//! Enumeration types shared across the league simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Competition
// ---------------------------------------------------------------------------

/// A league competition. Each league runs its own double round-robin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum League {
    /// English top flight.
    #[serde(rename = "Premier League")]
    PremierLeague,
    /// Spanish top flight.
    #[serde(rename = "La Liga")]
    LaLiga,
}

impl League {
    /// Every league, in scheduling order.
    pub const ALL: [Self; 2] = [Self::PremierLeague, Self::LaLiga];

    /// Display name of the competition.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PremierLeague => "Premier League",
            Self::LaLiga => "La Liga",
        }
    }
}

impl core::fmt::Display for League {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which side of a fixture a team or player belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The team playing at its own stadium.
    Home,
    /// The visiting team.
    Away,
}

impl Side {
    /// Both sides, home first.
    pub const BOTH: [Self; 2] = [Self::Home, Self::Away];

    /// The other side.
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A player's natural position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Position {
    /// Goalkeeper.
    #[serde(rename = "GK")]
    Goalkeeper,
    /// Centre back.
    #[serde(rename = "CB")]
    CentreBack,
    /// Left back.
    #[serde(rename = "LB")]
    LeftBack,
    /// Right back.
    #[serde(rename = "RB")]
    RightBack,
    /// Defensive midfielder.
    #[serde(rename = "CDM")]
    DefensiveMidfielder,
    /// Central midfielder.
    #[serde(rename = "CM")]
    CentralMidfielder,
    /// Attacking midfielder.
    #[serde(rename = "CAM")]
    AttackingMidfielder,
    /// Left winger.
    #[serde(rename = "LW")]
    LeftWinger,
    /// Right winger.
    #[serde(rename = "RW")]
    RightWinger,
    /// Striker.
    #[serde(rename = "ST")]
    Striker,
}

impl Position {
    /// Short code used in team sheets (`GK`, `CB`, ...).
    pub const fn code(self) -> &'static str {
        match self {
            Self::Goalkeeper => "GK",
            Self::CentreBack => "CB",
            Self::LeftBack => "LB",
            Self::RightBack => "RB",
            Self::DefensiveMidfielder => "CDM",
            Self::CentralMidfielder => "CM",
            Self::AttackingMidfielder => "CAM",
            Self::LeftWinger => "LW",
            Self::RightWinger => "RW",
            Self::Striker => "ST",
        }
    }

    /// Coarse line of the pitch the position plays in.
    pub const fn group(self) -> PositionGroup {
        match self {
            Self::Goalkeeper => PositionGroup::Goalkeeper,
            Self::CentreBack | Self::LeftBack | Self::RightBack => PositionGroup::Defender,
            Self::DefensiveMidfielder | Self::CentralMidfielder | Self::AttackingMidfielder => {
                PositionGroup::Midfielder
            }
            Self::LeftWinger | Self::RightWinger | Self::Striker => PositionGroup::Forward,
        }
    }

    /// Whether this is the goalkeeper position.
    pub const fn is_goalkeeper(self) -> bool {
        matches!(self, Self::Goalkeeper)
    }
}

/// Coarse grouping of positions into pitch lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum PositionGroup {
    /// Goalkeepers.
    Goalkeeper,
    /// Back line.
    Defender,
    /// Midfield line.
    Midfielder,
    /// Forward line.
    Forward,
}

/// Whether a player may take part in the rest of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    /// Eligible to play.
    Available,
    /// Sent off; out for the rest of the match.
    RedCard,
    /// Injured and taken off.
    Injured,
    /// Replaced by a substitute.
    Substituted,
}

// ---------------------------------------------------------------------------
// Match state
// ---------------------------------------------------------------------------

/// Lifecycle state of an activated match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Clock running.
    Live,
    /// Break between the halves.
    Halftime,
    /// Final whistle blown; results applied.
    Finished,
    /// Waiting out the post-match pause before archival.
    Cooldown,
}

impl MatchStatus {
    /// Whether the match clock is ticking or paused at halftime.
    pub const fn is_in_play(self) -> bool {
        matches!(self, Self::Live | Self::Halftime)
    }
}

/// Half of the match currently being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum MatchPeriod {
    /// Minutes 0 to 45.
    FirstHalf,
    /// Minutes 45 to full time.
    SecondHalf,
}

/// Sub-state of the ball. Everything except `Play` is a dead-ball restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BallEvent {
    /// Ball in open play.
    Play,
    /// Restart from the centre spot.
    Kickoff,
    /// Free kick after a foul.
    #[serde(rename = "FREEKICK")]
    FreeKick,
    /// Corner kick.
    Corner,
    /// Throw-in from a touchline.
    ThrowIn,
    /// Penalty kick.
    Penalty,
    /// Goal kick by the defending goalkeeper.
    GoalKick,
}

impl BallEvent {
    /// Whether this is a dead-ball restart.
    pub const fn is_set_piece(self) -> bool {
        !matches!(self, Self::Play)
    }
}

/// Team shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Formation {
    /// Four defenders, four midfielders, two forwards.
    #[serde(rename = "4-4-2")]
    FourFourTwo,
    /// Four defenders, three midfielders, three forwards.
    #[serde(rename = "4-3-3")]
    FourThreeThree,
    /// Three centre backs, five midfielders, two forwards.
    #[serde(rename = "3-5-2")]
    ThreeFiveTwo,
    /// Double pivot behind three attacking midfielders and a striker.
    #[serde(rename = "4-2-3-1")]
    FourTwoThreeOne,
    /// Five defenders, three midfielders, two forwards.
    #[serde(rename = "5-3-2")]
    FiveThreeTwo,
}

impl Formation {
    /// Every supported formation.
    pub const ALL: [Self; 5] = [
        Self::FourFourTwo,
        Self::FourThreeThree,
        Self::ThreeFiveTwo,
        Self::FourTwoThreeOne,
        Self::FiveThreeTwo,
    ];

    /// Display code such as `4-4-2`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::FourFourTwo => "4-4-2",
            Self::FourThreeThree => "4-3-3",
            Self::ThreeFiveTwo => "3-5-2",
            Self::FourTwoThreeOne => "4-2-3-1",
            Self::FiveThreeTwo => "5-3-2",
        }
    }
}

/// Team instructions that bend the formation template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Tactic {
    /// Plain formation shape.
    Balanced,
    /// Players pulled back and towards the centre.
    CompactDefense,
    /// Wide players hug the touchlines.
    WingPlay,
    /// Forwards push up while the team has the ball.
    CounterAttack,
}

impl Tactic {
    /// Every supported tactic.
    pub const ALL: [Self; 4] = [
        Self::Balanced,
        Self::CompactDefense,
        Self::WingPlay,
        Self::CounterAttack,
    ];
}

/// Weather on match day. Flavour only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Weather {
    /// Clear skies.
    Clear,
    /// Cloud cover.
    Cloudy,
    /// Drizzle.
    #[serde(rename = "Light Rain")]
    LightRain,
    /// Grey and overcast.
    Overcast,
    /// Sunshine.
    Sunny,
    /// Mixed sun and cloud.
    #[serde(rename = "Partly Cloudy")]
    PartlyCloudy,
}

impl Weather {
    /// Every weather condition.
    pub const ALL: [Self; 6] = [
        Self::Clear,
        Self::Cloudy,
        Self::LightRain,
        Self::Overcast,
        Self::Sunny,
        Self::PartlyCloudy,
    ];

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Cloudy => "Cloudy",
            Self::LightRain => "Light Rain",
            Self::Overcast => "Overcast",
            Self::Sunny => "Sunny",
            Self::PartlyCloudy => "Partly Cloudy",
        }
    }
}

/// Category of a commentary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Kick-off of either half.
    Kickoff,
    /// A goal.
    Goal,
    /// A missed scoring chance.
    Chance,
    /// Yellow or red card.
    Card,
    /// A foul without a card.
    Foul,
    /// Corner kick awarded.
    Corner,
    /// Penalty kick awarded.
    Penalty,
    /// Player change.
    Substitution,
    /// Flavour text.
    Commentary,
    /// Halftime whistle.
    Halftime,
    /// Final whistle.
    FullTime,
}

/// Colour of a disciplinary card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum CardColor {
    /// Caution.
    Yellow,
    /// Sending off.
    Red,
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

/// One result in a team's recent form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FormResult {
    /// Victory.
    #[serde(rename = "W")]
    Win,
    /// Draw.
    #[serde(rename = "D")]
    Draw,
    /// Defeat.
    #[serde(rename = "L")]
    Loss,
}

impl FormResult {
    /// League points awarded for the result.
    pub const fn points(self) -> u32 {
        match self {
            Self::Win => 3,
            Self::Draw => 1,
            Self::Loss => 0,
        }
    }

    /// Single-letter code (`W`, `D`, `L`).
    pub const fn code(self) -> char {
        match self {
            Self::Win => 'W',
            Self::Draw => 'D',
            Self::Loss => 'L',
        }
    }

    /// Result for a side given the final score from that side's view.
    pub const fn from_score(scored: u32, conceded: u32) -> Self {
        if scored > conceded {
            Self::Win
        } else if scored == conceded {
            Self::Draw
        } else {
            Self::Loss
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn formation_serializes_as_code() {
        let json = serde_json::to_string(&Formation::FourTwoThreeOne).unwrap();
        assert_eq!(json, "\"4-2-3-1\"");
    }

    #[test]
    fn ball_event_wire_names() {
        assert_eq!(serde_json::to_string(&BallEvent::FreeKick).unwrap(), "\"FREEKICK\"");
        assert_eq!(serde_json::to_string(&BallEvent::ThrowIn).unwrap(), "\"THROW_IN\"");
        assert_eq!(serde_json::to_string(&BallEvent::GoalKick).unwrap(), "\"GOAL_KICK\"");
    }

    #[test]
    fn form_result_from_score() {
        assert_eq!(FormResult::from_score(2, 1), FormResult::Win);
        assert_eq!(FormResult::from_score(1, 1), FormResult::Draw);
        assert_eq!(FormResult::from_score(0, 3), FormResult::Loss);
        assert_eq!(FormResult::Win.points(), 3);
    }

    #[test]
    fn position_groups() {
        assert_eq!(Position::Goalkeeper.group(), PositionGroup::Goalkeeper);
        assert_eq!(Position::RightBack.group(), PositionGroup::Defender);
        assert_eq!(Position::AttackingMidfielder.group(), PositionGroup::Midfielder);
        assert_eq!(Position::LeftWinger.group(), PositionGroup::Forward);
    }

    #[test]
    fn side_opponent_round_trips() {
        for side in Side::BOTH {
            assert_eq!(side.opponent().opponent(), side);
        }
    }
}
