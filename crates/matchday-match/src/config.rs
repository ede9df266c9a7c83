//! Tunable rules for a single live match.
//!
//! [`MatchRules`] is deserialized from the `match_rules` section of
//! `matchday-config.yaml`. Every field has a default, so a partial section
//! (or none at all) is valid.

use serde::Deserialize;

/// Probabilities, caps, and pauses applied by the match tick.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchRules {
    /// Chance per tick that the event generator fires (default: 0.15).
    #[serde(default = "default_event_chance")]
    pub event_chance: f64,

    /// Share of cards that are straight reds (default: 0.10).
    #[serde(default = "default_red_card_share")]
    pub red_card_share: f64,

    /// Chance per tick that the player on the ball passes (default: 0.30).
    #[serde(default = "default_pass_chance")]
    pub pass_chance: f64,

    /// Chance that a penalty is converted (default: 0.80).
    #[serde(default = "default_penalty_conversion")]
    pub penalty_conversion: f64,

    /// Maximum commentary entries kept per match (default: 30).
    #[serde(default = "default_commentary_cap")]
    pub commentary_cap: usize,

    /// Upper bound for randomly drawn injury time, in minutes (default: 6).
    #[serde(default = "default_max_injury_time")]
    pub max_injury_time: u32,

    /// Substitutions allowed per side (default: 5).
    #[serde(default = "default_max_substitutions")]
    pub max_substitutions: u32,

    /// Chance per tick and side of a tactical change (default: 0.04).
    #[serde(default = "default_substitution_chance")]
    pub substitution_chance: f64,

    /// Minute from which tactical changes are considered (default: 60).
    #[serde(default = "default_substitution_minute")]
    pub substitution_minute: u32,

    /// Length of the halftime break in seconds (default: 15).
    #[serde(default = "default_halftime_break_secs")]
    pub halftime_break_secs: u64,

    /// How long the ball stays dead at a restart, in ms (default: 3000).
    #[serde(default = "default_set_piece_pause_ms")]
    pub set_piece_pause_ms: u64,
}

const fn default_event_chance() -> f64 {
    0.15
}

const fn default_red_card_share() -> f64 {
    0.10
}

const fn default_pass_chance() -> f64 {
    0.30
}

const fn default_penalty_conversion() -> f64 {
    0.80
}

const fn default_commentary_cap() -> usize {
    30
}

const fn default_max_injury_time() -> u32 {
    6
}

const fn default_max_substitutions() -> u32 {
    5
}

const fn default_substitution_chance() -> f64 {
    0.04
}

const fn default_substitution_minute() -> u32 {
    60
}

const fn default_halftime_break_secs() -> u64 {
    15
}

const fn default_set_piece_pause_ms() -> u64 {
    3000
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            event_chance: default_event_chance(),
            red_card_share: default_red_card_share(),
            pass_chance: default_pass_chance(),
            penalty_conversion: default_penalty_conversion(),
            commentary_cap: default_commentary_cap(),
            max_injury_time: default_max_injury_time(),
            max_substitutions: default_max_substitutions(),
            substitution_chance: default_substitution_chance(),
            substitution_minute: default_substitution_minute(),
            halftime_break_secs: default_halftime_break_secs(),
            set_piece_pause_ms: default_set_piece_pause_ms(),
        }
    }
}

impl MatchRules {
    /// Halftime break as a chrono duration.
    pub fn halftime_break(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.halftime_break_secs).unwrap_or(i64::MAX))
    }

    /// Set-piece pause as a chrono duration.
    pub fn set_piece_pause(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.set_piece_pause_ms).unwrap_or(i64::MAX))
    }
}
