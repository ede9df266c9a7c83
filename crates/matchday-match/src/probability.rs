//! Live outcome probabilities.
//!
//! Every recalculation starts again from the kick-off odds, so repeated
//! refreshes never compound. The score, the player count, and momentum
//! shift probability between the two sides; the shift is damped as the
//! match runs out so the closing minutes do not swing wildly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use matchday_league::PreMatchOdds;
use matchday_types::Side;

use crate::live::LiveMatch;

/// Shift per goal of score difference.
const SCORE_WEIGHT: f64 = 0.18;

/// Shift per player of numerical advantage.
const PLAYER_WEIGHT: f64 = 0.08;

/// Shift per unit of momentum difference.
const MOMENTUM_WEIGHT: f64 = 0.10;

/// Goals beyond this lead stop moving the odds.
const MAX_COUNTED_LEAD: f64 = 3.0;

/// Bounds for every probability before renormalization.
const FLOOR: f64 = 0.01;
const CEILING: f64 = 0.98;

/// Bounds for each side's next-goal chance.
const NEXT_GOAL_FLOOR: f64 = 0.05;
const NEXT_GOAL_CEILING: f64 = 0.95;

/// Match state the model reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInput {
    /// Kick-off odds.
    pub baseline: PreMatchOdds,
    /// Goals, home then away.
    pub score: [u32; 2],
    /// Players on the pitch, home then away.
    pub players: [u32; 2],
    /// Momentum, home then away.
    pub momentum: [f64; 2],
    /// Attack strength, home then away.
    pub attack: [f64; 2],
    /// Current minute.
    pub minute: u32,
    /// Minute the match ends, injury time included.
    pub full_time: u32,
}

/// Output of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveOdds {
    /// Home win.
    pub home_win: f64,
    /// Draw.
    pub draw: f64,
    /// Away win.
    pub away_win: f64,
    /// Home side scores next.
    pub home_next_goal: f64,
    /// Away side scores next.
    pub away_next_goal: f64,
    /// Named intermediate values.
    pub factors: BTreeMap<String, f64>,
}

/// Evaluate the model.
pub fn evaluate(input: &ModelInput) -> LiveOdds {
    let [home_score, away_score] = input.score;
    let [home_players, away_players] = input.players;
    let [home_momentum, away_momentum] = input.momentum;

    let score_diff = (f64::from(home_score) - f64::from(away_score))
        .clamp(-MAX_COUNTED_LEAD, MAX_COUNTED_LEAD);
    let player_diff = f64::from(home_players) - f64::from(away_players);
    let momentum_diff = home_momentum - away_momentum;

    let full_time = f64::from(input.full_time.max(1));
    let time_remaining = ((full_time - f64::from(input.minute)) / full_time).clamp(0.0, 1.0);
    let dampening = time_remaining.mul_add(0.5, 0.5);

    let shift = momentum_diff
        .mul_add(
            MOMENTUM_WEIGHT,
            score_diff.mul_add(SCORE_WEIGHT, player_diff * PLAYER_WEIGHT),
        )
        * dampening;

    let home = (input.baseline.home_win + shift).clamp(FLOOR, CEILING);
    let away = (input.baseline.away_win - shift).clamp(FLOOR, CEILING);
    let draw = shift
        .abs()
        .mul_add(-0.5, input.baseline.draw)
        .clamp(FLOOR, CEILING);
    let total = home + draw + away;

    let next_goal = |attack: f64, momentum: f64, players: u32| {
        let attack = (attack / 1.5).clamp(0.0, 1.0);
        let momentum = f64::midpoint(momentum, 1.0);
        let manpower = f64::from(players) / 11.0;
        (attack.mul_add(0.6, momentum * 0.4) * manpower).clamp(NEXT_GOAL_FLOOR, NEXT_GOAL_CEILING)
    };
    let [home_attack, away_attack] = input.attack;

    let factors = [
        ("score_difference", score_diff),
        ("player_difference", player_diff),
        ("momentum_difference", momentum_diff),
        ("time_remaining", time_remaining),
        ("dampening", dampening),
        ("shift", shift),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_owned(), value))
    .collect();

    LiveOdds {
        home_win: home / total,
        draw: draw / total,
        away_win: away / total,
        home_next_goal: next_goal(home_attack, home_momentum, home_players),
        away_next_goal: next_goal(away_attack, away_momentum, away_players),
        factors,
    }
}

/// Recompute a match's probabilities from its current state.
pub fn refresh(live: &mut LiveMatch, now: DateTime<Utc>) {
    let input = ModelInput {
        baseline: live.baseline,
        score: [live.info.home_score, live.info.away_score],
        players: [
            live.players_on_pitch(Side::Home),
            live.players_on_pitch(Side::Away),
        ],
        momentum: [live.momentum.home, live.momentum.away],
        attack: [live.attack(Side::Home), live.attack(Side::Away)],
        minute: live.info.minute,
        full_time: live.info.injury_time.saturating_add(90),
    };
    let odds = evaluate(&input);
    let p = &mut live.probabilities;
    p.home_win = odds.home_win;
    p.draw = odds.draw;
    p.away_win = odds.away_win;
    p.home_next_goal = odds.home_next_goal;
    p.away_next_goal = odds.away_next_goal;
    p.factors = odds.factors;
    p.last_update = now;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> ModelInput {
        ModelInput {
            baseline: PreMatchOdds {
                home_win: 0.45,
                draw: 0.28,
                away_win: 0.27,
            },
            score: [0, 0],
            players: [11, 11],
            momentum: [0.0, 0.0],
            attack: [0.75, 0.75],
            minute: 0,
            full_time: 93,
        }
    }

    fn sums_to_one(odds: &LiveOdds) -> bool {
        (odds.home_win + odds.draw + odds.away_win - 1.0).abs() < 1e-9
    }

    #[test]
    fn level_game_matches_baseline() {
        let odds = evaluate(&input());
        assert!(sums_to_one(&odds));
        assert!((odds.home_win - 0.45).abs() < 1e-9);
        assert!((odds.draw - 0.28).abs() < 1e-9);
    }

    #[test]
    fn lead_favours_leader() {
        let mut i = input();
        i.score = [0, 1];
        i.minute = 30;
        let odds = evaluate(&i);
        assert!(sums_to_one(&odds));
        assert!(odds.away_win > 0.27);
        assert!(odds.home_win < 0.45);
    }

    #[test]
    fn swings_shrink_late_in_the_match() {
        let mut early = input();
        early.score = [1, 0];
        early.minute = 10;
        let mut late = early;
        late.minute = 90;
        let early_shift = evaluate(&early).factors["shift"];
        let late_shift = evaluate(&late).factors["shift"];
        assert!(late_shift < early_shift);
        assert!(late_shift > 0.0);
    }

    #[test]
    fn extreme_inputs_stay_bounded() {
        let mut i = input();
        i.score = [9, 0];
        i.players = [11, 7];
        i.momentum = [1.0, -1.0];
        let odds = evaluate(&i);
        assert!(sums_to_one(&odds));
        for p in [odds.home_win, odds.draw, odds.away_win] {
            assert!(p > 0.0 && p < 1.0);
        }
        assert!(odds.away_next_goal >= NEXT_GOAL_FLOOR);
        assert!(odds.home_next_goal <= NEXT_GOAL_CEILING);
    }

    #[test]
    fn red_card_lowers_next_goal_chance() {
        let mut i = input();
        let full = evaluate(&i).away_next_goal;
        i.players = [11, 10];
        let short = evaluate(&i);
        assert!(short.away_next_goal < full);
        assert!(short.home_win > 0.45);
        assert!(short.factors.contains_key("player_difference"));
    }
}
