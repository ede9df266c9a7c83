//! Team strength and pre-match odds.

use matchday_types::{Player, TeamInfo};

/// Multiplier applied to the home side's strength.
pub const HOME_ADVANTAGE: f64 = 1.1;

/// Strength reported for a club with no players.
const DEFAULT_STRENGTH: f64 = 0.5;

/// Maximum form points over five matches.
const MAX_FORM_POINTS: f64 = 15.0;

/// Win/draw/loss probabilities before kick-off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreMatchOdds {
    /// Home win.
    pub home_win: f64,
    /// Draw.
    pub draw: f64,
    /// Away win.
    pub away_win: f64,
}

/// Relative strength of a club in `[0.1, 1.0]`.
///
/// Average in-match rating of the squad, scaled by a form multiplier
/// (0.8 with no points to 1.2 with fifteen) and by the squad's average
/// overall attribute.
#[allow(clippy::cast_precision_loss)]
pub fn team_strength(team: &TeamInfo, squad: &[&Player]) -> f64 {
    if squad.is_empty() {
        return DEFAULT_STRENGTH;
    }
    let count = squad.len() as f64;
    let avg_rating = squad.iter().map(|p| p.current_rating).sum::<f64>() / count;
    let avg_overall = squad
        .iter()
        .map(|p| f64::from(p.characteristics.overall) / 100.0)
        .sum::<f64>()
        / count;

    let form_multiplier = if team.form.is_empty() {
        1.0
    } else {
        (f64::from(team.form_points) / MAX_FORM_POINTS).mul_add(0.4, 0.8)
    };

    ((avg_rating / 10.0) * form_multiplier * avg_overall.mul_add(0.3, 0.7)).clamp(0.1, 1.0)
}

/// Attacking threat used for next-goal odds. Grows with form and home streak.
pub fn attack_strength(team: &TeamInfo) -> f64 {
    let form = f64::from(team.form_points) * 0.05;
    let streak = f64::from(team.home_streak) * 0.1;
    (0.5 + form + streak).clamp(0.1, 1.5)
}

/// Pre-match odds from the two strengths.
///
/// The home side gets [`HOME_ADVANTAGE`]; the draw share shrinks as the gap
/// between the sides widens. Always sums to 1.
pub fn pre_match_odds(home_strength: f64, away_strength: f64) -> PreMatchOdds {
    let home = home_strength.max(f64::EPSILON) * HOME_ADVANTAGE;
    let away = away_strength.max(f64::EPSILON);
    let total = home + away;
    let home_win = home / total;
    let away_win = away / total;
    let draw = 0.3 * (1.0 - (home_win - away_win).abs());
    let norm = home_win + draw + away_win;
    PreMatchOdds {
        home_win: home_win / norm,
        draw: draw / norm,
        away_win: away_win / norm,
    }
}
