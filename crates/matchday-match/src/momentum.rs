//! Per-side momentum.
//!
//! Momentum lives in `[-1, 1]` for each side. Goals, red cards, corners,
//! and fouls push the two sides in opposite directions; pressure is the
//! halved difference, positive when the home side is on top.

use chrono::{DateTime, Utc};
use matchday_types::{MatchMomentum, MomentumMark, Side};

/// Something that shifts momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swing {
    /// The side scored.
    Goal,
    /// The side lost a player to a red card.
    RedCard,
    /// The side won a corner.
    Corner,
    /// The side committed a foul.
    Foul,
}

impl Swing {
    /// Deltas applied to the acting side and to its opponent.
    const fn deltas(self) -> (f64, f64) {
        match self {
            Self::Goal => (0.3, -0.2),
            Self::RedCard => (-0.4, 0.2),
            Self::Corner => (0.1, -0.1),
            Self::Foul => (-0.05, 0.05),
        }
    }
}

/// Apply a swing caused by (or happening to) `side`.
pub fn apply(
    momentum: &mut MatchMomentum,
    swing: Swing,
    side: Side,
    minute: u32,
    now: DateTime<Utc>,
) {
    let (own, other) = swing.deltas();
    let (home_delta, away_delta) = match side {
        Side::Home => (own, other),
        Side::Away => (other, own),
    };
    momentum.home = (momentum.home + home_delta).clamp(-1.0, 1.0);
    momentum.away = (momentum.away + away_delta).clamp(-1.0, 1.0);
    momentum.pressure = (momentum.home - momentum.away) / 2.0;

    let mark = Some(MomentumMark { side, minute });
    match swing {
        Swing::Goal => momentum.last_goal = mark,
        Swing::RedCard => momentum.last_red_card = mark,
        Swing::Corner | Swing::Foul => {}
    }
    momentum.last_update = now;
}

/// Momentum of one side.
pub const fn of(momentum: &MatchMomentum, side: Side) -> f64 {
    match side {
        Side::Home => momentum.home,
        Side::Away => momentum.away,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use matchday_types::MatchId;

    use super::*;

    fn fresh() -> MatchMomentum {
        MatchMomentum {
            match_id: MatchId::new(1),
            home: 0.0,
            away: 0.0,
            last_goal: None,
            last_red_card: None,
            pressure: 0.0,
            last_update: Utc::now(),
        }
    }

    #[test]
    fn goal_lifts_scorer_and_marks_minute() {
        let mut m = fresh();
        apply(&mut m, Swing::Goal, Side::Away, 33, Utc::now());
        assert!((m.away - 0.3).abs() < 1e-12);
        assert!((m.home + 0.2).abs() < 1e-12);
        assert!((m.pressure + 0.25).abs() < 1e-12);
        assert_eq!(
            m.last_goal,
            Some(MomentumMark {
                side: Side::Away,
                minute: 33
            })
        );
        assert!(m.last_red_card.is_none());
    }

    #[test]
    fn red_card_hurts_offending_side() {
        let mut m = fresh();
        apply(&mut m, Swing::RedCard, Side::Home, 70, Utc::now());
        assert!(of(&m, Side::Home) < 0.0);
        assert!(of(&m, Side::Away) > 0.0);
        assert_eq!(m.last_red_card.unwrap().minute, 70);
    }

    #[test]
    fn values_stay_bounded() {
        let mut m = fresh();
        for minute in 0..40 {
            apply(&mut m, Swing::Goal, Side::Home, minute, Utc::now());
        }
        assert!((m.home - 1.0).abs() < 1e-12);
        assert!((m.away + 1.0).abs() < 1e-12);
        assert!((m.pressure - 1.0).abs() < 1e-12);
        for minute in 0..40 {
            apply(&mut m, Swing::Foul, Side::Home, minute, Utc::now());
        }
        assert!((-1.0..=1.0).contains(&m.home));
        assert!((-1.0..=1.0).contains(&m.pressure));
    }
}
