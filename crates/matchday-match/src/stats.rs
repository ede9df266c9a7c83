//! Running team statistics.

use chrono::{DateTime, Utc};
use matchday_types::Side;
use rand::Rng;

use crate::live::LiveMatch;

/// Extra possession share for the side on the ball.
const POSSESSION_BIAS: f64 = 4.0;

/// Refresh possession, passes, and pass accuracy for one tick.
///
/// Possession drifts around an even split with a slow oscillation and
/// leans towards the side on the ball. The two shares always sum to 100.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn update<R: Rng + ?Sized>(live: &mut LiveMatch, rng: &mut R, now: DateTime<Utc>) {
    let on_ball = live.possession_side();
    let bias = match on_ball {
        Some(Side::Home) => POSSESSION_BIAS,
        Some(Side::Away) => -POSSESSION_BIAS,
        None => 0.0,
    };
    let wave = (f64::from(live.info.minute) / 10.0).sin() * 10.0;
    let home_share = (50.0 + wave + bias).clamp(25.0, 75.0).round() as u32;
    live.stats.home.possession = home_share;
    live.stats.away.possession = 100_u32.saturating_sub(home_share);

    if rng.random_bool(0.7) {
        let side = on_ball.unwrap_or(if rng.random_bool(0.5) {
            Side::Home
        } else {
            Side::Away
        });
        let team = live.stats.side_mut(side);
        team.passes = team.passes.saturating_add(rng.random_range(1..=3));
        team.pass_accuracy = rng.random_range(75.0..95.0);
    }
    live.stats.last_update = now;
}
