//! Player ratings.
//!
//! Ratings start at 6.0 at kick-off and move with events during the match.
//! At full time the in-match figure is folded into a final rating that
//! also rewards the result, with a mentality-scaled random wobble, and the
//! final rating feeds the player's season averages.

use matchday_league::BASE_MATCH_RATING;
use matchday_types::{FormResult, Player, PlayerId};
use rand::Rng;

use crate::live::{LiveMatch, TickContext};

/// In-match bump for scoring.
pub const GOAL_BONUS: f64 = 1.5;

/// In-match bump for an assist.
pub const ASSIST_BONUS: f64 = 0.5;

/// In-match penalty for a yellow card.
pub const YELLOW_PENALTY: f64 = 0.5;

/// In-match penalty for a red card.
pub const RED_PENALTY: f64 = 2.0;

/// Furthest the in-match figure may move a final rating either way.
const MAX_EVENT_SWING: f64 = 3.0;

/// Move a player's in-match rating, kept within `[0, 10]`.
pub fn adjust(player: Option<&mut Player>, delta: f64) {
    if let Some(player) = player {
        player.current_rating = (player.current_rating + delta).clamp(0.0, 10.0);
    }
}

/// Final rating in `[1, 10]`.
pub fn final_rating<R: Rng + ?Sized>(
    current: f64,
    mentality: u8,
    result: FormResult,
    rng: &mut R,
) -> f64 {
    let result_bonus = match result {
        FormResult::Win => 0.5,
        FormResult::Draw => 0.2,
        FormResult::Loss => 0.0,
    };
    let events = (current - BASE_MATCH_RATING).clamp(-MAX_EVENT_SWING, MAX_EVENT_SWING);
    let wobble = (rng.random::<f64>() - 0.5) * 2.0 * (f64::from(mentality) / 100.0);
    (BASE_MATCH_RATING + result_bonus + events + wobble).clamp(1.0, 10.0)
}

/// Rate everyone who appeared and credit their season statistics.
///
/// Stores each rating on the match record and resets the player's
/// in-match rating for their next match.
pub fn finalize<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    let final_minute = live.info.minute;
    let appearances: Vec<(PlayerId, _)> = live.stints.iter().map(|(&id, &s)| (id, s)).collect();

    for (id, stint) in appearances {
        let Some(player) = ctx.players.get_mut(&id) else {
            continue;
        };
        let result = FormResult::from_score(
            live.info.score(stint.side),
            live.info.score(stint.side.opponent()),
        );
        let rating = final_rating(
            player.current_rating,
            player.characteristics.mentality,
            result,
            ctx.rng,
        );
        let minutes = stint.until.unwrap_or(final_minute).saturating_sub(stint.from);

        let season = &mut player.season;
        season.matches_played = season.matches_played.saturating_add(1);
        season.minutes_played = season.minutes_played.saturating_add(minutes);
        season.total_rating += rating;
        season.average_rating = season.total_rating / f64::from(season.matches_played.max(1));
        player.current_rating = BASE_MATCH_RATING;

        live.info.player_ratings.insert(id, rating);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use matchday_types::Side;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::testing::Harness;

    #[test]
    fn ratings_are_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let high = final_rating(10.0, 100, FormResult::Win, &mut rng);
            let low = final_rating(0.0, 100, FormResult::Loss, &mut rng);
            assert!((1.0..=10.0).contains(&high));
            assert!((1.0..=10.0).contains(&low));
        }
    }

    #[test]
    fn calm_players_get_no_wobble() {
        let mut rng = StdRng::seed_from_u64(2);
        let r = final_rating(7.5, 0, FormResult::Draw, &mut rng);
        assert!((r - 7.7).abs() < 1e-9);
    }

    #[test]
    fn finalize_credits_minutes_and_resets() {
        let mut h = Harness::new(31);
        let mut live = h.kick_off();
        live.info.minute = 92;
        live.info.home_score = 2;
        let scorer = live.info.home_lineup[10];
        adjust(h.players.get_mut(&scorer), GOAL_BONUS);
        let subbed = live.info.away_lineup[3];
        live.stints.get_mut(&subbed).unwrap().until = Some(60);

        finalize(&mut live, &mut h.context());

        assert_eq!(live.info.player_ratings.len(), 22);
        let p = &h.players[&scorer];
        assert_eq!(p.season.matches_played, 1);
        assert_eq!(p.season.minutes_played, 92);
        assert!((p.current_rating - BASE_MATCH_RATING).abs() < f64::EPSILON);
        assert!(live.info.player_ratings[&scorer] > 6.5);
        assert_eq!(h.players[&subbed].season.minutes_played, 60);
        assert_eq!(live.stints[&subbed].side, Side::Away);
    }
}
