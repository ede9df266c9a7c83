//! Simulation-wide aggregates.
//!
//! Two periodic tasks land here: the global aggregate refresh (active
//! matches, goals, audience, season progress) and the batched player
//! statistics pass that recomputes season averages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use matchday_league::FixtureBook;
use matchday_league::awards::best_by;
use matchday_types::{GlobalStats, League, Player, PlayerId, SeasonInfo};
use rand::Rng;

use crate::state::SimulationState;

/// Audience floor for the simulated viewer count.
const BASE_VIEWERS: u32 = 45_000;

/// Spread added on top of [`BASE_VIEWERS`].
const VIEWER_SPREAD: u32 = 200_000;

/// Aggregates before the first refresh.
pub fn empty_global_stats(season: u32, now: DateTime<Utc>) -> GlobalStats {
    GlobalStats {
        active_matches: 0,
        total_goals: 0,
        average_goals: 0.0,
        most_goals_match: None,
        most_active_match: None,
        active_viewers: 0,
        top_scorer: None,
        current_season: season,
        current_matchweek: 1,
        season_progress: 0.0,
        last_update: now,
    }
}

/// Recompute [`GlobalStats`] from the active set, players, and schedule.
pub fn refresh_global_stats(state: &mut SimulationState, book: &FixtureBook, now: DateTime<Utc>) {
    let active_matches = u32::try_from(state.matches.len()).unwrap_or(u32::MAX);
    let total_goals = state
        .matches
        .values()
        .fold(0_u32, |sum, live| sum.saturating_add(live.info.total_goals()));

    // Ties go to the lowest match id; a goalless set has no standout match.
    let mut most_goals: Option<(u32, _)> = None;
    let mut most_active: Option<(usize, _)> = None;
    for (&id, live) in &state.matches {
        let goals = live.info.total_goals();
        if goals > 0 && most_goals.is_none_or(|(top, _)| goals > top) {
            most_goals = Some((goals, id));
        }
        let lines = live.commentary.len();
        if lines > 0 && most_active.is_none_or(|(top, _)| lines > top) {
            most_active = Some((lines, id));
        }
    }

    let top_scorer = best_by(state.players.values(), |p| f64::from(p.season.goals))
        .filter(|winner| winner.value > 0.0);
    let progress = book.progress();

    state.global = GlobalStats {
        active_matches,
        total_goals,
        average_goals: if active_matches == 0 {
            0.0
        } else {
            f64::from(total_goals) / f64::from(active_matches)
        },
        most_goals_match: most_goals.map(|(_, id)| id),
        most_active_match: most_active.map(|(_, id)| id),
        active_viewers: BASE_VIEWERS.saturating_add(state.rng.random_range(0..VIEWER_SPREAD)),
        top_scorer,
        current_season: state.season,
        current_matchweek: progress.current_matchweek,
        season_progress: progress.percent(),
        last_update: now,
    };
}

/// Recompute every player's season average from its running totals.
///
/// Returns how many players have appeared this season.
pub fn refresh_player_averages(players: &mut BTreeMap<PlayerId, Player>) -> usize {
    let mut updated = 0_usize;
    for player in players.values_mut() {
        let season = &mut player.season;
        if season.matches_played > 0 {
            season.average_rating = season.total_rating / f64::from(season.matches_played);
            updated = updated.saturating_add(1);
        }
    }
    updated
}

/// Season number, matchweek, progress, and current leaders.
pub fn season_info(state: &SimulationState, book: &FixtureBook) -> SeasonInfo {
    let progress = book.progress();
    let total_matchweeks = League::ALL
        .iter()
        .flat_map(|&league| book.league_fixtures(league))
        .map(|f| f.matchday)
        .max()
        .unwrap_or(0);

    SeasonInfo {
        season: state.season,
        current_matchweek: progress.current_matchweek,
        total_matchweeks,
        total_fixtures: u32::try_from(progress.total).unwrap_or(u32::MAX),
        fixtures_played: u32::try_from(progress.played).unwrap_or(u32::MAX),
        progress: progress.percent(),
        leaders: matchday_league::champions(&state.tables),
        started_at: state.season_started_at,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use chrono::Duration;
    use matchday_league::seed_roster;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn make_state() -> (SimulationState, FixtureBook) {
        let mut rng = StdRng::seed_from_u64(11);
        let roster = seed_roster(&mut rng, 25);
        let now = Utc::now();
        let state = SimulationState::new(roster, rng, now).unwrap();
        let book = FixtureBook::new();
        state.schedule_season(&book, Duration::hours(24), now).unwrap();
        (state, book)
    }

    #[test]
    fn idle_simulation_has_quiet_aggregates() {
        let (mut state, book) = make_state();
        refresh_global_stats(&mut state, &book, Utc::now());

        let g = &state.global;
        assert_eq!(g.active_matches, 0);
        assert_eq!(g.total_goals, 0);
        assert!(g.average_goals.abs() < f64::EPSILON);
        assert_eq!(g.most_goals_match, None);
        assert_eq!(g.top_scorer, None);
        assert!((BASE_VIEWERS..BASE_VIEWERS + VIEWER_SPREAD).contains(&g.active_viewers));
        assert_eq!(g.current_matchweek, 1);
        assert!(g.season_progress.abs() < f64::EPSILON);
    }

    #[test]
    fn top_scorer_tracks_season_goals() {
        let (mut state, book) = make_state();
        let striker = *state.players.keys().nth(20).unwrap();
        state.players.get_mut(&striker).unwrap().season.goals = 4;

        refresh_global_stats(&mut state, &book, Utc::now());
        let top = state.global.top_scorer.as_ref().unwrap();
        assert_eq!(top.player_id, striker);
        assert!((top.value - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn averages_follow_totals() {
        let (mut state, _) = make_state();
        let id = *state.players.keys().next().unwrap();
        let season = &mut state.players.get_mut(&id).unwrap().season;
        season.matches_played = 4;
        season.total_rating = 30.0;

        assert_eq!(refresh_player_averages(&mut state.players), 1);
        assert!((state.players[&id].season.average_rating - 7.5).abs() < 1e-9);
    }

    #[test]
    fn season_info_counts_both_leagues() {
        let (state, book) = make_state();
        let info = season_info(&state, &book);
        assert_eq!(info.season, 1);
        assert_eq!(info.total_fixtures, 760);
        assert_eq!(info.fixtures_played, 0);
        assert_eq!(info.total_matchweeks, 38);
        assert_eq!(info.leaders.len(), 2);
    }
}
