//! Season completion and rollover.
//!
//! A season is complete once every fixture of every league has been
//! activated and the last match has left the active set. Closing it crowns
//! the champions, hands out player awards, archives a history record,
//! folds season totals into careers, and schedules the next season.

use chrono::{DateTime, Utc};
use matchday_league::{BASE_MATCH_RATING, FixtureBook, LeagueTables, champions, compute_awards};
use matchday_types::{League, PlayerSeasonStats, SeasonHistory};
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::state::SimulationState;

/// Whether the season can be closed.
pub fn is_complete(state: &SimulationState, book: &FixtureBook) -> bool {
    book.all_played() && state.matches.is_empty()
}

/// Close the current season and open the next one.
///
/// The next schedule is built before anything is changed, so a scheduling
/// error leaves the finished season in place. Returns the archived record.
pub fn end_season(
    state: &mut SimulationState,
    book: &FixtureBook,
    config: &SimulationConfig,
    now: DateTime<Utc>,
) -> Result<SeasonHistory, SimulationError> {
    let record = season_record(state, config, now);
    let plan = state.plan_season(book.next_fixture_id(), config.timing.fixture_spacing(), now)?;

    for (league, champion) in &record.champions {
        info!(
            season = record.season,
            %league,
            champion = %champion.team_name,
            points = champion.points,
            "Champions crowned"
        );
    }
    info!(
        season = record.season,
        top_scorer = record.top_scorer.as_ref().map_or("-", |w| w.name.as_str()),
        total_goals = record.total_goals,
        total_matches = record.total_matches,
        "Season ended"
    );

    state.history.push_back(record.clone());
    while state.history.len() > config.league.season_history_cap {
        state.history.pop_front();
    }

    reset_players(state);
    state.tables = LeagueTables::new(state.teams.values(), now);
    state.season = state.season.saturating_add(1);
    state.season_started_at = now;
    state.install_season(book, plan);

    info!(season = state.season, "New season started");
    Ok(record)
}

/// Build the history record from the final tables and player totals.
fn season_record(
    state: &SimulationState,
    config: &SimulationConfig,
    now: DateTime<Utc>,
) -> SeasonHistory {
    let awards = compute_awards(
        state.players.values(),
        config.league.min_appearances_for_award,
    );

    let mut total_goals = 0_u32;
    let mut team_games = 0_u32;
    for league in League::ALL {
        for row in state.tables.table(league) {
            total_goals = total_goals.saturating_add(row.goals_for);
            team_games = team_games.saturating_add(row.played);
        }
    }

    SeasonHistory {
        season: state.season,
        champions: champions(&state.tables),
        top_scorer: awards.top_scorer,
        top_assists: awards.top_assists,
        most_fouls: awards.most_fouls,
        player_of_season: awards.player_of_season,
        total_goals,
        // Every match adds a game to two rows.
        total_matches: team_games / 2,
        end_date: now,
    }
}

/// Fold season totals into careers and clear them.
fn reset_players(state: &mut SimulationState) {
    for player in state.players.values_mut() {
        let season = player.season;
        let career = &mut player.career;
        career.appearances = career.appearances.saturating_add(season.matches_played);
        career.goals = career.goals.saturating_add(season.goals);
        career.assists = career.assists.saturating_add(season.assists);
        career.yellow_cards = career.yellow_cards.saturating_add(season.yellow_cards);
        career.red_cards = career.red_cards.saturating_add(season.red_cards);
        career.fouls = career.fouls.saturating_add(season.fouls);

        player.season = PlayerSeasonStats::default();
        player.current_rating = BASE_MATCH_RATING;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use matchday_league::{MatchResult, seed_roster};
    use matchday_types::FormResult;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn make_world(config: &SimulationConfig) -> (SimulationState, FixtureBook) {
        let mut rng = StdRng::seed_from_u64(8);
        let roster = seed_roster(&mut rng, 25);
        let now = Utc::now();
        let state = SimulationState::new(roster, rng, now).unwrap();
        let book = FixtureBook::new();
        state
            .schedule_season(&book, config.timing.fixture_spacing(), now)
            .unwrap();
        (state, book)
    }

    fn claim_everything(book: &FixtureBook) {
        let mut match_id = matchday_types::MatchId::new(1);
        for league in League::ALL {
            for fixture in book.league_fixtures(league) {
                book.claim(fixture.id, match_id).unwrap();
                match_id = match_id.next();
            }
        }
    }

    #[test]
    fn incomplete_until_every_fixture_is_played() {
        let config = SimulationConfig::default();
        let (state, book) = make_world(&config);
        assert!(!is_complete(&state, &book));

        let last = book.league_fixtures(League::LaLiga).pop().unwrap();
        let mut match_id = matchday_types::MatchId::new(1);
        for league in League::ALL {
            for fixture in book.league_fixtures(league) {
                if fixture.id != last.id {
                    book.claim(fixture.id, match_id).unwrap();
                    match_id = match_id.next();
                }
            }
        }
        assert!(!is_complete(&state, &book));

        book.claim(last.id, match_id).unwrap();
        assert!(is_complete(&state, &book));
    }

    #[test]
    fn season_end_archives_and_resets() {
        let config = SimulationConfig::default();
        let (mut state, book) = make_world(&config);
        let now = Utc::now();

        let teams = state.league_teams(League::PremierLeague);
        let result = MatchResult {
            home: teams[0],
            away: teams[1],
            home_goals: 3,
            away_goals: 1,
        };
        let form = [FormResult::Win];
        state
            .tables
            .record(League::PremierLeague, &result, (&form, &form), now);

        let scorer = *state.players.keys().nth(22).unwrap();
        {
            let p = state.players.get_mut(&scorer).unwrap();
            p.season.goals = 3;
            p.season.matches_played = 1;
            p.career.goals = 10;
            p.current_rating = 8.0;
        }
        claim_everything(&book);

        let record = end_season(&mut state, &book, &config, now).unwrap();

        assert_eq!(record.season, 1);
        assert_eq!(record.champions[&League::PremierLeague].team_id, teams[0]);
        assert_eq!(record.top_scorer.as_ref().unwrap().player_id, scorer);
        assert_eq!(record.total_goals, 4);
        assert_eq!(record.total_matches, 1);

        assert_eq!(state.season, 2);
        assert_eq!(state.history.len(), 1);
        let p = &state.players[&scorer];
        assert_eq!(p.season.goals, 0);
        assert_eq!(p.career.goals, 13);
        assert_eq!(p.career.appearances, 1);
        assert!((p.current_rating - BASE_MATCH_RATING).abs() < f64::EPSILON);
        assert!(state.tables.table(League::PremierLeague).iter().all(|r| r.played == 0));

        // A fresh, unplayed schedule with ids that keep counting.
        assert!(!book.all_played());
        let progress = book.progress();
        assert_eq!(progress.total, 760);
        assert_eq!(progress.played, 0);
        let first_new = book
            .league_fixtures(League::PremierLeague)
            .iter()
            .map(|f| f.id)
            .min()
            .unwrap();
        assert!(first_new.into_inner() > 760);
    }

    #[test]
    fn history_is_capped() {
        let mut config = SimulationConfig::default();
        config.league.season_history_cap = 2;
        let (mut state, book) = make_world(&config);

        for _ in 0..4 {
            claim_everything(&book);
            end_season(&mut state, &book, &config, Utc::now()).unwrap();
        }
        assert_eq!(state.season, 5);
        let seasons: Vec<u32> = state.history.iter().map(|h| h.season).collect();
        assert_eq!(seasons, vec![3, 4]);
    }

    #[test]
    fn failed_rollover_leaves_the_season_untouched() {
        let config = SimulationConfig::default();
        let (mut state, book) = make_world(&config);
        let scorer = *state.players.keys().next().unwrap();
        state.players.get_mut(&scorer).unwrap().season.goals = 2;
        claim_everything(&book);

        state.teams.retain(|_, team| team.league != League::LaLiga);
        let err = end_season(&mut state, &book, &config, Utc::now());
        assert!(matches!(err, Err(SimulationError::League { .. })));

        assert_eq!(state.season, 1);
        assert!(state.history.is_empty());
        assert_eq!(state.players[&scorer].season.goals, 2);
        assert!(book.all_played());
        assert_eq!(book.progress().total, 760);
        assert_eq!(book.league_fixtures(League::LaLiga).len(), 380);
    }

    #[test]
    fn empty_season_still_closes() {
        let config = SimulationConfig::default();
        let (mut state, book) = make_world(&config);
        claim_everything(&book);

        let record = end_season(&mut state, &book, &config, Utc::now()).unwrap();
        assert_eq!(record.total_goals, 0);
        assert_eq!(record.champions.len(), 2);
    }
}
