//! Units of work over the shared state.
//!
//! Each function here is one critical section: the caller holds the state
//! write lock (and, where fixtures are activated, the selection lock) for
//! its whole duration. None of them fail; conditions that cannot be met
//! this cycle are logged and skipped.

use chrono::{DateTime, Utc};
use matchday_league::{
    FixtureBook, MatchResult, Selection, SelectionRequest, apply_form,
};
use matchday_match::{MatchSetup, TickContext, Transition, create_match};
use matchday_types::{FixtureId, FormResult, League, MatchId, MatchStatus};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::state::SimulationState;

/// Outcome of one attempt to start the next fixture of a league.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A new match entered the active set.
    Started(MatchId),
    /// The league already runs its maximum number of matches.
    AtCapacity,
    /// Every fixture of the league has been played.
    Exhausted,
    /// All unplayed fixtures involve teams that are on the pitch.
    Blocked,
    /// Another caller claimed the chosen fixture first.
    RaceLost(FixtureId),
    /// The fixture was claimed but no match could be built from it.
    Failed(FixtureId),
}

impl Activation {
    /// The new match, if one started.
    pub const fn started(self) -> Option<MatchId> {
        match self {
            Self::Started(id) => Some(id),
            _ => None,
        }
    }
}

/// What one sweep over the active set did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Matches that were ticked.
    pub advanced: usize,
    /// Matches that reached halftime.
    pub halftimes: Vec<MatchId>,
    /// Matches whose full-time whistle blew; each now needs a cooldown.
    pub finished: Vec<MatchId>,
    /// Matches started to fill idle leagues.
    pub activated: Vec<MatchId>,
}

/// Tick every active match once, settle the finished ones, and start
/// matches in leagues that have none.
pub fn sweep(
    state: &mut SimulationState,
    book: &FixtureBook,
    config: &SimulationConfig,
    now: DateTime<Utc>,
) -> SweepReport {
    let mut report = SweepReport::default();

    let SimulationState {
        matches,
        players,
        rng,
        commentary_seq,
        ..
    } = &mut *state;
    for (&id, live) in matches.iter_mut() {
        if !live.info.status.is_in_play() {
            continue;
        }
        let mut ctx = TickContext {
            players: &mut *players,
            rules: &config.match_rules,
            now,
            rng: &mut *rng,
            commentary_seq: &mut *commentary_seq,
        };
        match matchday_match::advance(live, &mut ctx) {
            Transition::Halftime => report.halftimes.push(id),
            Transition::FullTime => report.finished.push(id),
            Transition::None | Transition::SecondHalf => {}
        }
        report.advanced = report.advanced.saturating_add(1);
    }

    for &id in &report.finished {
        record_result(state, id, now);
    }

    report.activated = fill_idle_leagues(state, book, config, now);
    debug!(
        advanced = report.advanced,
        finished = report.finished.len(),
        activated = report.activated.len(),
        active = state.matches.len(),
        "Match sweep complete"
    );
    report
}

/// Apply a finished match to form, streaks, and the table, then move it
/// into cooldown.
fn record_result(state: &mut SimulationState, match_id: MatchId, now: DateTime<Utc>) {
    let Some(live) = state.matches.get_mut(&match_id) else {
        return;
    };
    if live.info.status != MatchStatus::Finished {
        return;
    }
    live.info.status = MatchStatus::Cooldown;

    let m = &live.info;
    let league = m.league;
    let result = MatchResult {
        home: m.home_team.id,
        away: m.away_team.id,
        home_goals: m.home_score,
        away_goals: m.away_score,
    };

    let sides = [
        (result.home, FormResult::from_score(result.home_goals, result.away_goals), true),
        (result.away, FormResult::from_score(result.away_goals, result.home_goals), false),
    ];
    for (team_id, outcome, at_home) in sides {
        if let Some(team) = state.teams.get_mut(&team_id) {
            apply_form(team, outcome, at_home);
        }
    }

    let form = |team| {
        state
            .teams
            .get(&team)
            .map(|t| t.form.clone())
            .unwrap_or_default()
    };
    let (home_form, away_form) = (form(result.home), form(result.away));
    state
        .tables
        .record(league, &result, (&home_form, &away_form), now);

    info!(
        match_id = %match_id,
        %league,
        home_goals = result.home_goals,
        away_goals = result.away_goals,
        "League table updated"
    );
}

/// Try to start the next fixture of a league.
///
/// Selection and claim are two steps on the fixture book; a claim that
/// finds the fixture already played backs off without creating anything.
pub fn activate_next(
    state: &mut SimulationState,
    book: &FixtureBook,
    config: &SimulationConfig,
    league: League,
    now: DateTime<Utc>,
) -> Activation {
    let busy = state.busy_teams();
    let request = SelectionRequest {
        league,
        active_in_league: state.active_in_league(league),
        capacity: config.league.max_simultaneous_matches,
        busy_teams: &busy,
        fairness_tolerance: config.league.fairness_tolerance,
    };

    let fixture_id = match book.select_next(&request) {
        Selection::Candidate(id) => id,
        Selection::AtCapacity => {
            debug!(%league, capacity = request.capacity, "League at capacity, activation skipped");
            return Activation::AtCapacity;
        }
        Selection::Exhausted => {
            debug!(%league, "No fixtures left, activation skipped");
            return Activation::Exhausted;
        }
        Selection::Blocked => {
            debug!(%league, busy = busy.len(), "Remaining fixtures involve busy teams");
            return Activation::Blocked;
        }
    };

    let match_id = state.next_match_id;
    let fixture = match book.claim(fixture_id, match_id) {
        Ok(fixture) => fixture,
        Err(err) => {
            debug!(%league, fixture_id = %fixture_id, error = %err, "Fixture claim lost, backing off");
            return Activation::RaceLost(fixture_id);
        }
    };
    state.next_match_id = match_id.next();

    let teams = (
        state.teams.get(&fixture.home_team).cloned(),
        state.teams.get(&fixture.away_team).cloned(),
    );
    let (Some(home), Some(away)) = teams else {
        warn!(fixture_id = %fixture_id, "Fixture references an unknown team");
        return Activation::Failed(fixture_id);
    };
    let setup = MatchSetup {
        id: match_id,
        fixture,
        season: state.season,
        home,
        away,
    };

    let SimulationState {
        matches,
        players,
        rng,
        commentary_seq,
        ..
    } = &mut *state;
    let mut ctx = TickContext {
        players,
        rules: &config.match_rules,
        now,
        rng,
        commentary_seq,
    };
    match create_match(setup, &mut ctx) {
        Ok(live) => {
            matches.insert(match_id, live);
            Activation::Started(match_id)
        }
        Err(err) => {
            warn!(fixture_id = %fixture_id, error = %err, "Match could not be created");
            Activation::Failed(fixture_id)
        }
    }
}

/// Start matches in every league that has none in the active set, up to
/// the league's capacity.
pub fn fill_idle_leagues(
    state: &mut SimulationState,
    book: &FixtureBook,
    config: &SimulationConfig,
    now: DateTime<Utc>,
) -> Vec<MatchId> {
    let mut started = Vec::new();
    for league in League::ALL {
        if state.active_in_league(league) > 0 {
            continue;
        }
        for _ in 0..config.league.max_simultaneous_matches {
            match activate_next(state, book, config, league, now) {
                Activation::Started(id) => started.push(id),
                // A lost race or a failed build leaves the fixture played;
                // the next one may still start.
                Activation::RaceLost(_) | Activation::Failed(_) => {}
                Activation::AtCapacity | Activation::Exhausted | Activation::Blocked => break,
            }
        }
    }
    if !started.is_empty() {
        info!(started = started.len(), "Idle leagues filled");
    }
    started
}

/// Remove a cooled-down match from the active set and ask for a
/// replacement in its league.
///
/// Re-validates on entry: a match that is gone or still in play is left
/// alone and no replacement is requested.
pub fn archive(
    state: &mut SimulationState,
    book: &FixtureBook,
    config: &SimulationConfig,
    match_id: MatchId,
    now: DateTime<Utc>,
) -> Option<Activation> {
    let league = match state.matches.get(&match_id) {
        Some(live) if !live.info.status.is_in_play() => live.info.league,
        Some(_) => {
            warn!(match_id = %match_id, "Archive requested for a match still in play");
            return None;
        }
        None => {
            debug!(match_id = %match_id, "Match already archived");
            return None;
        }
    };
    state.matches.remove(&match_id);

    let replacement = activate_next(state, book, config, league, now);
    info!(
        match_id = %match_id,
        %league,
        replacement = ?replacement.started(),
        active_in_league = state.active_in_league(league),
        "Match archived"
    );
    Some(replacement)
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

    fn make_world(capacity: usize) -> (SimulationState, FixtureBook, SimulationConfig) {
        let mut config = SimulationConfig::default();
        config.league.max_simultaneous_matches = capacity;
        let mut rng = StdRng::seed_from_u64(3);
        let roster = seed_roster(&mut rng, 25);
        let now = Utc::now();
        let state = SimulationState::new(roster, rng, now).unwrap();
        let book = FixtureBook::new();
        state
            .schedule_season(&book, config.timing.fixture_spacing(), now)
            .unwrap();
        (state, book, config)
    }

    #[test]
    fn first_sweep_fills_every_league_to_capacity() {
        let (mut state, book, config) = make_world(3);
        let report = sweep(&mut state, &book, &config, Utc::now());

        assert_eq!(report.advanced, 0);
        assert_eq!(report.activated.len(), 6);
        for league in League::ALL {
            assert_eq!(state.active_in_league(league), 3);
        }
        // No team plays twice at once.
        assert_eq!(state.busy_teams().len(), 12);
    }

    #[test]
    fn activation_stamps_the_fixture() {
        let (mut state, book, config) = make_world(1);
        let id = activate_next(&mut state, &book, &config, League::LaLiga, Utc::now())
            .started()
            .unwrap();
        let fixture = book
            .league_fixtures(League::LaLiga)
            .into_iter()
            .find(|f| f.match_id == Some(id))
            .unwrap();
        assert!(fixture.played);
        assert_eq!(state.matches[&id].info.fixture_id, fixture.id);
        assert_eq!(state.next_match_id, id.next());
    }

    #[test]
    fn capacity_rejects_without_creating_a_match() {
        let (mut state, book, config) = make_world(1);
        let now = Utc::now();
        activate_next(&mut state, &book, &config, League::PremierLeague, now);
        let next_id = state.next_match_id;

        let outcome = activate_next(&mut state, &book, &config, League::PremierLeague, now);
        assert_eq!(outcome, Activation::AtCapacity);
        assert_eq!(state.matches.len(), 1);
        assert_eq!(state.next_match_id, next_id);
    }

    #[test]
    fn finished_match_updates_table_and_cools_down() {
        let (mut state, book, config) = make_world(1);
        let start = Utc::now();
        sweep(&mut state, &book, &config, start);
        let id = *state.matches.keys().next().unwrap();
        let league = state.matches[&id].info.league;

        let mut finished = Vec::new();
        for step in 1..400 {
            let report = sweep(&mut state, &book, &config, start + Duration::seconds(step));
            finished.extend(report.finished);
            if finished.contains(&id) {
                break;
            }
        }
        assert!(finished.contains(&id));

        let live = &state.matches[&id];
        assert_eq!(live.info.status, MatchStatus::Cooldown);
        let home = live.info.home_team.id;
        let row = state
            .tables
            .table(league)
            .iter()
            .find(|r| r.team_id == home)
            .unwrap();
        assert_eq!(row.played, 1);
        assert_eq!(row.goals_for, live.info.home_score);
        assert_eq!(state.teams[&home].form.len(), 1);

        // Cooling down still holds the slot.
        assert_eq!(
            activate_next(&mut state, &book, &config, league, start),
            Activation::AtCapacity
        );
    }

    #[test]
    fn archive_frees_the_slot_and_replaces() {
        let (mut state, book, config) = make_world(1);
        let now = Utc::now();
        let id = activate_next(&mut state, &book, &config, League::LaLiga, now)
            .started()
            .unwrap();

        // Still live: nothing happens.
        assert_eq!(archive(&mut state, &book, &config, id, now), None);
        assert!(state.matches.contains_key(&id));

        state.matches.get_mut(&id).unwrap().info.status = MatchStatus::Cooldown;
        let replacement = archive(&mut state, &book, &config, id, now).unwrap();
        let new_id = replacement.started().unwrap();
        assert!(!state.matches.contains_key(&id));
        assert!(state.matches.contains_key(&new_id));

        // A second wake-up for the same match is a no-op.
        assert_eq!(archive(&mut state, &book, &config, id, now), None);
    }

    #[test]
    fn exhausted_league_is_not_replaced() {
        let (mut state, book, config) = make_world(4);
        let now = Utc::now();
        book.install(League::LaLiga, Vec::new());
        assert_eq!(
            activate_next(&mut state, &book, &config, League::LaLiga, now),
            Activation::Exhausted
        );
        let started = fill_idle_leagues(&mut state, &book, &config, now);
        assert_eq!(started.len(), 4);
        assert_eq!(state.active_in_league(League::LaLiga), 0);
    }
}
