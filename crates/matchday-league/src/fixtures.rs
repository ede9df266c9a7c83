//! The fixture book: every league's schedule behind one narrow lock.
//!
//! Activation is two steps. [`FixtureBook::select_next`] picks a candidate
//! under the lock and releases it; [`FixtureBook::claim`] re-acquires the
//! lock, re-checks the `played` flag, and flips it together with the match
//! id. A caller that loses the race between the two steps gets
//! [`ScheduleError::AlreadyClaimed`] and backs off.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use matchday_types::{Fixture, FixtureId, League, MatchId, TeamId};

use crate::error::ScheduleError;

/// Parameters for choosing the next fixture of a league.
#[derive(Debug, Clone)]
pub struct SelectionRequest<'a> {
    /// League to pick from.
    pub league: League,
    /// Matches of this league currently in the active set.
    pub active_in_league: usize,
    /// Maximum simultaneous matches per league.
    pub capacity: usize,
    /// Teams currently on the pitch; never selected again.
    pub busy_teams: &'a BTreeSet<TeamId>,
    /// How far above the league minimum a team's played count may be.
    pub fairness_tolerance: u32,
}

/// Outcome of a selection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A fixture to claim.
    Candidate(FixtureId),
    /// The league already runs its maximum number of matches.
    AtCapacity,
    /// Every fixture of the league has been played.
    Exhausted,
    /// Unplayed fixtures remain but all involve teams already playing.
    Blocked,
}

impl Selection {
    /// The selected fixture, if any.
    pub const fn candidate(self) -> Option<FixtureId> {
        match self {
            Self::Candidate(id) => Some(id),
            Self::AtCapacity | Self::Exhausted | Self::Blocked => None,
        }
    }
}

/// Schedule progress across all leagues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleProgress {
    /// Fixtures in the book.
    pub total: usize,
    /// Fixtures already activated.
    pub played: usize,
    /// Lowest matchday with an unplayed fixture, or the last matchday.
    pub current_matchweek: u32,
}

impl ScheduleProgress {
    /// Activated share of the season in percent.
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.played as f64 / self.total as f64) * 100.0
    }
}

/// All fixtures of the current season, one schedule per league.
#[derive(Debug, Default)]
pub struct FixtureBook {
    leagues: Mutex<BTreeMap<League, Vec<Fixture>>>,
}

impl FixtureBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<League, Vec<Fixture>>> {
        self.leagues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace a league's schedule.
    pub fn install(&self, league: League, fixtures: Vec<Fixture>) {
        self.lock().insert(league, fixtures);
    }

    /// Replace every league's schedule in one step.
    pub fn replace_all(&self, schedule: BTreeMap<League, Vec<Fixture>>) {
        *self.lock() = schedule;
    }

    /// Identifier one past the highest fixture id in the book.
    pub fn next_fixture_id(&self) -> FixtureId {
        self.lock()
            .values()
            .flatten()
            .map(|f| f.id)
            .max()
            .map_or(FixtureId::new(1), FixtureId::next)
    }

    /// Pick the next fixture for a league without claiming it.
    ///
    /// Prefers the earliest fixture whose teams have both played at most
    /// `minimum + fairness_tolerance` fixtures, falling back to the earliest
    /// unplayed fixture. Busy teams are skipped in both passes.
    pub fn select_next(&self, request: &SelectionRequest<'_>) -> Selection {
        if request.active_in_league >= request.capacity {
            return Selection::AtCapacity;
        }

        let book = self.lock();
        let Some(fixtures) = book.get(&request.league) else {
            return Selection::Exhausted;
        };
        if fixtures.iter().all(|f| f.played) {
            return Selection::Exhausted;
        }

        let played = played_counts(fixtures);
        let minimum = played.values().copied().min().unwrap_or(0);
        let ceiling = minimum.saturating_add(request.fairness_tolerance);
        let count = |team: TeamId| played.get(&team).copied().unwrap_or(0);
        let free = |f: &&Fixture| {
            !f.played
                && !request.busy_teams.contains(&f.home_team)
                && !request.busy_teams.contains(&f.away_team)
        };

        let fair = fixtures
            .iter()
            .filter(free)
            .find(|f| count(f.home_team) <= ceiling && count(f.away_team) <= ceiling);
        if let Some(fixture) = fair {
            return Selection::Candidate(fixture.id);
        }

        fixtures
            .iter()
            .find(free)
            .map_or(Selection::Blocked, |f| Selection::Candidate(f.id))
    }

    /// Mark a fixture played and stamp the match created from it.
    pub fn claim(&self, fixture_id: FixtureId, match_id: MatchId) -> Result<Fixture, ScheduleError> {
        let mut book = self.lock();
        let fixture = book
            .values_mut()
            .flatten()
            .find(|f| f.id == fixture_id)
            .ok_or(ScheduleError::FixtureNotFound(fixture_id))?;
        if fixture.played {
            return Err(ScheduleError::AlreadyClaimed(fixture_id));
        }
        fixture.played = true;
        fixture.match_id = Some(match_id);
        Ok(fixture.clone())
    }

    /// Whether every fixture in every league has been played.
    pub fn all_played(&self) -> bool {
        let book = self.lock();
        !book.is_empty() && book.values().flatten().all(|f| f.played)
    }

    /// A league's full schedule.
    pub fn league_fixtures(&self, league: League) -> Vec<Fixture> {
        self.lock().get(&league).cloned().unwrap_or_default()
    }

    /// Fixtures of one matchday.
    pub fn matchday(&self, league: League, matchday: u32) -> Vec<Fixture> {
        self.lock()
            .get(&league)
            .map(|fixtures| {
                fixtures
                    .iter()
                    .filter(|f| f.matchday == matchday)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Counts and current matchweek across all leagues.
    pub fn progress(&self) -> ScheduleProgress {
        let book = self.lock();
        let all = || book.values().flatten();
        let current_matchweek = all()
            .filter(|f| !f.played)
            .map(|f| f.matchday)
            .min()
            .or_else(|| all().map(|f| f.matchday).max())
            .unwrap_or(1);
        ScheduleProgress {
            total: all().count(),
            played: all().filter(|f| f.played).count(),
            current_matchweek,
        }
    }
}

/// Played fixtures per team, including teams that have not played yet.
fn played_counts(fixtures: &[Fixture]) -> BTreeMap<TeamId, u32> {
    let mut counts = BTreeMap::new();
    for fixture in fixtures {
        for team in [fixture.home_team, fixture.away_team] {
            let entry = counts.entry(team).or_insert(0_u32);
            if fixture.played {
                *entry = entry.saturating_add(1);
            }
        }
    }
    counts
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::schedule::{ScheduleRequest, double_round_robin};

    fn make_book(teams: u32) -> FixtureBook {
        let ids: Vec<TeamId> = (1..=teams).map(TeamId::new).collect();
        let fixtures = double_round_robin(&ScheduleRequest {
            league: League::PremierLeague,
            teams: &ids,
            first_id: FixtureId::new(1),
            season_start: Utc::now(),
            matchday_spacing: Duration::days(1),
        })
        .unwrap();
        let book = FixtureBook::new();
        book.install(League::PremierLeague, fixtures);
        book
    }

    fn request(busy: &BTreeSet<TeamId>, active: usize) -> SelectionRequest<'_> {
        SelectionRequest {
            league: League::PremierLeague,
            active_in_league: active,
            capacity: 4,
            busy_teams: busy,
            fairness_tolerance: 1,
        }
    }

    fn claim_next(book: &FixtureBook, busy: &mut BTreeSet<TeamId>, match_no: u32) -> Option<Fixture> {
        let id = book.select_next(&request(busy, busy.len() / 2)).candidate()?;
        let fixture = book.claim(id, MatchId::new(match_no)).unwrap();
        busy.insert(fixture.home_team);
        busy.insert(fixture.away_team);
        Some(fixture)
    }

    #[test]
    fn selection_never_returns_played_fixture() {
        let book = make_book(6);
        let busy = BTreeSet::new();
        let mut n = 0;
        while let Selection::Candidate(id) = book.select_next(&request(&busy, 0)) {
            let fixture = book.claim(id, MatchId::new(n)).unwrap();
            assert!(fixture.played);
            n += 1;
        }
        assert_eq!(n, 30);
        assert_eq!(book.select_next(&request(&busy, 0)), Selection::Exhausted);
        assert!(book.all_played());
    }

    #[test]
    fn capacity_blocks_selection() {
        let book = make_book(10);
        let busy = BTreeSet::new();
        assert_eq!(book.select_next(&request(&busy, 4)), Selection::AtCapacity);
        assert_eq!(book.select_next(&request(&busy, 4)).candidate(), None);
        assert!(book.select_next(&request(&busy, 3)).candidate().is_some());
    }

    #[test]
    fn second_claim_of_same_fixture_backs_off() {
        let book = make_book(4);
        let busy = BTreeSet::new();
        let a = book.select_next(&request(&busy, 0)).candidate().unwrap();
        let b = book.select_next(&request(&busy, 0)).candidate().unwrap();
        assert_eq!(a, b);
        assert!(book.claim(a, MatchId::new(1)).is_ok());
        assert_eq!(book.claim(b, MatchId::new(2)), Err(ScheduleError::AlreadyClaimed(b)));
        let fixture = book
            .league_fixtures(League::PremierLeague)
            .into_iter()
            .find(|f| f.id == a)
            .unwrap();
        assert_eq!(fixture.match_id, Some(MatchId::new(1)));
    }

    #[test]
    fn busy_teams_are_never_double_booked() {
        let book = make_book(10);
        let mut busy = BTreeSet::new();
        for n in 0..4 {
            assert!(claim_next(&book, &mut busy, n).is_some());
        }
        assert_eq!(busy.len(), 8);
    }

    #[test]
    fn fairness_keeps_played_counts_close() {
        let book = make_book(10);
        let mut match_no = 0;
        loop {
            let mut busy = BTreeSet::new();
            let mut claimed = 0;
            while claimed < 4 && claim_next(&book, &mut busy, match_no).is_some() {
                claimed += 1;
                match_no += 1;
            }
            if claimed == 0 {
                break;
            }
            let counts = played_counts(&book.league_fixtures(League::PremierLeague));
            let min = counts.values().min().copied().unwrap();
            let max = counts.values().max().copied().unwrap();
            assert!(max - min <= 1, "spread {min}..{max} after {match_no} matches");
        }
        assert_eq!(match_no, 90);
        assert!(book.all_played());
    }

    #[test]
    fn unknown_fixture_cannot_be_claimed() {
        let book = make_book(4);
        let missing = FixtureId::new(999);
        assert_eq!(
            book.claim(missing, MatchId::new(1)),
            Err(ScheduleError::FixtureNotFound(missing))
        );
    }

    #[test]
    fn progress_tracks_matchweek() {
        let book = make_book(4);
        assert_eq!(book.progress().current_matchweek, 1);
        assert_eq!(book.next_fixture_id(), FixtureId::new(13));
        for fixture in book.matchday(League::PremierLeague, 1) {
            book.claim(fixture.id, MatchId::new(fixture.id.into_inner())).unwrap();
        }
        let progress = book.progress();
        assert_eq!(progress.current_matchweek, 2);
        assert_eq!(progress.played, 2);
        assert!((progress.percent() - 100.0 * 2.0 / 12.0).abs() < 1e-9);
    }
}
