//! The shared simulation state.
//!
//! [`SimulationState`] holds everything the periodic tasks mutate: clubs,
//! players, standings, the active matches, and season history. The fixture
//! schedule lives beside it in a [`FixtureBook`] so selection can be guarded
//! by its own narrower lock.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, Duration, Utc};
use matchday_league::{
    FixtureBook, LeagueTables, Roster, ScheduleRequest, double_round_robin,
};
use matchday_match::LiveMatch;
use matchday_match::lineup::pick_lineup;
use matchday_types::{
    CommentaryId, Fixture, FixtureId, Formation, GlobalStats, League, MatchId, Player, PlayerId,
    SeasonHistory, TeamId, TeamInfo,
};
use rand::rngs::StdRng;
use tracing::info;

use crate::error::SimulationError;
use crate::stats;

/// The mutable simulation state driven by the periodic tasks.
#[derive(Debug)]
pub struct SimulationState {
    /// Season in progress, starting at 1.
    pub season: u32,
    /// When the current season's schedule was generated.
    pub season_started_at: DateTime<Utc>,
    /// Every club, keyed by id.
    pub teams: BTreeMap<TeamId, TeamInfo>,
    /// Every player, keyed by id.
    pub players: BTreeMap<PlayerId, Player>,
    /// Standings of every league.
    pub tables: LeagueTables,
    /// Matches in the active set: live, at halftime, or cooling down.
    pub matches: BTreeMap<MatchId, LiveMatch>,
    /// Completed seasons, oldest first.
    pub history: VecDeque<SeasonHistory>,
    /// Latest global aggregates.
    pub global: GlobalStats,
    /// Random source shared by every unit of work.
    pub rng: StdRng,
    /// Last commentary id handed out.
    pub commentary_seq: CommentaryId,
    /// Identifier the next activated match receives.
    pub next_match_id: MatchId,
}

impl SimulationState {
    /// Build season 1 from a seeded roster.
    ///
    /// Every club must be able to field a side; a squad that cannot is a
    /// set-up error rather than a failure deep inside a later tick.
    pub fn new(roster: Roster, rng: StdRng, now: DateTime<Utc>) -> Result<Self, SimulationError> {
        for team in roster.teams.values() {
            let squad = roster.squad(team.id);
            pick_lineup(team.id, &squad, Formation::FourFourTwo)?;
        }

        let tables = LeagueTables::new(roster.teams.values(), now);
        Ok(Self {
            season: 1,
            season_started_at: now,
            teams: roster.teams,
            players: roster.players,
            tables,
            matches: BTreeMap::new(),
            history: VecDeque::new(),
            global: stats::empty_global_stats(1, now),
            rng,
            commentary_seq: CommentaryId::new(0),
            next_match_id: MatchId::new(1),
        })
    }

    /// Clubs of a league, in id order.
    pub fn league_teams(&self, league: League) -> Vec<TeamId> {
        self.teams
            .values()
            .filter(|team| team.league == league)
            .map(|team| team.id)
            .collect()
    }

    /// Matches of a league still in the active set, whatever their status.
    pub fn active_in_league(&self, league: League) -> usize {
        self.matches
            .values()
            .filter(|live| live.info.league == league)
            .count()
    }

    /// Teams taking part in a match that has not finished yet.
    pub fn busy_teams(&self) -> BTreeSet<TeamId> {
        self.matches
            .values()
            .filter(|live| live.info.status.is_in_play())
            .flat_map(|live| [live.info.home_team.id, live.info.away_team.id])
            .collect()
    }

    /// Build a double round-robin for every league without touching the
    /// book.
    ///
    /// Fixture ids start at `first_id` and keep counting across leagues.
    pub fn plan_season(
        &self,
        first_id: FixtureId,
        spacing: Duration,
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<League, Vec<Fixture>>, SimulationError> {
        let mut next_id = first_id;
        let mut plan = BTreeMap::new();
        for league in League::ALL {
            let teams = self.league_teams(league);
            let fixtures = double_round_robin(&ScheduleRequest {
                league,
                teams: &teams,
                first_id: next_id,
                season_start: now,
                matchday_spacing: spacing,
            })?;
            if let Some(last) = fixtures.iter().map(|f| f.id).max() {
                next_id = last.next();
            }
            plan.insert(league, fixtures);
        }
        Ok(plan)
    }

    /// Replace the whole book with a planned schedule.
    ///
    /// Returns the number of fixtures installed.
    pub fn install_season(
        &self,
        book: &FixtureBook,
        plan: BTreeMap<League, Vec<Fixture>>,
    ) -> usize {
        let mut scheduled = 0_usize;
        for (league, fixtures) in &plan {
            scheduled = scheduled.saturating_add(fixtures.len());
            info!(
                season = self.season,
                %league,
                fixtures = fixtures.len(),
                "Season schedule generated"
            );
        }
        book.replace_all(plan);
        scheduled
    }

    /// Generate a fresh double round-robin for every league into `book`.
    ///
    /// Fixture ids keep counting up from whatever the book held before, so
    /// ids are never reused across seasons. Returns the number of fixtures
    /// created.
    pub fn schedule_season(
        &self,
        book: &FixtureBook,
        spacing: Duration,
        now: DateTime<Utc>,
    ) -> Result<usize, SimulationError> {
        let plan = self.plan_season(book.next_fixture_id(), spacing, now)?;
        Ok(self.install_season(book, plan))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use matchday_league::seed_roster;
    use rand::SeedableRng;

    use super::*;

    fn make_state(squad_size: u32) -> Result<SimulationState, SimulationError> {
        let mut rng = StdRng::seed_from_u64(5);
        let roster = seed_roster(&mut rng, squad_size);
        SimulationState::new(roster, rng, Utc::now())
    }

    #[test]
    fn new_state_starts_season_one_with_empty_tables() {
        let state = make_state(25).unwrap();
        assert_eq!(state.season, 1);
        assert!(state.matches.is_empty());
        assert_eq!(state.league_teams(League::PremierLeague).len(), 20);
        assert_eq!(state.tables.table(League::LaLiga).len(), 20);
        assert!(state.tables.table(League::LaLiga).iter().all(|r| r.points == 0));
    }

    #[test]
    fn short_squads_are_rejected_at_set_up() {
        let err = make_state(8).unwrap_err();
        assert!(matches!(err, SimulationError::Match { .. }));
    }

    #[test]
    fn scheduling_fills_every_league() {
        let state = make_state(25).unwrap();
        let book = FixtureBook::new();
        let total = state
            .schedule_season(&book, Duration::hours(24), Utc::now())
            .unwrap();
        assert_eq!(total, 2 * 20 * 19);
        assert_eq!(book.league_fixtures(League::LaLiga).len(), 380);

        let premier_max = book
            .league_fixtures(League::PremierLeague)
            .iter()
            .map(|f| f.id)
            .max()
            .unwrap();
        let liga_min = book
            .league_fixtures(League::LaLiga)
            .iter()
            .map(|f| f.id)
            .min()
            .unwrap();
        assert!(liga_min > premier_max);
    }
}
