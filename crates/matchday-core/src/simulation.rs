//! The shared simulation handle.
//!
//! [`Simulation`] is a cheap-to-clone handle over the shared state. Two
//! locks guard it:
//!
//! - a readers-writer lock over [`SimulationState`]; every unit of work
//!   takes the write side for its whole duration, every accessor the read
//!   side;
//! - a narrower selection lock, taken before the state lock by every unit
//!   of work that may activate fixtures, so two activation attempts never
//!   interleave their select and claim steps.
//!
//! Accessors return owned snapshots; nothing outside this crate can mutate
//! the state. Post-match cooldowns are tracked as [`JoinHandle`]s keyed by
//! match, so they can be listed, awaited, or aborted on teardown.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use matchday_league::{FixtureBook, seed_roster};
use matchday_match::LiveMatch;
use matchday_types::{
    BallPosition, CommentaryEntry, DynamicMatchProbabilities, Fixture, FormResult, GlobalStats,
    League, LeagueTableRow, Match, MatchId, MatchMomentum, MatchStats, Player, PlayerAvailability,
    PlayerId, PlayerLocation, SeasonHistory, SeasonInfo, TeamId, TeamInfo,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clock::{SystemClock, TimeSource};
use crate::config::SimulationConfig;
use crate::engine::{self, Activation, SweepReport};
use crate::error::SimulationError;
use crate::season;
use crate::state::SimulationState;
use crate::stats;

/// Which players to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerFilter {
    /// Every player.
    All,
    /// Players of clubs in one league.
    League(League),
    /// One club's squad.
    Team(TeamId),
}

/// Handle to a running simulation.
#[derive(Clone)]
pub struct Simulation {
    state: Arc<RwLock<SimulationState>>,
    fixtures: Arc<FixtureBook>,
    selection: Arc<tokio::sync::Mutex<()>>,
    config: Arc<SimulationConfig>,
    clock: Arc<dyn TimeSource>,
    cooldowns: Arc<Mutex<BTreeMap<MatchId, JoinHandle<()>>>>,
}

impl core::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("pending_cooldowns", &self.pending_cooldowns())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Seed the roster, generate season 1, and wrap it in a handle.
    pub fn new(
        config: SimulationConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, SimulationError> {
        let now = clock.now();
        let mut rng = StdRng::seed_from_u64(config.simulation.seed);
        let roster = seed_roster(&mut rng, config.league.squad_size);
        let state = SimulationState::new(roster, rng, now)?;

        let fixtures = FixtureBook::new();
        let scheduled = state.schedule_season(&fixtures, config.timing.fixture_spacing(), now)?;
        info!(
            name = %config.simulation.name,
            seed = config.simulation.seed,
            teams = state.teams.len(),
            players = state.players.len(),
            fixtures = scheduled,
            "Simulation initialized"
        );

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            fixtures: Arc::new(fixtures),
            selection: Arc::new(tokio::sync::Mutex::new(())),
            config: Arc::new(config),
            clock,
            cooldowns: Arc::new(Mutex::new(BTreeMap::new())),
        })
    }

    /// Same as [`Simulation::new`] on the system clock.
    pub fn with_system_clock(config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::new(config, Arc::new(SystemClock))
    }

    /// The configuration the simulation runs with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Units of work
    // -----------------------------------------------------------------------

    /// One match-engine sweep: tick every active match, settle finished
    /// ones, fill idle leagues, and start a cooldown for each full time.
    pub async fn tick_matches(&self) -> SweepReport {
        let report = {
            let _selection = self.selection.lock().await;
            let mut state = self.state.write().await;
            let now = self.clock.now();
            engine::sweep(&mut state, &self.fixtures, &self.config, now)
        };
        for &match_id in &report.finished {
            self.schedule_cooldown(match_id);
        }
        report
    }

    /// Try to start the next fixture of a league.
    pub async fn activate_next(&self, league: League) -> Activation {
        let _selection = self.selection.lock().await;
        let mut state = self.state.write().await;
        let now = self.clock.now();
        engine::activate_next(&mut state, &self.fixtures, &self.config, league, now)
    }

    /// Archive a cooled-down match and request its replacement.
    pub async fn archive(&self, match_id: MatchId) -> Option<Activation> {
        let _selection = self.selection.lock().await;
        let mut state = self.state.write().await;
        let now = self.clock.now();
        engine::archive(&mut state, &self.fixtures, &self.config, match_id, now)
    }

    /// Close the season if it is complete and kick off the next one.
    pub async fn check_season(&self) -> Option<SeasonHistory> {
        let _selection = self.selection.lock().await;
        let mut state = self.state.write().await;
        let now = self.clock.now();
        if !season::is_complete(&state, &self.fixtures) {
            debug!(season = state.season, "Season still in progress");
            return None;
        }
        match season::end_season(&mut state, &self.fixtures, &self.config, now) {
            Ok(record) => {
                engine::fill_idle_leagues(&mut state, &self.fixtures, &self.config, now);
                Some(record)
            }
            Err(err) => {
                error!(season = state.season, error = %err, "Season rollover failed");
                None
            }
        }
    }

    /// Batched player statistics pass, followed by a global refresh.
    ///
    /// Returns how many players have appeared this season.
    pub async fn process_statistics(&self) -> usize {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let updated = stats::refresh_player_averages(&mut state.players);
        stats::refresh_global_stats(&mut state, &self.fixtures, now);
        debug!(players = updated, "Player statistics processed");
        updated
    }

    /// Recompute the global aggregates.
    pub async fn refresh_global_stats(&self) -> GlobalStats {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        stats::refresh_global_stats(&mut state, &self.fixtures, now);
        let global = state.global.clone();
        debug!(
            active_matches = global.active_matches,
            total_goals = global.total_goals,
            viewers = global.active_viewers,
            "Global stats refreshed"
        );
        global
    }

    // -----------------------------------------------------------------------
    // Cooldown jobs
    // -----------------------------------------------------------------------

    fn lock_cooldowns(&self) -> MutexGuard<'_, BTreeMap<MatchId, JoinHandle<()>>> {
        self.cooldowns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the post-match pause for a finished match.
    ///
    /// When the pause ends the job archives the match and requests a
    /// replacement; both re-check the state they find on waking.
    fn schedule_cooldown(&self, match_id: MatchId) {
        let delay = self.config.timing.cooldown();
        let sim = self.clone();
        let mut jobs = self.lock_cooldowns();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sim.archive(match_id).await;
            sim.lock_cooldowns().remove(&match_id);
        });
        if let Some(previous) = jobs.insert(match_id, handle) {
            previous.abort();
        }
        debug!(match_id = %match_id, delay_secs = delay.as_secs(), "Cooldown scheduled");
    }

    /// Matches whose cooldown has not completed yet.
    pub fn pending_cooldowns(&self) -> Vec<MatchId> {
        self.lock_cooldowns().keys().copied().collect()
    }

    /// Abort every pending cooldown. Returns how many were aborted.
    pub fn cancel_cooldowns(&self) -> usize {
        let jobs = std::mem::take(&mut *self.lock_cooldowns());
        for job in jobs.values() {
            job.abort();
        }
        if !jobs.is_empty() {
            info!(cancelled = jobs.len(), "Pending cooldowns cancelled");
        }
        jobs.len()
    }

    /// Wait for every pending cooldown to finish. Returns how many ran.
    pub async fn drain_cooldowns(&self) -> usize {
        let jobs = std::mem::take(&mut *self.lock_cooldowns());
        let count = jobs.len();
        for (match_id, job) in jobs {
            if let Err(err) = job.await {
                warn!(match_id = %match_id, error = %err, "Cooldown job did not complete");
            }
        }
        count
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    async fn with_match<T>(&self, id: MatchId, read: impl FnOnce(&LiveMatch) -> T) -> Option<T> {
        self.state.read().await.matches.get(&id).map(read)
    }

    /// Every match in the active set, in id order.
    pub async fn matches(&self) -> Vec<Match> {
        let state = self.state.read().await;
        state.matches.values().map(|live| live.info.clone()).collect()
    }

    /// One active match.
    pub async fn match_info(&self, id: MatchId) -> Option<Match> {
        self.with_match(id, |live| live.info.clone()).await
    }

    /// Running statistics of a match.
    pub async fn match_stats(&self, id: MatchId) -> Option<MatchStats> {
        self.with_match(id, |live| live.stats.clone()).await
    }

    /// Recent commentary of a match, newest first.
    pub async fn commentary(&self, id: MatchId) -> Option<Vec<CommentaryEntry>> {
        self.with_match(id, |live| live.commentary.iter().cloned().collect())
            .await
    }

    /// Locations of the players on the pitch.
    pub async fn player_locations(&self, id: MatchId) -> Option<Vec<PlayerLocation>> {
        self.with_match(id, |live| live.locations.values().cloned().collect())
            .await
    }

    /// Ball state of a match.
    pub async fn ball(&self, id: MatchId) -> Option<BallPosition> {
        self.with_match(id, |live| live.ball.clone()).await
    }

    /// Momentum of both sides.
    pub async fn momentum(&self, id: MatchId) -> Option<MatchMomentum> {
        self.with_match(id, |live| live.momentum.clone()).await
    }

    /// Live outcome probabilities.
    pub async fn probabilities(&self, id: MatchId) -> Option<DynamicMatchProbabilities> {
        self.with_match(id, |live| live.probabilities.clone()).await
    }

    /// Players sent off, injured, or substituted in a match.
    pub async fn unavailable_players(&self, id: MatchId) -> Option<Vec<PlayerAvailability>> {
        self.with_match(id, |live| live.availability.values().cloned().collect())
            .await
    }

    /// Players matching a filter, in id order.
    pub async fn players(&self, filter: PlayerFilter) -> Vec<Player> {
        let state = self.state.read().await;
        let league_of = |team: TeamId| state.teams.get(&team).map(|t| t.league);
        state
            .players
            .values()
            .filter(|p| match filter {
                PlayerFilter::All => true,
                PlayerFilter::League(league) => league_of(p.team_id) == Some(league),
                PlayerFilter::Team(team) => p.team_id == team,
            })
            .cloned()
            .collect()
    }

    /// One player.
    pub async fn player(&self, id: PlayerId) -> Option<Player> {
        self.state.read().await.players.get(&id).cloned()
    }

    /// Clubs, optionally of one league, in id order.
    pub async fn teams(&self, league: Option<League>) -> Vec<TeamInfo> {
        let state = self.state.read().await;
        state
            .teams
            .values()
            .filter(|t| league.is_none_or(|l| t.league == l))
            .cloned()
            .collect()
    }

    /// One club.
    pub async fn team(&self, id: TeamId) -> Option<TeamInfo> {
        self.state.read().await.teams.get(&id).cloned()
    }

    /// A club's last five results, newest first.
    pub async fn team_form(&self, id: TeamId) -> Option<Vec<FormResult>> {
        self.state.read().await.teams.get(&id).map(|t| t.form.clone())
    }

    /// Standings of a league, top first.
    pub async fn league_table(&self, league: League) -> Vec<LeagueTableRow> {
        self.state.read().await.tables.table(league).to_vec()
    }

    /// A league's full schedule for the current season.
    pub fn fixtures(&self, league: League) -> Vec<Fixture> {
        self.fixtures.league_fixtures(league)
    }

    /// Fixtures of one matchday.
    pub fn matchday_fixtures(&self, league: League, matchday: u32) -> Vec<Fixture> {
        self.fixtures.matchday(league, matchday)
    }

    /// Completed seasons, oldest first.
    pub async fn season_history(&self) -> Vec<SeasonHistory> {
        self.state.read().await.history.iter().cloned().collect()
    }

    /// Where the current season stands.
    pub async fn season_info(&self) -> SeasonInfo {
        let state = self.state.read().await;
        stats::season_info(&state, &self.fixtures)
    }

    /// Latest global aggregates.
    pub async fn global_stats(&self) -> GlobalStats {
        self.state.read().await.global.clone()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::clock::ManualClock;

    fn make_simulation(cooldown_secs: u64) -> (Simulation, Arc<ManualClock>) {
        let mut config = SimulationConfig::default();
        config.timing.cooldown_secs = cooldown_secs;
        let start = Utc.with_ymd_and_hms(2026, 8, 15, 15, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let sim = Simulation::new(config, Arc::clone(&clock) as Arc<dyn TimeSource>).unwrap();
        (sim, clock)
    }

    #[tokio::test]
    async fn first_tick_starts_matches_in_both_leagues() {
        let (sim, _) = make_simulation(60);
        let report = sim.tick_matches().await;
        assert_eq!(report.activated.len(), 8);

        let matches = sim.matches().await;
        assert_eq!(matches.len(), 8);
        for league in League::ALL {
            assert_eq!(matches.iter().filter(|m| m.league == league).count(), 4);
        }
        let first = matches[0].id;
        assert!(!sim.commentary(first).await.unwrap().is_empty());
        assert_eq!(sim.player_locations(first).await.unwrap().len(), 22);
        assert!(sim.unavailable_players(first).await.unwrap().is_empty());
        assert!(sim.match_info(MatchId::new(999)).await.is_none());
    }

    #[tokio::test]
    async fn filters_narrow_players_and_teams() {
        let (sim, _) = make_simulation(60);
        assert_eq!(sim.players(PlayerFilter::All).await.len(), 40 * 25);
        assert_eq!(
            sim.players(PlayerFilter::League(League::LaLiga)).await.len(),
            20 * 25
        );
        let team = sim.teams(Some(League::PremierLeague)).await[0].id;
        let squad = sim.players(PlayerFilter::Team(team)).await;
        assert_eq!(squad.len(), 25);
        assert!(squad.iter().all(|p| p.team_id == team));
        assert_eq!(sim.teams(None).await.len(), 40);
        assert_eq!(sim.team_form(team).await, Some(Vec::new()));
        assert_eq!(sim.matchday_fixtures(League::LaLiga, 1).len(), 10);
    }

    #[tokio::test]
    async fn full_time_schedules_a_cooldown_that_archives() {
        let (sim, clock) = make_simulation(0);
        sim.tick_matches().await;

        let mut finished = Vec::new();
        for _ in 0..200 {
            clock.advance(Duration::seconds(1));
            finished.extend(sim.tick_matches().await.finished);
            if !finished.is_empty() {
                break;
            }
        }
        assert!(!finished.is_empty());
        assert!(!sim.pending_cooldowns().is_empty());

        assert!(sim.drain_cooldowns().await >= 1);
        for id in &finished {
            assert!(sim.match_info(*id).await.is_none());
        }
        assert!(sim.pending_cooldowns().is_empty());
    }

    #[tokio::test]
    async fn cancelled_cooldowns_leave_the_match_in_place() {
        let (sim, clock) = make_simulation(3600);
        sim.tick_matches().await;
        // Halftime, then the second half, then full time.
        for _ in 0..2 {
            clock.advance(Duration::seconds(200));
            sim.tick_matches().await;
        }
        clock.advance(Duration::seconds(200));
        let report = sim.tick_matches().await;
        assert_eq!(report.finished.len(), 8);

        assert_eq!(sim.cancel_cooldowns(), 8);
        assert!(sim.pending_cooldowns().is_empty());
        assert_eq!(sim.matches().await.len(), 8);
    }
}
