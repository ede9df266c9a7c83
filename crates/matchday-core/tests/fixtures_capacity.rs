//! Schedule shape and the per-league concurrency limit.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use matchday_core::{Activation, ManualClock, Simulation, SimulationConfig, TimeSource};
use matchday_league::{FixtureBook, ScheduleRequest, double_round_robin};
use matchday_types::{FixtureId, League, MatchId, MatchStatus, TeamId};
use tokio::task::JoinSet;

#[test]
fn ten_team_league_has_ninety_fixtures_over_eighteen_matchdays() {
    let teams: Vec<TeamId> = (1..=10).map(TeamId::new).collect();
    let start = Utc.with_ymd_and_hms(2026, 8, 1, 15, 0, 0).unwrap();
    let fixtures = double_round_robin(&ScheduleRequest {
        league: League::PremierLeague,
        teams: &teams,
        first_id: FixtureId::new(1),
        season_start: start,
        matchday_spacing: Duration::days(7),
    })
    .unwrap();

    assert_eq!(fixtures.len(), 90);
    let last_matchday = fixtures.iter().map(|f| f.matchday).max().unwrap();
    assert_eq!(last_matchday, 18);

    let mut pairs: BTreeMap<(TeamId, TeamId), u32> = BTreeMap::new();
    let mut appearances: BTreeMap<TeamId, u32> = BTreeMap::new();
    for f in &fixtures {
        *pairs.entry((f.home_team, f.away_team)).or_default() += 1;
        *appearances.entry(f.home_team).or_default() += 1;
        *appearances.entry(f.away_team).or_default() += 1;
    }
    // Every ordered pair once, so every unordered pair twice.
    assert_eq!(pairs.len(), 90);
    assert!(pairs.values().all(|&n| n == 1));
    assert!(pairs.keys().all(|(home, away)| pairs.contains_key(&(*away, *home))));
    assert!(appearances.values().all(|&n| n == 18));

    let book = FixtureBook::new();
    book.install(League::PremierLeague, fixtures);
    let first = book.matchday(League::PremierLeague, 1);
    assert_eq!(first.len(), 5);
    assert!(first.iter().all(|f| !f.played));
}

fn make_simulation() -> (Simulation, Arc<ManualClock>) {
    let mut config = SimulationConfig::default();
    config.timing.cooldown_secs = 3600;
    let start = Utc.with_ymd_and_hms(2026, 8, 15, 15, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let sim = Simulation::new(config, Arc::clone(&clock) as Arc<dyn TimeSource>).unwrap();
    (sim, clock)
}

#[tokio::test]
async fn fifth_match_waits_for_an_archived_slot() {
    let (sim, clock) = make_simulation();
    let league = League::PremierLeague;
    sim.tick_matches().await;

    let in_league = |matches: &[matchday_types::Match]| {
        matches.iter().filter(|m| m.league == league).count()
    };
    assert_eq!(in_league(&sim.matches().await), 4);
    assert_eq!(sim.activate_next(league).await, Activation::AtCapacity);
    assert_eq!(sim.matches().await.len(), 8);

    // Play every match to full time; cooling down still holds the slot.
    for _ in 0..3 {
        clock.advance(Duration::seconds(200));
        sim.tick_matches().await;
    }
    let matches = sim.matches().await;
    assert!(matches.iter().all(|m| m.status == MatchStatus::Cooldown));
    assert_eq!(sim.activate_next(league).await, Activation::AtCapacity);
    assert_eq!(sim.matches().await.len(), 8);

    let done = matches.iter().find(|m| m.league == league).unwrap().id;
    let replacement = sim.archive(done).await.unwrap().started().unwrap();
    assert!(sim.match_info(done).await.is_none());

    let new_match = sim.match_info(replacement).await.unwrap();
    assert_eq!(new_match.league, league);
    assert_eq!(new_match.status, MatchStatus::Live);
    assert_eq!(in_league(&sim.matches().await), 4);

    // A live match is not archived and frees nothing.
    assert_eq!(sim.archive(replacement).await, None);
    assert_eq!(sim.activate_next(league).await, Activation::AtCapacity);
    assert_eq!(sim.cancel_cooldowns(), 8);
}

#[tokio::test]
async fn activated_fixtures_are_marked_and_never_reselected() {
    let (sim, _) = make_simulation();
    sim.tick_matches().await;

    for m in sim.matches().await {
        let fixture = sim
            .fixtures(m.league)
            .into_iter()
            .find(|f| f.id == m.fixture_id)
            .unwrap();
        assert!(fixture.played);
        assert_eq!(fixture.match_id, Some(m.id));
    }
    let played = League::ALL
        .iter()
        .flat_map(|&league| sim.fixtures(league))
        .filter(|f| f.played)
        .count();
    assert_eq!(played, 8);
}

async fn league_fixtures_in_play(sim: &Simulation, league: League) -> Vec<FixtureId> {
    sim.matches()
        .await
        .iter()
        .filter(|m| m.league == league)
        .map(|m| m.fixture_id)
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_activations_never_share_a_fixture() {
    let (sim, clock) = make_simulation();
    let league = League::LaLiga;

    let mut tasks = JoinSet::new();
    for _ in 0..12 {
        let sim = sim.clone();
        tasks.spawn(async move { sim.activate_next(league).await });
    }
    let mut started = BTreeSet::new();
    while let Some(outcome) = tasks.join_next().await {
        match outcome.unwrap() {
            Activation::Started(id) => assert!(started.insert(id)),
            other => assert_eq!(other, Activation::AtCapacity),
        }
    }
    assert_eq!(started.len(), 4);
    let first_round: BTreeSet<FixtureId> = league_fixtures_in_play(&sim, league)
        .await
        .into_iter()
        .collect();
    assert_eq!(first_round.len(), 4);
    let claimed: BTreeSet<MatchId> = sim
        .fixtures(league)
        .iter()
        .filter(|f| f.played)
        .filter_map(|f| f.match_id)
        .collect();
    assert_eq!(claimed, started);

    // Every match cools down, then archives race each other and fresh
    // activations for the freed slots.
    for _ in 0..3 {
        clock.advance(Duration::seconds(200));
        sim.tick_matches().await;
    }
    let cooling: Vec<MatchId> = started.iter().copied().collect();

    let watcher = {
        let sim = sim.clone();
        tokio::spawn(async move {
            let mut most = 0;
            for _ in 0..200 {
                most = most.max(league_fixtures_in_play(&sim, league).await.len());
                tokio::task::yield_now().await;
            }
            most
        })
    };

    let mut archives = JoinSet::new();
    for &id in cooling.iter().chain(cooling.iter()) {
        let sim = sim.clone();
        archives.spawn(async move { sim.archive(id).await });
    }
    let mut activations = JoinSet::new();
    for _ in 0..4 {
        let sim = sim.clone();
        activations.spawn(async move { sim.activate_next(league).await });
    }

    let mut replacements = BTreeSet::new();
    let mut archived = 0;
    while let Some(outcome) = archives.join_next().await {
        if let Some(activation) = outcome.unwrap() {
            archived += 1;
            if let Some(id) = activation.started() {
                assert!(replacements.insert(id));
            }
        }
    }
    while let Some(outcome) = activations.join_next().await {
        if let Some(id) = outcome.unwrap().started() {
            assert!(replacements.insert(id));
        }
    }

    assert_eq!(archived, 4);
    assert_eq!(replacements.len(), 4);
    assert!(watcher.await.unwrap() <= 4);

    let second_round = league_fixtures_in_play(&sim, league).await;
    assert_eq!(second_round.len(), 4);
    let second_round: BTreeSet<FixtureId> = second_round.into_iter().collect();
    assert_eq!(second_round.len(), 4);
    assert!(second_round.is_disjoint(&first_round));
    let played = sim.fixtures(league).iter().filter(|f| f.played).count();
    assert_eq!(played, 8);
    sim.cancel_cooldowns();
}
