//! Plays a whole season through the public [`Simulation`] handle on a
//! manual clock and checks the invariants that must hold on every tick.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use matchday_core::{ManualClock, Simulation, SimulationConfig, TimeSource};
use matchday_types::{FixtureId, League, MatchId, MatchStatus};

const EPSILON: f64 = 1e-6;

fn make_simulation() -> (Simulation, Arc<ManualClock>) {
    let mut config = SimulationConfig::default();
    config.simulation.seed = 2026;
    config.timing.cooldown_secs = 0;
    let start = Utc.with_ymd_and_hms(2026, 8, 15, 12, 30, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let sim = Simulation::new(config, Arc::clone(&clock) as Arc<dyn TimeSource>).unwrap();
    (sim, clock)
}

fn every_fixture_played(sim: &Simulation) -> bool {
    League::ALL
        .iter()
        .all(|&league| sim.fixtures(league).iter().all(|f| f.played))
}

#[tokio::test]
async fn a_full_season_keeps_every_invariant() {
    let (sim, clock) = make_simulation();
    let capacity = sim.config().league.max_simultaneous_matches;

    let mut last_seen: BTreeMap<MatchId, (MatchStatus, u32)> = BTreeMap::new();
    let mut fixture_matches: BTreeMap<FixtureId, MatchId> = BTreeMap::new();
    let mut record = None;

    for _ in 0..10_000 {
        sim.tick_matches().await;
        sim.drain_cooldowns().await;

        let matches = sim.matches().await;
        for league in League::ALL {
            let active = matches.iter().filter(|m| m.league == league).count();
            assert!(active <= capacity, "{league} has {active} active matches");
        }

        for m in &matches {
            // One fixture, one match.
            let owner = *fixture_matches.entry(m.fixture_id).or_insert(m.id);
            assert_eq!(owner, m.id);

            if let Some(&(status, minute)) = last_seen.get(&m.id) {
                assert!(m.minute >= minute, "match {} went back in time", m.id);
                if matches!(status, MatchStatus::Halftime | MatchStatus::Cooldown)
                    && status == m.status
                {
                    assert_eq!(m.minute, minute);
                }
            }
            last_seen.insert(m.id, (m.status, m.minute));

            let p = sim.probabilities(m.id).await.unwrap();
            for value in [p.home_win, p.draw, p.away_win] {
                assert!((0.0..=1.0).contains(&value));
            }
            assert!((p.home_win + p.draw + p.away_win - 1.0).abs() < EPSILON);

            let momentum = sim.momentum(m.id).await.unwrap();
            assert!((-1.0..=1.0).contains(&momentum.home));
            assert!((-1.0..=1.0).contains(&momentum.away));

            let stats = sim.match_stats(m.id).await.unwrap();
            assert_eq!(stats.home.possession + stats.away.possession, 100);
        }

        let ready = every_fixture_played(&sim) && matches.is_empty();
        if ready {
            for league in League::ALL {
                let table = sim.league_table(league).await;
                assert!(table.iter().all(|row| row.played == 38));
                let won: u32 = table.iter().map(|r| r.won).sum();
                let lost: u32 = table.iter().map(|r| r.lost).sum();
                let scored: u32 = table.iter().map(|r| r.goals_for).sum();
                let conceded: u32 = table.iter().map(|r| r.goals_against).sum();
                assert_eq!(won, lost);
                assert_eq!(scored, conceded);
            }
        }

        let closed = sim.check_season().await;
        assert_eq!(closed.is_some(), ready);
        if closed.is_some() {
            record = closed;
            break;
        }
        clock.advance(Duration::seconds(5));
    }

    let record = record.unwrap();
    assert_eq!(record.season, 1);
    assert_eq!(record.total_matches, 760);
    assert_eq!(record.champions.len(), 2);
    assert_eq!(fixture_matches.len(), 760);

    let seasons: Vec<u32> = sim.season_history().await.iter().map(|h| h.season).collect();
    assert_eq!(seasons, vec![1]);

    // The next season starts straight away.
    let info = sim.season_info().await;
    assert_eq!(info.season, 2);
    assert_eq!(info.total_fixtures, 760);
    let matches = sim.matches().await;
    assert_eq!(matches.len(), 8);
    assert!(matches.iter().all(|m| m.season == 2));
    let fresh: BTreeSet<FixtureId> = matches.iter().map(|m| m.fixture_id).collect();
    assert!(fresh.is_disjoint(&fixture_matches.keys().copied().collect()));
}

#[tokio::test]
async fn statistics_pass_reports_everyone_who_played() {
    let (sim, clock) = make_simulation();
    sim.tick_matches().await;
    for _ in 0..30 {
        clock.advance(Duration::seconds(5));
        sim.tick_matches().await;
    }
    sim.drain_cooldowns().await;

    // Eight finished matches, eleven starters a side plus any substitutes.
    let updated = sim.process_statistics().await;
    assert!(updated >= 8 * 22);

    let global = sim.global_stats().await;
    assert!(global.season_progress > 0.0);
    assert_eq!(global.current_season, 1);
}
