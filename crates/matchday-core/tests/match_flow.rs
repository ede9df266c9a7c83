//! Match clock and availability as seen through the [`Simulation`] handle.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use matchday_core::{ManualClock, Simulation, SimulationConfig, TimeSource};
use matchday_types::{AvailabilityStatus, CommentaryId, MatchPeriod, MatchStatus, PlayerId};

fn make_simulation(config: SimulationConfig) -> (Simulation, Arc<ManualClock>) {
    let start = Utc.with_ymd_and_hms(2026, 9, 1, 19, 45, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let sim = Simulation::new(config, Arc::clone(&clock) as Arc<dyn TimeSource>).unwrap();
    (sim, clock)
}

async fn tick_after(sim: &Simulation, clock: &ManualClock, secs: i64) {
    clock.advance(Duration::seconds(secs));
    sim.tick_matches().await;
}

#[tokio::test]
async fn halftime_pauses_at_45_and_resumes_at_46() {
    let mut config = SimulationConfig::default();
    config.match_rules.halftime_break_secs = 15;
    let (sim, clock) = make_simulation(config);

    let kickoff = sim.tick_matches().await;
    assert_eq!(kickoff.activated.len(), 8);
    let id = kickoff.activated[0];

    tick_after(&sim, &clock, 44).await;
    let m = sim.match_info(id).await.unwrap();
    assert_eq!(m.status, MatchStatus::Live);
    assert_eq!(m.minute, 44);

    clock.advance(Duration::seconds(1));
    let report = sim.tick_matches().await;
    assert_eq!(report.halftimes.len(), 8);
    let m = sim.match_info(id).await.unwrap();
    assert_eq!(m.status, MatchStatus::Halftime);
    assert_eq!(m.minute, 45);
    assert!(m.is_in_break);

    tick_after(&sim, &clock, 14).await;
    let m = sim.match_info(id).await.unwrap();
    assert_eq!(m.status, MatchStatus::Halftime);
    assert_eq!(m.minute, 45);

    tick_after(&sim, &clock, 1).await;
    let m = sim.match_info(id).await.unwrap();
    assert_eq!(m.status, MatchStatus::Live);
    assert_eq!(m.period, MatchPeriod::SecondHalf);
    assert_eq!(m.minute, 45);

    tick_after(&sim, &clock, 1).await;
    assert_eq!(sim.match_info(id).await.unwrap().minute, 46);
    tick_after(&sim, &clock, 1).await;
    assert_eq!(sim.match_info(id).await.unwrap().minute, 47);
}

#[tokio::test]
async fn sent_off_players_take_no_further_part() {
    let mut config = SimulationConfig::default();
    config.match_rules.event_chance = 1.0;
    config.match_rules.red_card_share = 1.0;
    config.match_rules.set_piece_pause_ms = 0;
    let (sim, clock) = make_simulation(config);
    let ids = sim.tick_matches().await.activated;

    // Player -> newest commentary id when the dismissal was first seen.
    let mut dismissed: BTreeMap<PlayerId, CommentaryId> = BTreeMap::new();

    for _ in 0..40 {
        tick_after(&sim, &clock, 1).await;
        for &id in &ids {
            let commentary = sim.commentary(id).await.unwrap();
            let newest = commentary.iter().map(|c| c.id).max().unwrap();

            for entry in sim.unavailable_players(id).await.unwrap() {
                if entry.status != AvailabilityStatus::RedCard {
                    continue;
                }
                assert!(!entry.reason.is_empty());
                dismissed.entry(entry.player_id).or_insert(newest);
            }

            let locations = sim.player_locations(id).await.unwrap();
            for (player, &seen_at) in &dismissed {
                assert!(locations.iter().all(|l| l.player_id != *player));
                assert!(
                    commentary
                        .iter()
                        .filter(|c| c.id > seen_at)
                        .all(|c| c.player_id != Some(*player))
                );
            }
        }
    }

    assert!(!dismissed.is_empty());
    let stats = sim.match_stats(ids[0]).await.unwrap();
    let unavailable = sim.unavailable_players(ids[0]).await.unwrap();
    let reds = unavailable
        .iter()
        .filter(|a| a.status == AvailabilityStatus::RedCard)
        .count();
    assert_eq!(
        usize::try_from(stats.home.red_cards + stats.away.red_cards).unwrap(),
        reds
    );
}
