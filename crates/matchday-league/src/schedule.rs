//! Double round-robin schedule generation.
//!
//! Uses the circle method: the first slot stays fixed while the others
//! rotate one place per round, so every team meets every other team once
//! per leg. The second leg replays the first with home and away swapped.
//! An odd team count gets a bye slot; pairings against the bye are dropped.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use matchday_types::{Fixture, FixtureId, League, TeamId};

use crate::error::LeagueError;

/// Inputs for one league's schedule.
#[derive(Debug, Clone)]
pub struct ScheduleRequest<'a> {
    /// League being scheduled.
    pub league: League,
    /// Participating teams. Order decides the pairing pattern.
    pub teams: &'a [TeamId],
    /// Identifier given to the first fixture; later ones count up.
    pub first_id: FixtureId,
    /// Nominal date of matchday 1.
    pub season_start: DateTime<Utc>,
    /// Gap between consecutive matchdays.
    pub matchday_spacing: Duration,
}

/// Generate every fixture of a double round-robin, ordered by matchday.
///
/// For `n` teams (even) this yields `2 * (n - 1)` matchdays of `n / 2`
/// fixtures, `n * (n - 1)` in total.
pub fn double_round_robin(request: &ScheduleRequest<'_>) -> Result<Vec<Fixture>, LeagueError> {
    let teams = request.teams;
    if teams.len() < 2 {
        return Err(LeagueError::TooFewTeams {
            league: request.league,
            count: teams.len(),
        });
    }
    let mut seen = BTreeSet::new();
    for team in teams {
        if !seen.insert(*team) {
            return Err(LeagueError::DuplicateTeam(*team));
        }
    }

    let mut slots: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let slot_count = slots.len();
    let rounds = slot_count.saturating_sub(1);
    let half = slot_count / 2;

    let mut first_leg: Vec<Vec<(TeamId, TeamId)>> = Vec::with_capacity(rounds);
    for round in 0..rounds {
        let mut pairings = Vec::with_capacity(half);
        for i in 0..half {
            let a = slots.get(i).copied().flatten();
            let b = slots
                .get(slot_count.saturating_sub(1).saturating_sub(i))
                .copied()
                .flatten();
            if let (Some(a), Some(b)) = (a, b) {
                if (round.saturating_add(i)) % 2 == 0 {
                    pairings.push((a, b));
                } else {
                    pairings.push((b, a));
                }
            }
        }
        first_leg.push(pairings);
        if let Some(rotating) = slots.get_mut(1..) {
            rotating.rotate_right(1);
        }
    }

    let second_leg = first_leg.iter().map(|round| {
        round
            .iter()
            .map(|&(home, away)| (away, home))
            .collect::<Vec<_>>()
    });
    let all_rounds: Vec<Vec<(TeamId, TeamId)>> =
        first_leg.iter().cloned().chain(second_leg).collect();

    let mut fixtures = Vec::with_capacity(teams.len().saturating_mul(teams.len().saturating_sub(1)));
    let mut next_id = request.first_id;
    for (matchday, pairings) in (1_u32..).zip(all_rounds) {
        let scheduled_at = request.season_start
            + request
                .matchday_spacing
                .checked_mul(i32::try_from(matchday.saturating_sub(1)).unwrap_or(i32::MAX))
                .unwrap_or(Duration::zero());
        for (home_team, away_team) in pairings {
            fixtures.push(Fixture {
                id: next_id,
                matchday,
                league: request.league,
                home_team,
                away_team,
                played: false,
                match_id: None,
                scheduled_at,
            });
            next_id = next_id.next();
        }
    }

    Ok(fixtures)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn make_teams(n: u32) -> Vec<TeamId> {
        (1..=n).map(TeamId::new).collect()
    }

    fn make_schedule(teams: &[TeamId]) -> Vec<Fixture> {
        double_round_robin(&ScheduleRequest {
            league: League::PremierLeague,
            teams,
            first_id: FixtureId::new(1),
            season_start: Utc::now(),
            matchday_spacing: Duration::days(7),
        })
        .unwrap()
    }

    #[test]
    fn ten_teams_give_ninety_fixtures_over_eighteen_matchdays() {
        let fixtures = make_schedule(&make_teams(10));
        assert_eq!(fixtures.len(), 90);
        let matchdays: BTreeSet<u32> = fixtures.iter().map(|f| f.matchday).collect();
        assert_eq!(matchdays.len(), 18);
        assert_eq!(matchdays.first(), Some(&1));
        assert_eq!(matchdays.last(), Some(&18));
        assert_eq!(fixtures.iter().filter(|f| f.matchday == 1).count(), 5);
    }

    #[test]
    fn every_pair_meets_once_in_each_direction() {
        for n in [2_u32, 4, 6, 10, 20] {
            let teams = make_teams(n);
            let fixtures = make_schedule(&teams);
            let n_usize = usize::try_from(n).unwrap();
            assert_eq!(fixtures.len(), n_usize * (n_usize - 1));

            let mut directed: BTreeMap<(TeamId, TeamId), u32> = BTreeMap::new();
            for f in &fixtures {
                *directed.entry((f.home_team, f.away_team)).or_default() += 1;
            }
            for a in &teams {
                for b in &teams {
                    if a != b {
                        assert_eq!(directed.get(&(*a, *b)), Some(&1), "{a} v {b} with n={n}");
                    }
                }
            }
            for team in &teams {
                let appearances = fixtures.iter().filter(|f| f.involves(*team)).count();
                assert_eq!(appearances, 2 * (n_usize - 1));
            }
        }
    }

    #[test]
    fn each_team_plays_once_per_matchday() {
        let fixtures = make_schedule(&make_teams(8));
        let mut per_day: BTreeMap<u32, Vec<TeamId>> = BTreeMap::new();
        for f in &fixtures {
            let day = per_day.entry(f.matchday).or_default();
            day.push(f.home_team);
            day.push(f.away_team);
        }
        for teams in per_day.values() {
            let unique: BTreeSet<_> = teams.iter().collect();
            assert_eq!(unique.len(), teams.len());
        }
    }

    #[test]
    fn odd_team_count_uses_byes() {
        let fixtures = make_schedule(&make_teams(5));
        assert_eq!(fixtures.len(), 20);
        assert!(fixtures.iter().all(|f| f.home_team != f.away_team));
    }

    #[test]
    fn ids_and_dates_follow_schedule_order() {
        let fixtures = make_schedule(&make_teams(4));
        for (a, b) in fixtures.iter().zip(fixtures.iter().skip(1)) {
            assert!(a.id < b.id);
            assert!(a.matchday <= b.matchday);
            assert!(a.scheduled_at <= b.scheduled_at);
        }
        assert!(fixtures.iter().all(|f| !f.played && f.match_id.is_none()));
    }

    #[test]
    fn rejects_degenerate_input() {
        let one = make_teams(1);
        let err = double_round_robin(&ScheduleRequest {
            league: League::LaLiga,
            teams: &one,
            first_id: FixtureId::new(1),
            season_start: Utc::now(),
            matchday_spacing: Duration::days(1),
        });
        assert!(matches!(err, Err(LeagueError::TooFewTeams { count: 1, .. })));

        let dup = vec![TeamId::new(1), TeamId::new(1)];
        let err = double_round_robin(&ScheduleRequest {
            league: League::LaLiga,
            teams: &dup,
            first_id: FixtureId::new(1),
            season_start: Utc::now(),
            matchday_spacing: Duration::days(1),
        });
        assert!(matches!(err, Err(LeagueError::DuplicateTeam(_))));
    }
}
