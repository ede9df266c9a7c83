//! Team selection.
//!
//! Slots are filled in formation order. Each slot takes the best remaining
//! player of its exact role, then of its line, then anyone left. The rest
//! of the squad sits on the bench, best first.

use matchday_types::{Formation, Player, PlayerId, Position, TeamId};

use crate::error::MatchError;
use crate::positioning::slots;

/// Players needed to start a match.
pub const STARTERS: usize = 11;

/// Substitutes named on the bench.
pub const BENCH_SIZE: usize = 9;

/// A team's lineup (in slot order) and bench.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSheet {
    /// Starters, index `i` playing slot `i` of the formation.
    pub lineup: Vec<PlayerId>,
    /// Substitutes, best first.
    pub bench: Vec<PlayerId>,
}

/// Name the eleven and the bench for a formation.
pub fn pick_lineup(
    team: TeamId,
    squad: &[&Player],
    formation: Formation,
) -> Result<TeamSheet, MatchError> {
    if squad.len() < STARTERS {
        return Err(MatchError::ShortSquad {
            team,
            available: squad.len(),
        });
    }
    if !squad.iter().any(|p| p.position.is_goalkeeper()) {
        return Err(MatchError::NoGoalkeeper { team });
    }

    let mut pool: Vec<&Player> = squad.to_vec();
    pool.sort_by(|a, b| {
        b.characteristics
            .overall
            .cmp(&a.characteristics.overall)
            .then(a.id.cmp(&b.id))
    });

    let mut lineup = Vec::with_capacity(STARTERS);
    for slot in slots(formation) {
        let Some(index) = best_for(&pool, slot.role) else {
            continue;
        };
        lineup.push(pool.remove(index).id);
    }

    let bench = pool.iter().take(BENCH_SIZE).map(|p| p.id).collect();
    Ok(TeamSheet { lineup, bench })
}

/// Index in `pool` of the best player for a role.
fn best_for(pool: &[&Player], role: Position) -> Option<usize> {
    let exact = pool.iter().position(|p| p.position == role);
    if role.is_goalkeeper() {
        return exact.or_else(|| (!pool.is_empty()).then_some(0));
    }
    exact
        .or_else(|| {
            pool.iter()
                .position(|p| p.position.group() == role.group())
        })
        .or_else(|| pool.iter().position(|p| !p.position.is_goalkeeper()))
        .or_else(|| (!pool.is_empty()).then_some(0))
}

/// Best bench player to replace someone in `role`.
pub fn best_substitute(bench: &[&Player], role: Position) -> Option<PlayerId> {
    let mut ordered: Vec<&Player> = bench.to_vec();
    ordered.sort_by(|a, b| {
        b.characteristics
            .overall
            .cmp(&a.characteristics.overall)
            .then(a.id.cmp(&b.id))
    });
    best_for(&ordered, role).and_then(|i| ordered.get(i)).map(|p| p.id)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use matchday_types::{
        CareerStats, PlayerCharacteristics, PlayerSeasonStats, PositionGroup,
    };

    use super::*;

    fn make_player(id: u32, position: Position, overall: u8) -> Player {
        Player {
            id: PlayerId::new(id),
            name: format!("Player {id}"),
            position,
            number: 1,
            age: 25,
            nationality: String::from("France"),
            team_id: TeamId::new(1),
            market_value: 10,
            characteristics: PlayerCharacteristics {
                speed: overall,
                shooting: overall,
                passing: overall,
                defending: overall,
                physicality: overall,
                mentality: overall,
                overall,
            },
            career: CareerStats::default(),
            season: PlayerSeasonStats::default(),
            current_rating: 6.0,
        }
    }

    fn full_squad() -> Vec<Player> {
        let positions = [
            Position::Goalkeeper,
            Position::Goalkeeper,
            Position::CentreBack,
            Position::CentreBack,
            Position::CentreBack,
            Position::LeftBack,
            Position::RightBack,
            Position::CentralMidfielder,
            Position::CentralMidfielder,
            Position::DefensiveMidfielder,
            Position::LeftWinger,
            Position::RightWinger,
            Position::Striker,
            Position::Striker,
        ];
        (1..)
            .zip(positions)
            .map(|(id, pos)| make_player(id, pos, u8::try_from(50 + id).unwrap()))
            .collect()
    }

    #[test]
    fn picks_eleven_with_best_keeper_first() {
        let squad = full_squad();
        let refs: Vec<&Player> = squad.iter().collect();
        let sheet = pick_lineup(TeamId::new(1), &refs, Formation::FourFourTwo).unwrap();
        assert_eq!(sheet.lineup.len(), 11);
        assert_eq!(sheet.lineup[0], PlayerId::new(2));
        assert_eq!(sheet.bench.len(), 3);
        let mut all = sheet.lineup.clone();
        all.extend(&sheet.bench);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), squad.len());
    }

    #[test]
    fn slots_prefer_exact_role_then_line() {
        let squad = full_squad();
        let refs: Vec<&Player> = squad.iter().collect();
        let sheet = pick_lineup(TeamId::new(1), &refs, Formation::FourFourTwo).unwrap();
        let position = |id: PlayerId| squad.iter().find(|p| p.id == id).unwrap().position;
        assert_eq!(position(sheet.lineup[1]), Position::LeftBack);
        assert_eq!(position(sheet.lineup[9]), Position::Striker);
        assert!(
            sheet.lineup[1..]
                .iter()
                .all(|&id| position(id).group() != PositionGroup::Goalkeeper)
        );
    }

    #[test]
    fn rejects_short_squads_and_missing_keepers() {
        let squad = full_squad();
        let short: Vec<&Player> = squad.iter().take(5).collect();
        assert_eq!(
            pick_lineup(TeamId::new(1), &short, Formation::FourFourTwo),
            Err(MatchError::ShortSquad {
                team: TeamId::new(1),
                available: 5
            })
        );
        let outfield: Vec<&Player> = squad.iter().skip(2).collect();
        assert_eq!(
            pick_lineup(TeamId::new(1), &outfield, Formation::FourThreeThree),
            Err(MatchError::NoGoalkeeper {
                team: TeamId::new(1)
            })
        );
    }

    #[test]
    fn substitute_matches_line() {
        let bench = [
            make_player(20, Position::Striker, 90),
            make_player(21, Position::CentreBack, 60),
            make_player(22, Position::LeftBack, 70),
        ];
        let refs: Vec<&Player> = bench.iter().collect();
        assert_eq!(
            best_substitute(&refs, Position::CentreBack),
            Some(PlayerId::new(21))
        );
        assert_eq!(
            best_substitute(&refs, Position::RightBack),
            Some(PlayerId::new(22))
        );
        assert_eq!(best_substitute(&[], Position::Striker), None);
    }
}
