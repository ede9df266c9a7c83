//! End-of-season honours.
//!
//! Every award is a max-by-field scan over players in id order. Ties go to
//! the lowest id, so the outcome only depends on the data. An empty player
//! pool yields no winner rather than an error.

use std::collections::BTreeMap;

use matchday_types::{AwardWinner, Champion, League, Player};

use crate::table::LeagueTables;

/// Player honours for one season.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonAwards {
    /// Most goals.
    pub top_scorer: Option<AwardWinner>,
    /// Most assists.
    pub top_assists: Option<AwardWinner>,
    /// Most fouls committed.
    pub most_fouls: Option<AwardWinner>,
    /// Best average rating among players with enough appearances.
    pub player_of_season: Option<AwardWinner>,
}

/// Compute the season's player awards.
///
/// Player of the season needs at least `min_appearances` matches; when
/// nobody qualifies the best average across all players is used.
pub fn compute_awards<'a, I>(players: I, min_appearances: u32) -> SeasonAwards
where
    I: IntoIterator<Item = &'a Player>,
    I::IntoIter: Clone,
{
    let players = players.into_iter();
    let regulars = players
        .clone()
        .filter(|p| p.season.matches_played >= min_appearances);

    SeasonAwards {
        top_scorer: best_by(players.clone(), |p| f64::from(p.season.goals)),
        top_assists: best_by(players.clone(), |p| f64::from(p.season.assists)),
        most_fouls: best_by(players.clone(), |p| f64::from(p.season.fouls)),
        player_of_season: best_by(regulars, |p| p.season.average_rating)
            .or_else(|| best_by(players, |p| p.season.average_rating)),
    }
}

/// Leader of every league that has a table.
pub fn champions(tables: &LeagueTables) -> BTreeMap<League, Champion> {
    League::ALL
        .iter()
        .filter_map(|&league| {
            tables.leader(league).map(|row| {
                (
                    league,
                    Champion {
                        team_id: row.team_id,
                        team_name: row.team_name.clone(),
                        points: row.points,
                    },
                )
            })
        })
        .collect()
}

/// First player with the strictly highest key.
pub fn best_by<'a, I, F>(players: I, key: F) -> Option<AwardWinner>
where
    I: Iterator<Item = &'a Player>,
    F: Fn(&Player) -> f64,
{
    let mut best: Option<(&Player, f64)> = None;
    for player in players {
        let value = key(player);
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((player, value));
        }
    }
    best.map(|(player, value)| AwardWinner {
        player_id: player.id,
        name: player.name.clone(),
        team_id: player.team_id,
        value,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use matchday_types::{
        CareerStats, FormResult, PlayerCharacteristics, PlayerId, PlayerSeasonStats, Position,
        TeamId, TeamInfo,
    };

    use super::*;
    use crate::table::MatchResult;

    fn make_player(id: u32, season: PlayerSeasonStats) -> Player {
        Player {
            id: PlayerId::new(id),
            name: format!("Player {id}"),
            position: Position::Striker,
            number: 9,
            age: 24,
            nationality: String::from("Spain"),
            team_id: TeamId::new(1),
            market_value: 20,
            characteristics: PlayerCharacteristics {
                speed: 70,
                shooting: 80,
                passing: 60,
                defending: 30,
                physicality: 60,
                mentality: 70,
                overall: 61,
            },
            career: CareerStats::default(),
            season,
            current_rating: 6.0,
        }
    }

    #[test]
    fn picks_maxima_with_lowest_id_on_ties() {
        let players = [
            make_player(1, PlayerSeasonStats { goals: 10, assists: 3, fouls: 7, ..Default::default() }),
            make_player(2, PlayerSeasonStats { goals: 10, assists: 9, fouls: 1, ..Default::default() }),
            make_player(3, PlayerSeasonStats { goals: 4, assists: 9, fouls: 12, ..Default::default() }),
        ];
        let awards = compute_awards(&players, 10);
        assert_eq!(awards.top_scorer.unwrap().player_id, PlayerId::new(1));
        assert_eq!(awards.top_assists.unwrap().player_id, PlayerId::new(2));
        let fouls = awards.most_fouls.unwrap();
        assert_eq!(fouls.player_id, PlayerId::new(3));
        assert!((fouls.value - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn player_of_season_requires_appearances() {
        let players = [
            make_player(1, PlayerSeasonStats { matches_played: 2, average_rating: 9.5, ..Default::default() }),
            make_player(2, PlayerSeasonStats { matches_played: 12, average_rating: 7.1, ..Default::default() }),
            make_player(3, PlayerSeasonStats { matches_played: 15, average_rating: 6.8, ..Default::default() }),
        ];
        let awards = compute_awards(&players, 10);
        assert_eq!(awards.player_of_season.unwrap().player_id, PlayerId::new(2));
    }

    #[test]
    fn player_of_season_falls_back_when_nobody_qualifies() {
        let players = [
            make_player(1, PlayerSeasonStats { matches_played: 1, average_rating: 6.2, ..Default::default() }),
            make_player(2, PlayerSeasonStats { matches_played: 1, average_rating: 7.4, ..Default::default() }),
        ];
        let awards = compute_awards(&players, 10);
        assert_eq!(awards.player_of_season.unwrap().player_id, PlayerId::new(2));
    }

    #[test]
    fn empty_pool_has_no_winners() {
        let awards = compute_awards(&[], 10);
        assert_eq!(awards, SeasonAwards::default());
    }

    #[test]
    fn champions_are_table_leaders() {
        let team = |id: u32, league: League| TeamInfo {
            id: TeamId::new(id),
            name: format!("Team {id}"),
            short_name: format!("T{id}"),
            stadium: String::from("Ground"),
            manager: String::from("Boss"),
            founded: 1900,
            league,
            form: Vec::new(),
            form_points: 0,
            home_streak: 0,
            away_streak: 0,
        };
        let teams = [
            team(1, League::PremierLeague),
            team(2, League::PremierLeague),
            team(3, League::LaLiga),
        ];
        let mut tables = LeagueTables::new(&teams, Utc::now());
        tables.record(
            League::PremierLeague,
            &MatchResult {
                home: TeamId::new(1),
                away: TeamId::new(2),
                home_goals: 0,
                away_goals: 1,
            },
            (&[FormResult::Loss], &[FormResult::Win]),
            Utc::now(),
        );
        let champs = champions(&tables);
        assert_eq!(champs.len(), 2);
        assert_eq!(champs.get(&League::PremierLeague).unwrap().team_id, TeamId::new(2));
        assert_eq!(champs.get(&League::LaLiga).unwrap().team_id, TeamId::new(3));
    }
}
