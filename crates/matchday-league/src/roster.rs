//! Seed rosters: the clubs of both leagues and their generated squads.
//!
//! Clubs are a fixed table. Squads are generated once at start-up from a
//! position template so every club can always field a goalkeeper and a
//! full eleven, with attribute ranges that depend on position.

use std::collections::BTreeMap;

use matchday_types::{
    CareerStats, League, Player, PlayerCharacteristics, PlayerId, PlayerSeasonStats, Position,
    TeamId, TeamInfo,
};
use rand::Rng;
use tracing::info;

/// Rating every player carries into kick-off.
pub const BASE_MATCH_RATING: f64 = 6.0;

// -----------------------------------------------------------------------
// Club table
// -----------------------------------------------------------------------

/// Static description of a club.
struct ClubSeed {
    name: &'static str,
    short_name: &'static str,
    stadium: &'static str,
    manager: &'static str,
    founded: u16,
    league: League,
}

const fn club(
    name: &'static str,
    short_name: &'static str,
    stadium: &'static str,
    manager: &'static str,
    founded: u16,
    league: League,
) -> ClubSeed {
    ClubSeed {
        name,
        short_name,
        stadium,
        manager,
        founded,
        league,
    }
}

const PL: League = League::PremierLeague;
const LL: League = League::LaLiga;

const CLUBS: &[ClubSeed] = &[
    club("Arsinel", "ARS", "Emerita Stadium", "Miguel Artetta", 1886, PL),
    club("Chelsey", "CHE", "Stamferd Bridge", "Maurizio Pochetino", 1905, PL),
    club("Liverpul", "LIV", "The New Anfeld", "Jurgen Klopp", 1892, PL),
    club("Menchester Citie", "MCI", "Blue Park Stadium", "Josep Guardyola", 1880, PL),
    club("Menchester Unighted", "MUN", "New Trafford", "Eric ten Haag", 1878, PL),
    club("Totenham", "TOT", "Totenham Fiery Stadium", "Angelo Postecoglu", 1882, PL),
    club("Newkastle Unighted", "NEW", "Saint Timothy Park", "Edward Howe", 1892, PL),
    club("Brighten", "BHA", "Watergate Express Stadium", "Robertu Di Zerbi", 1901, PL),
    club("Asten Vila", "AVL", "Vila Gates", "Unei Emary", 1874, PL),
    club("Westham Unighted", "WHU", "London Free City Stadium", "Davyd Mois", 1895, PL),
    club("Crystel Palas", "CRY", "Selhurst Gardens", "Roy Hodgsen", 1905, PL),
    club("Evertin", "EVE", "Goodisen Gardens", "Sean Dyche", 1878, PL),
    club("Fulhem", "FUL", "Cottage Park", "Marco Sylva", 1879, PL),
    club("Bournemoth", "BOU", "Vitality Gardens", "Andoni Iraola", 1899, PL),
    club("Lutin Town", "LUT", "Kenilworth Stadium", "Rob Edwards", 1885, PL),
    club("Notingham Forst", "NFO", "City Gardens", "Nuno Espirito", 1865, PL),
    club("Shefild Unighted", "SHU", "Bramall Fields", "Paul Heckingbottom", 1889, PL),
    club("Burnly", "BUR", "Turf Fields", "Vincent Kompany", 1882, PL),
    club("Wolfs", "WOL", "Molineux Gardens", "Gary O'Neil", 1877, PL),
    club("Breintford", "BRE", "Community Stadium", "Thomas Frank", 1889, PL),
    club("Reel Madred", "RMA", "Santiego De Ramon", "Carlo Ancheloti", 1902, LL),
    club("Barselona", "BAR", "Camp Nu", "Chavi Ernandes", 1899, LL),
    club("Atletiko Madred", "ATM", "Metropolitan Alfredo Stadium", "Diego Simeoane", 1903, LL),
    club("Athletik Bilbau", "ATH", "San Marino De Valdes", "Ernesto Valverdi", 1898, LL),
    club("Reel Sosyedad", "RSO", "Reale Areno", "Imanuel Alguasil", 1909, LL),
    club("Vilareal", "VIL", "Estadio de la Submarino", "Marselino Garsia", 1923, LL),
    club("Sevilia", "SEV", "Ramon Kareem Stadium", "Jose Luis Mendilebar", 1890, LL),
    club("Reel Betis", "BET", "Benitu New Park Stadium", "Manuel Pellegrini", 1907, LL),
    club("Valensia", "VAL", "Mestaya", "Ruben Baraha", 1919, LL),
    club("Getaffe", "GET", "Coliseum Alfonsu Dias", "Jose Bordalas", 1983, LL),
    club("Espanyol", "ESP", "Cornella-El Prat", "Luis Garcia", 1900, LL),
    club("Rayo Valekano", "RAY", "Estadio de Vallekas", "Inigo Perez", 1924, LL),
    club("Celta Vigo", "CEL", "Balaidos", "Claudio Giraldez", 1923, LL),
    club("Deportivo Alaves", "ALA", "Mendizorrotza", "Luis Garcia Plaza", 1921, LL),
    club("Real Mallorca", "MAL", "Visit Mallorca Estadi", "Javier Aguirre", 1916, LL),
    club("Las Palmas", "LAS", "Estadio Gran Canaria", "Garcia Pimienta", 1949, LL),
    club("Girona FC", "GIR", "Estadi Montilivi", "Michel Sanchez", 1930, LL),
    club("Osasuna", "OSA", "El Sadar", "Jagoba Arrasate", 1920, LL),
    club("Granada CF", "GRA", "Nuevo Los Carmenes", "Paco Lopez", 1931, LL),
    club("Cadiz CF", "CAD", "Estadio Ramon de Carranza", "Mauricio Pellegrino", 1910, LL),
];

// -----------------------------------------------------------------------
// Name pools
// -----------------------------------------------------------------------

/// `(nationality, first names, surnames)`.
const NAME_POOLS: &[(&str, &[&str], &[&str])] = &[
    (
        "England",
        &["Marcus", "James", "Alex", "Luke", "Ryan", "Jordan", "Oliver", "Connor", "Mason", "Harry"],
        &["Johnson", "Wilson", "Thompson", "Roberts", "Davis", "Smith", "Brown", "Taylor", "Clarke", "Evans"],
    ),
    (
        "Spain",
        &["Carlos", "Diego", "Pablo", "Miguel", "Alejandro", "Francisco", "Sergio", "Alberto", "Rafael", "Adrian"],
        &["Hernandez", "Martinez", "Garcia", "Rodriguez", "Perez", "Ruiz", "Gonzalez", "Moreno", "Jimenez", "Vazquez"],
    ),
    (
        "Italy",
        &["Marco", "Francesco", "Andrea", "Luca", "Matteo", "Davide", "Lorenzo", "Alessandro", "Simone", "Giovanni"],
        &["Rossi", "Romano", "Colombo", "Ferrari", "Conti", "Ricci", "Greco", "Bruno", "Gallo", "Mancini"],
    ),
    (
        "France",
        &["Antoine", "Lucas", "Hugo", "Theo", "Kylian", "Olivier", "Raphael", "Adrien", "Benjamin", "Jules"],
        &["Martin", "Bernard", "Dubois", "Moreau", "Laurent", "Lefebvre", "Girard", "Mercier", "Fournier", "Lambert"],
    ),
];

/// Squad composition applied to every club, goalkeepers first.
const SQUAD_TEMPLATE: &[(Position, u8)] = &[
    (Position::Goalkeeper, 3),
    (Position::CentreBack, 4),
    (Position::LeftBack, 2),
    (Position::RightBack, 2),
    (Position::DefensiveMidfielder, 2),
    (Position::CentralMidfielder, 3),
    (Position::AttackingMidfielder, 2),
    (Position::LeftWinger, 2),
    (Position::RightWinger, 2),
    (Position::Striker, 3),
];

// -----------------------------------------------------------------------
// Roster
// -----------------------------------------------------------------------

/// Clubs and players created at simulation start.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    /// Every club, keyed by id.
    pub teams: BTreeMap<TeamId, TeamInfo>,
    /// Every player, keyed by id.
    pub players: BTreeMap<PlayerId, Player>,
}

impl Roster {
    /// Teams in a league, in id order.
    pub fn league_teams(&self, league: League) -> Vec<TeamId> {
        self.teams
            .values()
            .filter(|team| team.league == league)
            .map(|team| team.id)
            .collect()
    }

    /// Players of a club, in id order.
    pub fn squad(&self, team: TeamId) -> Vec<&Player> {
        self.players
            .values()
            .filter(|player| player.team_id == team)
            .collect()
    }
}

/// Build both leagues from the club table with `squad_size` players each.
///
/// The first 25 squad slots follow the position template; larger squads
/// repeat it from the top, smaller ones truncate it.
pub fn seed_roster<R: Rng + ?Sized>(rng: &mut R, squad_size: u32) -> Roster {
    let mut roster = Roster::default();
    let mut next_player = PlayerId::new(1);

    for (team_id, seed) in (1_u32..).map(TeamId::new).zip(CLUBS) {
        roster.teams.insert(team_id, team_from_seed(team_id, seed));

        let positions = SQUAD_TEMPLATE
            .iter()
            .flat_map(|&(position, count)| std::iter::repeat_n(position, usize::from(count)))
            .cycle()
            .take(usize::try_from(squad_size).unwrap_or(usize::MAX));

        for (number, position) in (1_u8..).zip(positions) {
            let player = generate_player(rng, next_player, team_id, number, position);
            roster.players.insert(next_player, player);
            next_player = next_player.next();
        }
    }

    info!(
        teams = roster.teams.len(),
        players = roster.players.len(),
        squad_size,
        "Roster seeded"
    );
    roster
}

fn team_from_seed(id: TeamId, seed: &ClubSeed) -> TeamInfo {
    TeamInfo {
        id,
        name: seed.name.to_owned(),
        short_name: seed.short_name.to_owned(),
        stadium: seed.stadium.to_owned(),
        manager: seed.manager.to_owned(),
        founded: seed.founded,
        league: seed.league,
        form: Vec::new(),
        form_points: 0,
        home_streak: 0,
        away_streak: 0,
    }
}

fn generate_player<R: Rng + ?Sized>(
    rng: &mut R,
    id: PlayerId,
    team_id: TeamId,
    number: u8,
    position: Position,
) -> Player {
    let (nationality, name) = generate_name(rng);
    let characteristics = generate_characteristics(rng, position);
    Player {
        id,
        name,
        position,
        number,
        age: rng.random_range(18..=37),
        nationality: nationality.to_owned(),
        team_id,
        market_value: market_value(rng, &characteristics),
        characteristics,
        career: CareerStats::default(),
        season: PlayerSeasonStats::default(),
        current_rating: BASE_MATCH_RATING,
    }
}

fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, String) {
    let Some(&(nationality, firsts, lasts)) = NAME_POOLS.get(rng.random_range(0..NAME_POOLS.len()))
    else {
        return ("Unknown", String::from("Unnamed Player"));
    };
    let first = firsts.get(rng.random_range(0..firsts.len())).copied().unwrap_or("Player");
    let last = lasts.get(rng.random_range(0..lasts.len())).copied().unwrap_or("Unknown");
    (nationality, format!("{first} {last}"))
}

/// `(base, spread)` for speed, shooting, passing, defending, physicality,
/// mentality. Each attribute is drawn from `base..base + spread`.
const fn attribute_ranges(position: Position) -> [(u8, u8); 6] {
    match position {
        Position::Goalkeeper => [(20, 30), (10, 20), (40, 40), (60, 40), (60, 40), (70, 30)],
        Position::CentreBack => [(30, 40), (20, 30), (50, 40), (70, 30), (70, 30), (60, 40)],
        Position::LeftBack | Position::RightBack => {
            [(60, 40), (30, 40), (60, 40), (60, 40), (50, 40), (50, 40)]
        }
        Position::DefensiveMidfielder => [(40, 40), (40, 40), (70, 30), (70, 30), (60, 40), (60, 40)],
        Position::CentralMidfielder => [(50, 40), (50, 40), (70, 30), (50, 40), (50, 40), (60, 40)],
        Position::AttackingMidfielder => [(60, 40), (70, 30), (70, 30), (30, 40), (40, 40), (70, 30)],
        Position::LeftWinger | Position::RightWinger => {
            [(70, 30), (60, 40), (60, 40), (30, 40), (40, 40), (60, 40)]
        }
        Position::Striker => [(60, 40), (80, 20), (50, 40), (20, 30), (60, 40), (70, 30)],
    }
}

/// Draw position-appropriate attributes; `overall` is their mean.
pub fn generate_characteristics<R: Rng + ?Sized>(
    rng: &mut R,
    position: Position,
) -> PlayerCharacteristics {
    let mut values = attribute_ranges(position)
        .map(|(base, spread)| rng.random_range(base..base.saturating_add(spread)));
    for value in &mut values {
        *value = (*value).clamp(1, 100);
    }
    let [speed, shooting, passing, defending, physicality, mentality] = values;
    let sum: u32 = values.iter().map(|&v| u32::from(v)).sum();
    PlayerCharacteristics {
        speed,
        shooting,
        passing,
        defending,
        physicality,
        mentality,
        overall: u8::try_from(sum / 6).unwrap_or(100),
    }
}

/// Market value in millions: half the overall rating, +/-15, within 5-200.
fn market_value<R: Rng + ?Sized>(rng: &mut R, characteristics: &PlayerCharacteristics) -> u32 {
    let base = i64::from(characteristics.overall / 2);
    let variation: i64 = rng.random_range(-15..15);
    u32::try_from(base.saturating_add(variation).clamp(5, 200)).unwrap_or(5)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn seeds_two_leagues_of_twenty() {
        let mut rng = StdRng::seed_from_u64(42);
        let roster = seed_roster(&mut rng, 25);
        assert_eq!(roster.teams.len(), 40);
        assert_eq!(roster.league_teams(League::PremierLeague).len(), 20);
        assert_eq!(roster.league_teams(League::LaLiga).len(), 20);
        assert_eq!(roster.players.len(), 40 * 25);
    }

    #[test]
    fn every_squad_has_goalkeepers_and_unique_numbers() {
        let mut rng = StdRng::seed_from_u64(7);
        let roster = seed_roster(&mut rng, 25);
        for team in roster.teams.keys() {
            let squad = roster.squad(*team);
            assert_eq!(squad.len(), 25);
            let keepers = squad.iter().filter(|p| p.position.is_goalkeeper()).count();
            assert_eq!(keepers, 3);
            let mut numbers: Vec<u8> = squad.iter().map(|p| p.number).collect();
            numbers.dedup();
            assert_eq!(numbers.len(), 25);
        }
    }

    #[test]
    fn striker_attributes_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let c = generate_characteristics(&mut rng, Position::Striker);
            assert!((80..100).contains(&c.shooting));
            assert!((20..50).contains(&c.defending));
            assert!(c.overall >= 1 && c.overall <= 100);
        }
    }

    #[test]
    fn players_start_with_base_rating_and_empty_stats() {
        let mut rng = StdRng::seed_from_u64(1);
        let roster = seed_roster(&mut rng, 11);
        let player = roster.players.values().next().unwrap();
        assert!((player.current_rating - BASE_MATCH_RATING).abs() < f64::EPSILON);
        assert_eq!(player.career, CareerStats::default());
        assert!((5..=200).contains(&player.market_value));
    }
}
