//! Shared set-up for unit tests.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use matchday_league::seed_roster;
use matchday_types::{
    CommentaryId, Fixture, FixtureId, League, MatchId, Player, PlayerId, TeamId, TeamInfo,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::MatchRules;
use crate::live::{LiveMatch, MatchSetup, TickContext, create_match};

/// Two seeded clubs and everything a tick needs.
pub struct Harness {
    pub players: BTreeMap<PlayerId, Player>,
    pub home: TeamInfo,
    pub away: TeamInfo,
    pub rules: MatchRules,
    pub rng: StdRng,
    pub seq: CommentaryId,
    pub now: DateTime<Utc>,
}

impl Harness {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let roster = seed_roster(&mut rng, 25);
        let mut teams = roster
            .teams
            .into_values()
            .filter(|t| t.league == League::PremierLeague);
        let home = teams.next().unwrap();
        let away = teams.next().unwrap();
        Self {
            players: roster.players,
            home,
            away,
            rules: MatchRules::default(),
            rng,
            seq: CommentaryId::new(0),
            now: Utc.with_ymd_and_hms(2026, 1, 10, 15, 0, 0).unwrap(),
        }
    }

    pub fn context(&mut self) -> TickContext<'_, StdRng> {
        TickContext {
            players: &mut self.players,
            rules: &self.rules,
            now: self.now,
            rng: &mut self.rng,
            commentary_seq: &mut self.seq,
        }
    }

    pub fn setup(&self) -> MatchSetup {
        MatchSetup {
            id: MatchId::new(1),
            fixture: Fixture {
                id: FixtureId::new(1),
                matchday: 1,
                league: League::PremierLeague,
                home_team: self.home.id,
                away_team: self.away.id,
                played: true,
                match_id: Some(MatchId::new(1)),
                scheduled_at: self.now,
            },
            season: 1,
            home: self.home.clone(),
            away: self.away.clone(),
        }
    }

    pub fn kick_off(&mut self) -> LiveMatch {
        let setup = self.setup();
        create_match(setup, &mut self.context()).unwrap()
    }

    pub fn advance(&mut self, secs: i64) {
        self.now += Duration::seconds(secs);
    }
}

/// A club with no players on the books.
pub fn squad_team(id: u32) -> TeamInfo {
    TeamInfo {
        id: TeamId::new(id),
        name: format!("Club {id}"),
        short_name: format!("C{id}"),
        stadium: String::from("Ground"),
        manager: String::from("Boss"),
        founded: 1900,
        league: League::PremierLeague,
        form: Vec::new(),
        form_points: 0,
        home_streak: 0,
        away_streak: 0,
    }
}
