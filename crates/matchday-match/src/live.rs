//! The live match bundle and match creation.
//!
//! A [`LiveMatch`] owns every piece of per-match state the tick touches:
//! the [`Match`] record, its statistics, the ball, player locations,
//! momentum, probabilities, availability, and recent commentary. Player
//! records are shared across matches and are passed in through a
//! [`TickContext`] instead.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use matchday_league::{
    BASE_MATCH_RATING, PreMatchOdds, attack_strength, pre_match_odds, team_strength,
};
use matchday_types::{
    AvailabilityStatus, BallEvent, BallPosition, CommentaryEntry, CommentaryId,
    DynamicMatchProbabilities, EventKind, Fixture, FormResult, Formation, Match, MatchId,
    MatchMomentum, MatchPeriod, MatchStats, MatchStatus, Player, PlayerAvailability, PlayerId,
    PlayerLocation, Side, Tactic, TeamInfo, Weather,
};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

use crate::config::MatchRules;
use crate::error::MatchError;
use crate::lineup::{TeamSheet, pick_lineup};
use crate::pitch::Point;
use crate::{commentary, positioning, probability};

/// Mutable surroundings of a match tick.
///
/// Player records live outside any one match because season statistics
/// and ratings are shared; the tick borrows them for its duration.
pub struct TickContext<'a, R: Rng + ?Sized> {
    /// Every player of every club, by id.
    pub players: &'a mut BTreeMap<PlayerId, Player>,
    /// Match rules.
    pub rules: &'a MatchRules,
    /// Wall-clock time of this tick.
    pub now: DateTime<Utc>,
    /// Random source.
    pub rng: &'a mut R,
    /// Last commentary id handed out.
    pub commentary_seq: &'a mut CommentaryId,
}

/// Minutes a player spent on the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stint {
    /// Side the player appeared for.
    pub side: Side,
    /// Minute the player came on.
    pub from: u32,
    /// Minute the player went off, if before full time.
    pub until: Option<u32>,
}

/// Everything a running match needs between ticks.
#[derive(Debug, Clone)]
pub struct LiveMatch {
    /// The match record.
    pub info: Match,
    /// Running team statistics.
    pub stats: MatchStats,
    /// Ball state.
    pub ball: BallPosition,
    /// Locations of players currently on the pitch.
    pub locations: BTreeMap<PlayerId, PlayerLocation>,
    /// Momentum of both sides.
    pub momentum: MatchMomentum,
    /// Live outcome probabilities.
    pub probabilities: DynamicMatchProbabilities,
    /// Players who can no longer take part.
    pub availability: BTreeMap<PlayerId, PlayerAvailability>,
    /// Recent commentary, newest first.
    pub commentary: VecDeque<CommentaryEntry>,
    /// Odds at kick-off; live probabilities are always derived from these.
    pub baseline: PreMatchOdds,
    /// Team strength at kick-off, home then away.
    pub strength: [f64; 2],
    /// Attack strength at kick-off, home then away.
    pub attack: [f64; 2],
    /// Everyone who has appeared, with their time on the pitch.
    pub stints: BTreeMap<PlayerId, Stint>,
}

/// What is needed to start a match from a claimed fixture.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    /// Identifier for the new match.
    pub id: MatchId,
    /// The claimed fixture.
    pub fixture: Fixture,
    /// Season being played.
    pub season: u32,
    /// Home club, with its current form.
    pub home: TeamInfo,
    /// Away club, with its current form.
    pub away: TeamInfo,
}

const fn side_index(side: Side) -> usize {
    match side {
        Side::Home => 0,
        Side::Away => 1,
    }
}

impl LiveMatch {
    /// Identifier of the match.
    pub const fn id(&self) -> MatchId {
        self.info.id
    }

    /// Team strength of a side.
    pub fn strength(&self, side: Side) -> f64 {
        self.strength.get(side_index(side)).copied().unwrap_or(0.5)
    }

    /// Attack strength of a side.
    pub fn attack(&self, side: Side) -> f64 {
        self.attack.get(side_index(side)).copied().unwrap_or(0.5)
    }

    /// Whether a player may still take part.
    pub fn is_available(&self, player: PlayerId) -> bool {
        self.availability
            .get(&player)
            .is_none_or(|a| a.status == AvailabilityStatus::Available)
    }

    /// Players of a side currently on the pitch, in lineup order.
    pub fn on_pitch(&self, side: Side) -> Vec<PlayerId> {
        self.info
            .lineup(side)
            .iter()
            .copied()
            .filter(|&p| self.is_available(p))
            .collect()
    }

    /// Number of players a side has on the pitch.
    pub fn players_on_pitch(&self, side: Side) -> u32 {
        u32::try_from(self.on_pitch(side).len()).unwrap_or(u32::MAX)
    }

    /// Current location of a player on the pitch.
    pub fn location(&self, player: PlayerId) -> Option<Point> {
        self.locations.get(&player).map(|l| Point::new(l.x, l.y))
    }

    /// Current ball position.
    pub const fn ball_point(&self) -> Point {
        Point::new(self.ball.x, self.ball.y)
    }

    /// Side of the player on the ball, if any.
    pub fn possession_side(&self) -> Option<Side> {
        self.ball.possessor.and_then(|p| self.info.side_of(p))
    }

    /// Close a player's stint at the current minute.
    pub(crate) fn end_stint(&mut self, player: PlayerId) {
        let minute = self.info.minute;
        if let Some(stint) = self.stints.get_mut(&player) {
            stint.until.get_or_insert(minute);
        }
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Build a live match from a claimed fixture.
///
/// Picks formations, tactics, and match-day flavour, names both lineups,
/// fixes the pre-match odds, and places the ball on the centre spot for
/// the home kick-off.
pub fn create_match<R: Rng + ?Sized>(
    setup: MatchSetup,
    ctx: &mut TickContext<'_, R>,
) -> Result<LiveMatch, MatchError> {
    let MatchSetup {
        id,
        fixture,
        season,
        home,
        away,
    } = setup;
    let now = ctx.now;

    let home_formation = pick(ctx.rng, &Formation::ALL, Formation::FourFourTwo);
    let away_formation = pick(ctx.rng, &Formation::ALL, Formation::FourFourTwo);
    let home_tactic = pick(ctx.rng, &Tactic::ALL, Tactic::Balanced);
    let away_tactic = pick(ctx.rng, &Tactic::ALL, Tactic::Balanced);
    let weather = pick(ctx.rng, &Weather::ALL, Weather::Clear);

    let (home_sheet, home_strength) = team_sheet(ctx.players, &home, home_formation)?;
    let (away_sheet, away_strength) = team_sheet(ctx.players, &away, away_formation)?;
    let baseline = pre_match_odds(home_strength, away_strength);

    for player_id in home_sheet.lineup.iter().chain(&away_sheet.lineup) {
        if let Some(player) = ctx.players.get_mut(player_id) {
            player.current_rating = BASE_MATCH_RATING;
        }
    }

    let mut stints = BTreeMap::new();
    for (side, sheet) in [(Side::Home, &home_sheet), (Side::Away, &away_sheet)] {
        for &player in &sheet.lineup {
            stints.insert(
                player,
                Stint {
                    side,
                    from: 0,
                    until: None,
                },
            );
        }
    }

    let attack = [attack_strength(&home), attack_strength(&away)];
    let info = Match {
        id,
        fixture_id: fixture.id,
        league: fixture.league,
        season,
        matchday: fixture.matchday,
        venue: home.stadium.clone(),
        home_team: home,
        away_team: away,
        home_score: 0,
        away_score: 0,
        minute: 0,
        status: MatchStatus::Live,
        period: MatchPeriod::FirstHalf,
        attendance: ctx.rng.random_range(20_000..100_000),
        weather,
        temperature: ctx.rng.random_range(5..30),
        home_formation,
        away_formation,
        home_tactic,
        away_tactic,
        injury_time: ctx.rng.random_range(0..=ctx.rules.max_injury_time),
        start_time: now,
        halftime_started_at: None,
        halftime_end_time: None,
        is_in_break: false,
        end_time: None,
        player_ratings: BTreeMap::new(),
        home_lineup: home_sheet.lineup,
        away_lineup: away_sheet.lineup,
        home_bench: home_sheet.bench,
        away_bench: away_sheet.bench,
        home_substitutions: 0,
        away_substitutions: 0,
        last_update: now,
    };

    let centre = Point::centre();
    let mut live = LiveMatch {
        stats: MatchStats::new(id, now),
        ball: BallPosition {
            match_id: id,
            x: centre.x,
            y: centre.y,
            possessor: None,
            last_touch: None,
            speed: 0.0,
            direction: 0.0,
            state: BallEvent::Kickoff,
            state_since: now,
            restart_side: Some(Side::Home),
            last_update: now,
        },
        locations: BTreeMap::new(),
        momentum: MatchMomentum {
            match_id: id,
            home: 0.0,
            away: 0.0,
            last_goal: None,
            last_red_card: None,
            pressure: 0.0,
            last_update: now,
        },
        probabilities: DynamicMatchProbabilities {
            match_id: id,
            home_win: baseline.home_win,
            draw: baseline.draw,
            away_win: baseline.away_win,
            home_next_goal: 0.5,
            away_next_goal: 0.5,
            factors: BTreeMap::new(),
            last_update: now,
        },
        availability: BTreeMap::new(),
        commentary: VecDeque::new(),
        baseline,
        strength: [home_strength, away_strength],
        attack,
        stints,
        info,
    };

    positioning::refresh_positions(&mut live, ctx);
    probability::refresh(&mut live, now);

    let text = kickoff_text(&live);
    commentary::push(&mut live, ctx, EventKind::Kickoff, text, None);

    info!(
        match_id = %id,
        league = %live.info.league,
        home = %live.info.home_team.name,
        away = %live.info.away_team.name,
        matchday = live.info.matchday,
        "Match kicked off"
    );
    Ok(live)
}

fn pick<R: Rng + ?Sized, T: Copy>(rng: &mut R, options: &[T], fallback: T) -> T {
    options.choose(rng).copied().unwrap_or(fallback)
}

/// Pick a lineup and measure the squad's strength.
fn team_sheet(
    players: &BTreeMap<PlayerId, Player>,
    team: &TeamInfo,
    formation: Formation,
) -> Result<(TeamSheet, f64), MatchError> {
    let squad: Vec<&Player> = players.values().filter(|p| p.team_id == team.id).collect();
    let sheet = pick_lineup(team.id, &squad, formation)?;
    Ok((sheet, team_strength(team, &squad)))
}

fn form_string(form: &[FormResult]) -> String {
    if form.is_empty() {
        return String::from("-");
    }
    form.iter().map(|r| r.code()).collect()
}

fn kickoff_text(live: &LiveMatch) -> String {
    let m = &live.info;
    format!(
        "Kick-off at {venue}! {home} ({home_form}) v {away} ({away_form}). {weather}, {temp}C, \
         {attendance} in attendance. Odds: home {hw:.0}%, draw {d:.0}%, away {aw:.0}%.",
        venue = m.venue,
        home = m.home_team.name,
        home_form = form_string(&m.home_team.form),
        away = m.away_team.name,
        away_form = form_string(&m.away_team.form),
        weather = m.weather.label(),
        temp = m.temperature,
        attendance = m.attendance,
        hw = live.baseline.home_win * 100.0,
        d = live.baseline.draw * 100.0,
        aw = live.baseline.away_win * 100.0,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use matchday_types::Position;

    use super::*;
    use crate::testing::{Harness, squad_team};

    #[test]
    fn creation_fields_two_full_elevens() {
        let mut h = Harness::new(7);
        let live = h.kick_off();
        assert_eq!(live.info.home_lineup.len(), 11);
        assert_eq!(live.info.away_lineup.len(), 11);
        assert_eq!(live.info.status, MatchStatus::Live);
        assert_eq!(live.info.minute, 0);
        assert_eq!(live.ball.state, BallEvent::Kickoff);
        assert_eq!(live.ball.restart_side, Some(Side::Home));
        assert_eq!(live.locations.len(), 22);
        assert!(live.info.injury_time <= 6);
        let keeper = h.players.get(&live.info.home_lineup[0]).unwrap();
        assert_eq!(keeper.position, Position::Goalkeeper);
        assert_eq!(live.commentary.front().unwrap().kind, EventKind::Kickoff);
    }

    #[test]
    fn probabilities_start_at_baseline() {
        let mut h = Harness::new(3);
        let live = h.kick_off();
        let p = &live.probabilities;
        assert!((p.home_win + p.draw + p.away_win - 1.0).abs() < 1e-9);
        assert!((p.home_win - live.baseline.home_win).abs() < 0.05);
    }

    #[test]
    fn fresh_match_has_everyone_available() {
        let mut h = Harness::new(11);
        let live = h.kick_off();
        assert!(live.availability.is_empty());
        assert_eq!(live.players_on_pitch(Side::Home), 11);
        assert!(
            live.availability
                .values()
                .all(|a| a.status != AvailabilityStatus::RedCard)
        );
    }

    #[test]
    fn short_squad_is_rejected() {
        let mut h = Harness::new(5);
        let short = squad_team(99);
        let mut setup = h.setup();
        setup.away = short;
        let err = create_match(setup, &mut h.context()).unwrap_err();
        assert!(matches!(err, MatchError::ShortSquad { available: 0, .. }));
    }
}
