//! The in-match event generator.
//!
//! Each open-play tick may fire one event. The event type is drawn from
//! base weights bent by the strength gap between the sides: a lopsided
//! match produces more goals and, from the side being outplayed, more
//! fouls and cards.
//!
//! Goals follow one decision tree. The player on the ball shoots if they
//! are an outfield player in the attacking third, with a chance built from
//! their role, their distance to goal, and the shooting angle. Otherwise
//! the attacker nearest the goal finishes if they are close enough.
//! Otherwise nothing comes of it.

use std::f64::consts::PI;

use matchday_types::{
    BallEvent, CardColor, EventKind, PlayerId, Position, PositionGroup, Side,
};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::ball::{set_restart, touch};
use crate::live::{LiveMatch, TickContext};
use crate::momentum::{self, Swing};
use crate::pitch::{
    CENTRE_Y, PITCH_LENGTH, Point, corner_flag, depth_of, goal_kick_spot, goal_mouth,
    in_attacking_third, in_own_half, in_penalty_area, penalty_spot,
};
use crate::ratings::{self, ASSIST_BONUS, GOAL_BONUS, RED_PENALTY, YELLOW_PENALTY};
use crate::{availability, commentary, probability};

/// Attackers further than this from goal cannot finish a loose chance.
pub const FALLBACK_RADIUS: f64 = 25.0;

/// Distance from goal at which the proximity multiplier reaches zero.
const SHOOTING_RANGE: f64 = 40.0;

/// Best possible chance from a single shot.
const MAX_SHOT_CHANCE: f64 = 0.95;

/// Red-card chance of an ordinary foul.
const BASE_RED_CHANCE: f64 = 0.02;

/// Yellow-card chance of a foul that is not a red.
const FOUL_YELLOW_CHANCE: f64 = 0.25;

/// Pace from which a challenge counts as high speed.
const HIGH_SPEED: u8 = 80;

/// Chance that a dangerous challenge injures the fouled player.
const INJURY_CHANCE: f64 = 0.3;

/// Shift in the home side's offending chance per unit of strength gap.
const OFFENDER_BIAS: f64 = 0.75;

// ---------------------------------------------------------------------------
// Event selection
// ---------------------------------------------------------------------------

/// Kind of event fired by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventChoice {
    /// A goal attempt.
    Goal,
    /// A booking.
    Card,
    /// A corner kick.
    Corner,
    /// A foul.
    Foul,
    /// Flavour commentary.
    Commentary,
}

/// Event weights for a strength gap of `home - away`, summing to 1.
///
/// Any gap raises the goal weight. Cards and fouls only rise when the home
/// side is the weaker one.
pub fn weights(strength_diff: f64) -> [(EventChoice, f64); 5] {
    let gap = strength_diff.abs();
    let home_deficit = (-strength_diff).max(0.0);
    let raw = [
        (EventChoice::Goal, 0.15 * gap.mul_add(0.5, 1.0)),
        (EventChoice::Card, 0.20 * home_deficit.mul_add(0.3, 1.0)),
        (EventChoice::Corner, 0.25),
        (EventChoice::Foul, 0.25 * home_deficit.mul_add(0.3, 1.0)),
        (EventChoice::Commentary, 0.15),
    ];
    let total: f64 = raw.iter().map(|(_, w)| w).sum();
    raw.map(|(choice, w)| (choice, w / total))
}

/// Side that commits a foul or picks up a card, leaning towards the weaker
/// side for a strength gap of `home - away`.
pub fn offending_side<R: Rng + ?Sized>(strength_diff: f64, rng: &mut R) -> Side {
    let home_chance = strength_diff.mul_add(-OFFENDER_BIAS, 0.5).clamp(0.2, 0.8);
    if rng.random_bool(home_chance) {
        Side::Home
    } else {
        Side::Away
    }
}

/// Draw one event from normalized weights.
pub fn draw<R: Rng + ?Sized>(weights: &[(EventChoice, f64)], rng: &mut R) -> EventChoice {
    let roll: f64 = rng.random();
    let mut cumulative = 0.0;
    for &(choice, weight) in weights {
        cumulative += weight;
        if roll < cumulative {
            return choice;
        }
    }
    EventChoice::Commentary
}

/// Maybe fire one event for this tick.
///
/// Only fires while the ball is in play; returns the event that fired.
pub fn generate<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
) -> Option<EventChoice> {
    if live.ball.state != BallEvent::Play {
        return None;
    }
    if !ctx.rng.random_bool(ctx.rules.event_chance.clamp(0.0, 1.0)) {
        return None;
    }
    let diff = live.strength(Side::Home) - live.strength(Side::Away);
    let choice = draw(&weights(diff), ctx.rng);
    debug!(match_id = %live.id(), minute = live.info.minute, event = ?choice, "Event fired");

    match choice {
        EventChoice::Goal => {
            goal_attempt(live, ctx);
        }
        EventChoice::Card => card(live, ctx),
        EventChoice::Corner => {
            let side = attacking_side(live, ctx.rng);
            corner(live, ctx, side);
        }
        EventChoice::Foul => foul(live, ctx),
        EventChoice::Commentary => commentary::flavour(live, ctx),
    }
    Some(choice)
}

/// Side currently attacking: the side on the ball, or the side that
/// touched it last, or a draw weighted by team strength.
pub fn attacking_side<R: Rng + ?Sized>(live: &LiveMatch, rng: &mut R) -> Side {
    if let Some(side) = crate::ball::last_toucher_side(live) {
        return side;
    }
    stronger_biased(live, rng)
}

fn stronger_biased<R: Rng + ?Sized>(live: &LiveMatch, rng: &mut R) -> Side {
    let home = live.strength(Side::Home).max(0.01);
    let away = live.strength(Side::Away).max(0.01);
    if rng.random_bool((home / (home + away)).clamp(0.0, 1.0)) {
        Side::Home
    } else {
        Side::Away
    }
}

fn name_of<R: Rng + ?Sized>(ctx: &TickContext<'_, R>, player: PlayerId) -> String {
    ctx.players
        .get(&player)
        .map_or_else(|| String::from("Unknown"), |p| p.name.clone())
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

/// How a goal was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalKind {
    /// From open play.
    OpenPlay,
    /// From the penalty spot.
    Penalty,
}

/// Outcome of a goal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// The player scored.
    Scored(PlayerId),
    /// The player shot and missed.
    Missed(PlayerId),
    /// Nobody was in a position to shoot.
    NoChance,
}

const fn role_multiplier(role: Position) -> f64 {
    match role {
        Position::Striker => 0.9,
        Position::LeftWinger | Position::RightWinger | Position::AttackingMidfielder => 0.7,
        Position::CentralMidfielder => 0.45,
        Position::DefensiveMidfielder => 0.3,
        Position::Goalkeeper => 0.0,
        Position::CentreBack | Position::LeftBack | Position::RightBack => 0.2,
    }
}

/// Chance that a shot from `at` by a player in `role` goes in.
pub fn shot_chance(role: Position, side: Side, at: Point) -> f64 {
    let distance = at.distance(goal_mouth(side));
    let proximity = (1.0 - distance / SHOOTING_RANGE).clamp(0.05, 1.0);
    let depth_left = (PITCH_LENGTH - depth_of(side, at.x)).max(1.0);
    let angle = (at.y - CENTRE_Y).abs().atan2(depth_left);
    let central = 1.0 - angle / PI;
    (role_multiplier(role) * proximity * central).clamp(0.0, MAX_SHOT_CHANCE)
}

/// Resolve a goal event.
pub fn goal_attempt<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
) -> Attempt {
    let side = attacking_side(live, ctx.rng);

    let shooter = live.ball.possessor.filter(|&p| {
        live.is_available(p)
            && live.info.side_of(p) == Some(side)
            && live.location(p).is_some_and(|at| in_attacking_third(side, at.x))
            && ctx
                .players
                .get(&p)
                .is_some_and(|pl| !pl.position.is_goalkeeper())
    });

    if let Some(shooter) = shooter {
        let at = live.location(shooter).unwrap_or_else(|| live.ball_point());
        let role = ctx.players.get(&shooter).map_or(Position::Striker, |p| p.position);
        let chance = shot_chance(role, side, at);
        let stats = live.stats.side_mut(side);
        stats.shots = stats.shots.saturating_add(1);

        if ctx.rng.random_bool(chance) {
            let stats = live.stats.side_mut(side);
            stats.shots_on_target = stats.shots_on_target.saturating_add(1);
            let assist = live.ball.last_touch;
            score_goal(live, ctx, side, shooter, assist, GoalKind::OpenPlay);
            return Attempt::Scored(shooter);
        }
        missed(live, ctx, side, shooter);
        return Attempt::Missed(shooter);
    }

    let goal = goal_mouth(side);
    let finisher = live
        .on_pitch(side)
        .into_iter()
        .filter(|p| {
            ctx.players
                .get(p)
                .is_some_and(|pl| !pl.position.is_goalkeeper())
        })
        .filter_map(|p| live.location(p).map(|at| (p, at.distance(goal))))
        .filter(|&(_, d)| d <= FALLBACK_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(p, _)| p);

    let Some(scorer) = finisher else {
        return Attempt::NoChance;
    };
    let stats = live.stats.side_mut(side);
    stats.shots = stats.shots.saturating_add(1);
    stats.shots_on_target = stats.shots_on_target.saturating_add(1);
    let assist = live
        .ball
        .possessor
        .filter(|&p| p != scorer)
        .or(live.ball.last_touch);
    score_goal(live, ctx, side, scorer, assist, GoalKind::OpenPlay);
    Attempt::Scored(scorer)
}

fn missed<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    side: Side,
    shooter: PlayerId,
) {
    let defending = side.opponent();
    let keeper = live.on_pitch(defending).into_iter().find(|p| {
        ctx.players
            .get(p)
            .is_some_and(|pl| pl.position.is_goalkeeper())
    });
    let name = name_of(ctx, shooter);

    let text = match keeper {
        Some(keeper) if ctx.rng.random_bool(0.5) => {
            let stats = live.stats.side_mut(side);
            stats.shots_on_target = stats.shots_on_target.saturating_add(1);
            touch(live, keeper);
            if let Some(at) = live.location(keeper) {
                live.ball.x = at.x;
                live.ball.y = at.y;
            }
            format!("{name} forces a save from {}", name_of(ctx, keeper))
        }
        _ => {
            touch(live, shooter);
            let spot = goal_kick_spot(defending);
            set_restart(live, BallEvent::GoalKick, defending, spot, ctx.now);
            format!("{name} fires wide of the post")
        }
    };
    commentary::push(live, ctx, EventKind::Chance, text, Some(shooter));
}

/// Credit a goal to `side`.
///
/// The assist counts only when it comes from a team-mate of the scorer.
/// Play restarts with the conceding side kicking off.
pub fn score_goal<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    side: Side,
    scorer: PlayerId,
    assist: Option<PlayerId>,
    kind: GoalKind,
) {
    let score = live.info.score_mut(side);
    *score = score.saturating_add(1);

    if let Some(player) = ctx.players.get_mut(&scorer) {
        player.season.goals = player.season.goals.saturating_add(1);
    }
    ratings::adjust(ctx.players.get_mut(&scorer), GOAL_BONUS);

    let assist = assist
        .filter(|&a| a != scorer)
        .filter(|&a| live.stints.get(&a).is_some_and(|s| s.side == side));
    if let Some(assister) = assist {
        if let Some(player) = ctx.players.get_mut(&assister) {
            player.season.assists = player.season.assists.saturating_add(1);
        }
        ratings::adjust(ctx.players.get_mut(&assister), ASSIST_BONUS);
    }

    let minute = live.info.minute;
    momentum::apply(&mut live.momentum, Swing::Goal, side, minute, ctx.now);
    probability::refresh(live, ctx.now);

    let conceding = side.opponent();
    set_restart(live, BallEvent::Kickoff, conceding, Point::centre(), ctx.now);

    let name = name_of(ctx, scorer);
    let team = live.info.team(side).name.clone();
    let how = match kind {
        GoalKind::OpenPlay => format!("GOAL! {name} scores for {team}!"),
        GoalKind::Penalty => format!("GOAL! {name} converts the penalty for {team}!"),
    };
    let assisted = assist.map_or_else(String::new, |a| {
        format!(" Assisted by {}.", name_of(ctx, a))
    });
    let m = &live.info;
    let text = format!(
        "{how}{assisted} {home} {h} - {a} {away}",
        home = m.home_team.short_name,
        h = m.home_score,
        a = m.away_score,
        away = m.away_team.short_name,
    );
    info!(
        match_id = %live.id(),
        minute,
        side = ?side,
        scorer = %name,
        home_score = live.info.home_score,
        away_score = live.info.away_score,
        "Goal scored"
    );
    commentary::push(live, ctx, EventKind::Goal, text, Some(scorer));
}

// ---------------------------------------------------------------------------
// Cards and fouls
// ---------------------------------------------------------------------------

/// Book a player. A red card sends them off.
pub fn book<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    player: PlayerId,
    side: Side,
    color: CardColor,
    reason: &str,
) {
    let stats = live.stats.side_mut(side);
    match color {
        CardColor::Yellow => stats.yellow_cards = stats.yellow_cards.saturating_add(1),
        CardColor::Red => stats.red_cards = stats.red_cards.saturating_add(1),
    }
    if let Some(p) = ctx.players.get_mut(&player) {
        match color {
            CardColor::Yellow => p.season.yellow_cards = p.season.yellow_cards.saturating_add(1),
            CardColor::Red => p.season.red_cards = p.season.red_cards.saturating_add(1),
        }
    }
    let penalty = match color {
        CardColor::Yellow => YELLOW_PENALTY,
        CardColor::Red => RED_PENALTY,
    };
    ratings::adjust(ctx.players.get_mut(&player), -penalty);

    let name = name_of(ctx, player);
    let text = match color {
        CardColor::Yellow => format!("Yellow card shown to {name}"),
        CardColor::Red => format!("Red card shown to {name}"),
    };
    commentary::push(live, ctx, EventKind::Card, text, Some(player));

    if color == CardColor::Red {
        availability::send_off(live, player, reason);
        let minute = live.info.minute;
        momentum::apply(&mut live.momentum, Swing::RedCard, side, minute, ctx.now);
        probability::refresh(live, ctx.now);
        info!(
            match_id = %live.id(),
            minute,
            side = ?side,
            player = %name,
            reason,
            "Player sent off"
        );
    }
}

fn count_foul<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    player: PlayerId,
    side: Side,
) {
    let stats = live.stats.side_mut(side);
    stats.fouls = stats.fouls.saturating_add(1);
    if let Some(p) = ctx.players.get_mut(&player) {
        p.season.fouls = p.season.fouls.saturating_add(1);
    }
}

/// A booking for a player picked from everyone still on the pitch.
fn card<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    let diff = live.strength(Side::Home) - live.strength(Side::Away);
    let first = offending_side(diff, ctx.rng);
    let Some((side, player)) = [first, first.opponent()].into_iter().find_map(|side| {
        live.on_pitch(side).choose(ctx.rng).map(|&player| (side, player))
    }) else {
        return;
    };
    let spot = live.location(player).unwrap_or_else(|| live.ball_point());
    count_foul(live, ctx, player, side);

    let color = if ctx.rng.random_bool(ctx.rules.red_card_share.clamp(0.0, 1.0)) {
        CardColor::Red
    } else {
        CardColor::Yellow
    };
    book(live, ctx, player, side, color, "Serious foul play");
    set_restart(live, BallEvent::FreeKick, side.opponent(), spot, ctx.now);
}

/// A corner for `side`.
pub fn corner<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>, side: Side) {
    let stats = live.stats.side_mut(side);
    stats.corners = stats.corners.saturating_add(1);
    let minute = live.info.minute;
    momentum::apply(&mut live.momentum, Swing::Corner, side, minute, ctx.now);

    let flag = corner_flag(side, live.ball.y);
    set_restart(live, BallEvent::Corner, side, flag, ctx.now);
    let team = live.info.team(side).name.clone();
    let text = format!("Corner kick for {team}");
    commentary::push(live, ctx, EventKind::Corner, text, None);
}

/// What made a foul worse than ordinary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoulContext {
    /// Committed inside the fouling side's own penalty area.
    pub in_own_area: bool,
    /// A goalkeeper handling outside their area.
    pub keeper_handling: bool,
    /// Committed by the last defender in their own half.
    pub last_defender: bool,
    /// A challenge at high speed.
    pub high_speed: bool,
}

impl FoulContext {
    /// Red-card chance for a foul in this context, capped at 0.9.
    pub fn red_chance(self) -> f64 {
        let mut chance = BASE_RED_CHANCE;
        if self.in_own_area {
            chance += 0.08;
        }
        if self.keeper_handling {
            chance += 0.5;
        }
        if self.last_defender {
            chance += 0.25;
        }
        if self.high_speed {
            chance += 0.1;
        }
        chance.min(0.9)
    }
}

fn foul_context<R: Rng + ?Sized>(
    live: &LiveMatch,
    ctx: &TickContext<'_, R>,
    fouler: PlayerId,
    side: Side,
    at: Point,
) -> FoulContext {
    let Some(player) = ctx.players.get(&fouler) else {
        return FoulContext::default();
    };
    let in_own_area = in_penalty_area(side, at);
    let keeper_handling = player.position.is_goalkeeper() && !in_own_area;
    let depth = |p: PlayerId| live.location(p).map_or(PITCH_LENGTH, |l| depth_of(side, l.x));
    let own_depth = depth(fouler);
    let last_defender = player.position.group() == PositionGroup::Defender
        && in_own_half(side, at.x)
        && live
            .on_pitch(side)
            .into_iter()
            .filter(|&p| p != fouler)
            .filter(|p| {
                ctx.players
                    .get(p)
                    .is_some_and(|pl| !pl.position.is_goalkeeper())
            })
            .all(|p| depth(p) > own_depth);
    FoulContext {
        in_own_area,
        keeper_handling,
        last_defender,
        high_speed: player.characteristics.speed >= HIGH_SPEED,
    }
}

/// A foul by the side out of possession on the player on the ball.
fn foul<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    let diff = live.strength(Side::Home) - live.strength(Side::Away);
    let fouling = offending_side(diff, ctx.rng);
    commit_foul(live, ctx, fouling);
}

/// The `fouling` side's player nearest the ball fouls the opposing
/// possessor, if any.
fn commit_foul<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    fouling: Side,
) {
    let fouled_side = fouling.opponent();
    let ball = live.ball_point();

    let Some(fouler) = live
        .on_pitch(fouling)
        .into_iter()
        .filter_map(|p| live.location(p).map(|at| (p, at.distance(ball))))
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(p, _)| p)
    else {
        return;
    };
    let victim = live
        .ball
        .possessor
        .filter(|&p| live.info.side_of(p) == Some(fouled_side));
    let at = victim.and_then(|p| live.location(p)).unwrap_or(ball);
    let context = foul_context(live, ctx, fouler, fouling, at);

    count_foul(live, ctx, fouler, fouling);
    let minute = live.info.minute;
    momentum::apply(&mut live.momentum, Swing::Foul, fouling, minute, ctx.now);

    let name = name_of(ctx, fouler);
    let text = match victim {
        Some(v) => format!("Foul committed by {name} on {}", name_of(ctx, v)),
        None => format!("Foul committed by {name}"),
    };
    commentary::push(live, ctx, EventKind::Foul, text, Some(fouler));

    if ctx.rng.random_bool(context.red_chance()) {
        let reason = "Denied a goalscoring opportunity";
        book(live, ctx, fouler, fouling, CardColor::Red, reason);
    } else if ctx.rng.random_bool(FOUL_YELLOW_CHANCE) {
        let reason = "Reckless challenge";
        book(live, ctx, fouler, fouling, CardColor::Yellow, reason);
    }

    if context.high_speed && ctx.rng.random_bool(INJURY_CHANCE) {
        if let Some(v) = victim {
            availability::injure(live, ctx, v, "Injured in a heavy challenge");
        }
    }

    if context.in_own_area {
        let spot = penalty_spot(fouled_side);
        set_restart(live, BallEvent::Penalty, fouled_side, spot, ctx.now);
        let team = live.info.team(fouled_side).name.clone();
        let text = format!("Penalty to {team}!");
        commentary::push(live, ctx, EventKind::Penalty, text, victim);
        info!(match_id = %live.id(), minute, side = ?fouled_side, "Penalty awarded");
    } else {
        set_restart(live, BallEvent::FreeKick, fouled_side, at, ctx.now);
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use matchday_types::AvailabilityStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::testing::Harness;

    fn in_play(h: &mut Harness) -> LiveMatch {
        let mut live = h.kick_off();
        live.ball.state = BallEvent::Play;
        live.ball.restart_side = None;
        live
    }

    #[test]
    fn weights_are_normalized_and_bend_with_the_gap() {
        let even = weights(0.0);
        let lopsided = weights(0.4);
        for w in [even, lopsided] {
            let total: f64 = w.iter().map(|(_, p)| p).sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
        assert!((even[0].1 - 0.15).abs() < 1e-12);
        assert!(lopsided[0].1 > even[0].1);
        assert!(lopsided[2].1 < even[2].1);

        // The goal weight follows the size of the gap, cards and fouls its sign.
        let home_weaker = weights(-0.4);
        assert!((home_weaker[0].1 - lopsided[0].1).abs() < 1e-12);
        assert!((weights(0.3)[1].1 - weights(-0.3)[1].1).abs() > 1e-6);
        assert!(home_weaker[1].1 > lopsided[1].1);
        assert!(home_weaker[3].1 > lopsided[3].1);
        assert!((lopsided[1].1 / lopsided[3].1 - even[1].1 / even[3].1).abs() < 1e-12);
    }

    #[test]
    fn weaker_side_commits_more_offences() {
        let mut rng = StdRng::seed_from_u64(11);
        let draws = 4000;
        let home_weaker = (0..draws)
            .filter(|_| offending_side(-0.4, &mut rng) == Side::Home)
            .count();
        let away_weaker = (0..draws)
            .filter(|_| offending_side(0.4, &mut rng) == Side::Home)
            .count();
        let even = (0..draws)
            .filter(|_| offending_side(0.0, &mut rng) == Side::Home)
            .count();
        assert!(home_weaker > draws * 3 / 4);
        assert!(away_weaker < draws / 4);
        assert!(even > draws * 2 / 5 && even < draws * 3 / 5);
    }

    #[test]
    fn draw_covers_every_event() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = weights(0.1);
        let mut seen = Vec::new();
        for _ in 0..2000 {
            let c = draw(&w, &mut rng);
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn shot_chance_rewards_central_close_strikers() {
        let close = shot_chance(Position::Striker, Side::Home, Point::new(92.0, CENTRE_Y));
        let far = shot_chance(Position::Striker, Side::Home, Point::new(70.0, CENTRE_Y));
        let wide = shot_chance(Position::Striker, Side::Home, Point::new(92.0, 5.0));
        let back = shot_chance(Position::CentreBack, Side::Home, Point::new(92.0, CENTRE_Y));
        assert!(close > far);
        assert!(close > wide);
        assert!(close > back);
        let keeper = shot_chance(Position::Goalkeeper, Side::Home, Point::new(95.0, 32.0));
        assert!(keeper < 1e-12);
        let away = shot_chance(Position::Striker, Side::Away, Point::new(8.0, CENTRE_Y));
        assert!((away - close).abs() < 1e-12);
    }

    #[test]
    fn goal_increments_exactly_one_score() {
        let mut h = Harness::new(61);
        let mut live = in_play(&mut h);
        let scorer = live.info.away_lineup[10];
        let mate = live.info.away_lineup[8];
        let goals_before = h.players[&scorer].season.goals;

        let open_play = GoalKind::OpenPlay;
        score_goal(&mut live, &mut h.context(), Side::Away, scorer, Some(mate), open_play);

        assert_eq!(live.info.away_score, 1);
        assert_eq!(live.info.home_score, 0);
        assert_eq!(h.players[&scorer].season.goals, goals_before + 1);
        assert_eq!(h.players[&mate].season.assists, 1);
        assert_eq!(live.ball.state, BallEvent::Kickoff);
        assert_eq!(live.ball.restart_side, Some(Side::Home));
        assert!(live.momentum.away > 0.0);
        let entry = live.commentary.front().unwrap();
        assert_eq!(entry.kind, EventKind::Goal);
        assert!(entry.audio_text.starts_with("GOOOOOAAAL!"));
    }

    #[test]
    fn opponent_never_gets_the_assist() {
        let mut h = Harness::new(62);
        let mut live = in_play(&mut h);
        let scorer = live.info.home_lineup[9];
        let opponent = live.info.away_lineup[3];
        let open_play = GoalKind::OpenPlay;
        let mut ctx = h.context();
        score_goal(&mut live, &mut ctx, Side::Home, scorer, Some(opponent), open_play);
        score_goal(&mut live, &mut ctx, Side::Home, scorer, Some(scorer), open_play);
        drop(ctx);
        assert_eq!(h.players[&opponent].season.assists, 0);
        assert_eq!(h.players[&scorer].season.assists, 0);
        assert_eq!(live.info.home_score, 2);
    }

    #[test]
    fn possessor_in_the_box_can_score() {
        let mut h = Harness::new(63);
        let mut live = in_play(&mut h);
        let striker = live.info.home_lineup[9];
        let mut outcomes = Vec::new();
        for _ in 0..40 {
            live.ball.state = BallEvent::Play;
            live.ball.possessor = Some(striker);
            let at = live.locations.get_mut(&striker).unwrap();
            at.x = 95.0;
            at.y = CENTRE_Y;
            outcomes.push(goal_attempt(&mut live, &mut h.context()));
        }
        assert!(outcomes.iter().all(|o| match o {
            Attempt::Scored(p) | Attempt::Missed(p) => *p == striker,
            Attempt::NoChance => false,
        }));
        let scored = outcomes
            .iter()
            .filter(|o| matches!(o, Attempt::Scored(_)))
            .count();
        assert_eq!(usize::try_from(live.info.home_score).unwrap(), scored);
        assert!(scored > 0);
        assert_eq!(live.info.away_score, 0);
    }

    #[test]
    fn no_attacker_near_goal_means_no_goal() {
        let mut h = Harness::new(64);
        let mut live = in_play(&mut h);
        live.ball.possessor = Some(live.info.home_lineup[2]);
        for loc in live.locations.values_mut() {
            loc.x = 30.0;
        }
        let outcome = goal_attempt(&mut live, &mut h.context());
        assert_eq!(outcome, Attempt::NoChance);
        assert_eq!(live.info.total_goals(), 0);
    }

    #[test]
    fn red_card_removes_player_from_every_pool() {
        let mut h = Harness::new(65);
        h.rules.red_card_share = 1.0;
        let mut live = in_play(&mut h);
        card(&mut live, &mut h.context());

        let out = availability::unavailable(&live);
        assert_eq!(out.len(), 1);
        let sent_off = out[0].player_id;
        assert_eq!(out[0].status, AvailabilityStatus::RedCard);
        assert!(!out[0].reason.is_empty());
        assert_eq!(live.ball.state, BallEvent::FreeKick);
        assert_eq!(live.stats.home.red_cards + live.stats.away.red_cards, 1);
        assert!(live.momentum.last_red_card.is_some());

        h.rules.red_card_share = 0.0;
        for _ in 0..200 {
            live.ball.state = BallEvent::Play;
            card(&mut live, &mut h.context());
            let latest = live.commentary.front().unwrap();
            assert_ne!(latest.player_id, Some(sent_off));
        }
        assert!(!live.on_pitch(Side::Home).contains(&sent_off));
        assert!(!live.on_pitch(Side::Away).contains(&sent_off));
    }

    #[test]
    fn foul_in_own_box_gives_a_penalty() {
        let mut h = Harness::new(66);
        let mut live = in_play(&mut h);
        let attacker = live.info.home_lineup[9];
        live.ball.possessor = Some(attacker);
        let at = live.locations.get_mut(&attacker).unwrap();
        at.x = 92.0;
        at.y = CENTRE_Y;
        live.ball.x = 92.0;
        live.ball.y = CENTRE_Y;

        commit_foul(&mut live, &mut h.context(), Side::Away);

        assert_eq!(live.stats.away.fouls, 1);
        assert_eq!(live.ball.state, BallEvent::Penalty);
        assert_eq!(live.ball.restart_side, Some(Side::Home));
        assert!(live.commentary.iter().any(|c| c.kind == EventKind::Penalty));
    }

    #[test]
    fn red_chance_grows_with_context() {
        let plain = FoulContext::default().red_chance();
        let keeper = FoulContext {
            keeper_handling: true,
            ..FoulContext::default()
        };
        let everything = FoulContext {
            in_own_area: true,
            keeper_handling: true,
            last_defender: true,
            high_speed: true,
        };
        assert!((plain - BASE_RED_CHANCE).abs() < 1e-12);
        assert!(keeper.red_chance() > plain);
        assert!((everything.red_chance() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn corner_goes_to_the_given_side() {
        let mut h = Harness::new(67);
        let mut live = in_play(&mut h);
        corner(&mut live, &mut h.context(), Side::Away);
        assert_eq!(live.stats.away.corners, 1);
        assert_eq!(live.ball.state, BallEvent::Corner);
        assert!(live.ball.x.abs() < f64::EPSILON);
        assert!(live.momentum.away > 0.0);
    }

    #[test]
    fn nothing_fires_during_a_dead_ball() {
        let mut h = Harness::new(68);
        h.rules.event_chance = 1.0;
        let mut live = h.kick_off();
        assert_eq!(generate(&mut live, &mut h.context()), None);
        live.ball.state = BallEvent::Play;
        assert!(generate(&mut live, &mut h.context()).is_some());
    }
}
