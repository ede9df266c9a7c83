//! The ball.
//!
//! In open play the ball either sits at a possessor's feet or travels with
//! friction until someone claims it. Leaving the pitch over a byline gives
//! a corner or goal kick depending on who touched it last; over a
//! touchline, a throw-in to the other side. Every restart holds the ball
//! dead for the configured pause and is then taken by its designated
//! taker.

use chrono::{DateTime, Utc};
use matchday_types::{BallEvent, EventKind, PlayerId, Side};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::commentary;
use crate::events::{self, GoalKind};
use crate::live::{LiveMatch, TickContext};
use crate::pitch::{
    CENTRE_Y, PITCH_LENGTH, PITCH_WIDTH, Point, corner_flag, depth_to_x, goal_kick_spot,
    goal_mouth,
};
use crate::positioning::restart_taker;

/// Share of speed kept from one tick to the next.
pub const FRICTION: f64 = 0.6;

/// Distance within which a player can claim a loose ball.
pub const CLAIM_RADIUS: f64 = 4.0;

/// Below this speed the nearest player runs onto the ball.
const REST_SPEED: f64 = 0.5;

/// How far the player on the ball carries it each tick.
const DRIBBLE: f64 = 3.0;

/// Distance within which an opponent can try a tackle.
const TACKLE_RADIUS: f64 = 2.5;

/// Chance a close opponent wins the ball.
const TACKLE_CHANCE: f64 = 0.2;

/// Launch speed of a goal kick.
const GOAL_KICK_SPEED: f64 = 18.0;

/// Depth a goal kick is aimed at, from the kicker's own goal line.
const GOAL_KICK_TARGET_DEPTH: f64 = 60.0;

/// Put the ball dead for a restart.
pub fn set_restart(
    live: &mut LiveMatch,
    state: BallEvent,
    side: Side,
    at: Point,
    now: DateTime<Utc>,
) {
    let at = at.clamped();
    let ball = &mut live.ball;
    if let Some(holder) = ball.possessor.take() {
        ball.last_touch = Some(holder);
    }
    ball.state = state;
    ball.restart_side = Some(side);
    ball.state_since = now;
    ball.x = at.x;
    ball.y = at.y;
    ball.speed = 0.0;
    ball.direction = 0.0;
    ball.last_update = now;
}

/// Give the ball to a player. The previous holder becomes the last toucher.
pub fn touch(live: &mut LiveMatch, player: PlayerId) {
    let ball = &mut live.ball;
    if let Some(previous) = ball.possessor {
        if previous != player {
            ball.last_touch = Some(previous);
        }
    }
    ball.possessor = Some(player);
    ball.speed = 0.0;
}

/// Side of whoever touched the ball last.
pub fn last_toucher_side(live: &LiveMatch) -> Option<Side> {
    let player = live.ball.possessor.or(live.ball.last_touch)?;
    live.info
        .side_of(player)
        .or_else(|| live.stints.get(&player).map(|s| s.side))
}

// ---------------------------------------------------------------------------
// Restarts
// ---------------------------------------------------------------------------

/// Take the current restart once the pause has elapsed.
///
/// Returns `true` when the ball went back into play.
pub fn resolve_restart<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
) -> bool {
    if !live.ball.state.is_set_piece() {
        return false;
    }
    if ctx.now.signed_duration_since(live.ball.state_since) < ctx.rules.set_piece_pause() {
        return false;
    }
    let state = live.ball.state;
    let side = live.ball.restart_side.unwrap_or(Side::Home);
    let taker = restart_taker(live, ctx.players);

    live.ball.state = BallEvent::Play;
    live.ball.restart_side = None;
    live.ball.state_since = ctx.now;
    live.ball.last_update = ctx.now;

    let Some(taker) = taker else {
        return true;
    };
    if let Some(spot) = live.location(taker) {
        live.ball.x = spot.x;
        live.ball.y = spot.y;
    }

    match state {
        BallEvent::Penalty => take_penalty(live, ctx, side, taker),
        BallEvent::GoalKick => {
            live.ball.possessor = None;
            live.ball.last_touch = Some(taker);
            let target = Point::new(
                depth_to_x(side, GOAL_KICK_TARGET_DEPTH),
                CENTRE_Y + ctx.rng.random_range(-15.0..=15.0),
            );
            live.ball.direction = live.ball_point().angle_to(target);
            live.ball.speed = GOAL_KICK_SPEED;
        }
        BallEvent::Play
        | BallEvent::Kickoff
        | BallEvent::FreeKick
        | BallEvent::Corner
        | BallEvent::ThrowIn => {
            live.ball.possessor = None;
            touch(live, taker);
        }
    }
    debug!(match_id = %live.id(), restart = ?state, taker = %taker, "Restart taken");
    true
}

fn take_penalty<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    side: Side,
    taker: PlayerId,
) {
    touch(live, taker);
    let stats = live.stats.side_mut(side);
    stats.shots = stats.shots.saturating_add(1);

    if ctx.rng.random_bool(ctx.rules.penalty_conversion.clamp(0.0, 1.0)) {
        let stats = live.stats.side_mut(side);
        stats.shots_on_target = stats.shots_on_target.saturating_add(1);
        events::score_goal(live, ctx, side, taker, None, GoalKind::Penalty);
    } else {
        let name = player_name(ctx, taker);
        commentary::push(
            live,
            ctx,
            EventKind::Chance,
            format!("Penalty missed! {name} can't beat the keeper"),
            Some(taker),
        );
        let defending = side.opponent();
        let keeper = live
            .on_pitch(defending)
            .into_iter()
            .find(|p| ctx.players.get(p).is_some_and(|pl| pl.position.is_goalkeeper()));
        match keeper {
            Some(keeper) => {
                touch(live, keeper);
                if let Some(spot) = live.location(keeper) {
                    live.ball.x = spot.x;
                    live.ball.y = spot.y;
                }
            }
            None => {
                let spot = goal_kick_spot(defending);
                set_restart(live, BallEvent::GoalKick, defending, spot, ctx.now);
            }
        }
    }
}

fn player_name<R: Rng + ?Sized>(ctx: &TickContext<'_, R>, player: PlayerId) -> String {
    ctx.players
        .get(&player)
        .map_or_else(|| String::from("The taker"), |p| p.name.clone())
}

// ---------------------------------------------------------------------------
// Open play
// ---------------------------------------------------------------------------

/// Move the ball for one open-play tick.
pub fn advance<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    if live.ball.state != BallEvent::Play {
        return;
    }
    match live.ball.possessor {
        Some(holder) if live.is_available(holder) => carry(live, ctx, holder),
        _ => {
            live.ball.possessor = None;
            fly(live, ctx);
        }
    }
    live.ball.last_update = ctx.now;
}

fn carry<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>, holder: PlayerId) {
    let Some(side) = live.info.side_of(holder) else {
        return;
    };
    let start = live.location(holder).unwrap_or_else(|| live.ball_point());

    if ctx.rng.random_bool(ctx.rules.pass_chance.clamp(0.0, 1.0)) {
        let mates: Vec<PlayerId> = live
            .on_pitch(side)
            .into_iter()
            .filter(|&p| p != holder)
            .collect();
        if let Some(&mate) = mates.choose(ctx.rng) {
            let target = live.location(mate).unwrap_or(start);
            live.ball.direction = start.angle_to(target);
            live.ball.speed = start.distance(target) * (1.0 - FRICTION);
            live.ball.possessor = None;
            live.ball.last_touch = Some(holder);
            live.ball.x = start.x;
            live.ball.y = start.y;
            return;
        }
    }

    let challenger = live
        .on_pitch(side.opponent())
        .into_iter()
        .filter_map(|p| live.location(p).map(|l| (p, l.distance(start))))
        .filter(|&(_, d)| d <= TACKLE_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((tackler, _)) = challenger {
        if ctx.rng.random_bool(TACKLE_CHANCE) {
            touch(live, tackler);
            if let Some(spot) = live.location(tackler) {
                live.ball.x = spot.x;
                live.ball.y = spot.y;
            }
            return;
        }
    }

    let goal = goal_mouth(side);
    let heading = start.angle_to(goal) + ctx.rng.random_range(-0.6..=0.6);
    let next = Point::new(
        heading.cos().mul_add(DRIBBLE, start.x),
        heading.sin().mul_add(DRIBBLE, start.y),
    )
    .clamped();
    if let Some(loc) = live.locations.get_mut(&holder) {
        loc.x = next.x;
        loc.y = next.y;
        loc.timestamp = ctx.now;
    }
    live.ball.x = (next.x + ctx.rng.random_range(-0.5..=0.5)).clamp(0.0, PITCH_LENGTH);
    live.ball.y = (next.y + ctx.rng.random_range(-0.5..=0.5)).clamp(0.0, PITCH_WIDTH);
    live.ball.direction = heading;
    live.ball.speed = DRIBBLE;
}

fn fly<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    let from = live.ball_point();
    let to = Point::new(
        live.ball.direction.cos().mul_add(live.ball.speed, from.x),
        live.ball.direction.sin().mul_add(live.ball.speed, from.y),
    );
    live.ball.speed *= FRICTION;

    if !to.in_bounds() {
        out_of_play(live, ctx, to);
        return;
    }
    live.ball.x = to.x;
    live.ball.y = to.y;

    let slow = live.ball.speed < REST_SPEED;
    let nearest = Side::BOTH
        .into_iter()
        .flat_map(|side| live.on_pitch(side))
        .filter_map(|p| live.location(p).map(|l| (p, l.distance(to))))
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    if let Some((player, distance)) = nearest {
        if distance <= CLAIM_RADIUS || slow {
            touch(live, player);
            if let Some(loc) = live.locations.get_mut(&player) {
                loc.x = to.x;
                loc.y = to.y;
                loc.timestamp = ctx.now;
            }
        }
    }
}

/// Classify a ball that left the pitch at `exit`.
fn out_of_play<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    exit: Point,
) {
    let toucher = last_toucher_side(live).unwrap_or_else(|| {
        if ctx.rng.random_bool(0.5) {
            Side::Home
        } else {
            Side::Away
        }
    });
    let over_byline = exit.x < 0.0 || exit.x > PITCH_LENGTH;

    if over_byline {
        let attacking = if exit.x > PITCH_LENGTH {
            Side::Home
        } else {
            Side::Away
        };
        let defending = attacking.opponent();
        if toucher == defending {
            let stats = live.stats.side_mut(attacking);
            stats.corners = stats.corners.saturating_add(1);
            let flag = corner_flag(attacking, exit.y);
            set_restart(live, BallEvent::Corner, attacking, flag, ctx.now);
            let team = live.info.team(attacking).name.clone();
            let text = format!("Corner kick for {team}");
            commentary::push(live, ctx, EventKind::Corner, text, None);
        } else {
            let spot = goal_kick_spot(defending);
            set_restart(live, BallEvent::GoalKick, defending, spot, ctx.now);
        }
    } else {
        let side = toucher.opponent();
        let line = if exit.y < 0.0 { 0.0 } else { PITCH_WIDTH };
        set_restart(live, BallEvent::ThrowIn, side, Point::new(exit.x, line), ctx.now);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    fn in_play(h: &mut Harness) -> LiveMatch {
        let mut live = h.kick_off();
        live.ball.state = BallEvent::Play;
        live.ball.restart_side = None;
        live
    }

    #[test]
    fn touch_tracks_previous_holder() {
        let mut h = Harness::new(51);
        let mut live = in_play(&mut h);
        let a = live.info.home_lineup[6];
        let b = live.info.away_lineup[6];
        touch(&mut live, a);
        touch(&mut live, a);
        assert_eq!(live.ball.last_touch, None);
        touch(&mut live, b);
        assert_eq!(live.ball.possessor, Some(b));
        assert_eq!(live.ball.last_touch, Some(a));
        assert_eq!(last_toucher_side(&live), Some(Side::Away));
    }

    #[test]
    fn defender_clearing_over_own_byline_gives_corner() {
        let mut h = Harness::new(52);
        let mut live = in_play(&mut h);
        let defender = live.info.away_lineup[2];
        live.ball.last_touch = Some(defender);
        live.ball.x = 98.0;
        live.ball.y = 20.0;
        live.ball.direction = 0.0;
        live.ball.speed = 10.0;
        advance(&mut live, &mut h.context());
        assert_eq!(live.ball.state, BallEvent::Corner);
        assert_eq!(live.ball.restart_side, Some(Side::Home));
        assert_eq!(live.stats.home.corners, 1);
        assert!((live.ball.x - PITCH_LENGTH).abs() < f64::EPSILON);
    }

    #[test]
    fn attacker_over_byline_gives_goal_kick() {
        let mut h = Harness::new(53);
        let mut live = in_play(&mut h);
        live.ball.last_touch = Some(live.info.home_lineup[9]);
        live.ball.x = 97.0;
        live.ball.speed = 12.0;
        live.ball.direction = 0.0;
        advance(&mut live, &mut h.context());
        assert_eq!(live.ball.state, BallEvent::GoalKick);
        assert_eq!(live.ball.restart_side, Some(Side::Away));
        assert_eq!(live.stats.home.corners, 0);
    }

    #[test]
    fn touchline_exit_gives_throw_in_to_other_side() {
        let mut h = Harness::new(54);
        let mut live = in_play(&mut h);
        live.ball.last_touch = Some(live.info.home_lineup[7]);
        live.ball.x = 40.0;
        live.ball.y = 62.0;
        live.ball.direction = std::f64::consts::FRAC_PI_2;
        live.ball.speed = 8.0;
        advance(&mut live, &mut h.context());
        assert_eq!(live.ball.state, BallEvent::ThrowIn);
        assert_eq!(live.ball.restart_side, Some(Side::Away));
        assert!((live.ball.y - PITCH_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn restart_waits_for_the_pause() {
        let mut h = Harness::new(55);
        let mut live = h.kick_off();
        h.advance(1);
        assert!(!resolve_restart(&mut live, &mut h.context()));
        assert_eq!(live.ball.state, BallEvent::Kickoff);
        h.advance(3);
        assert!(resolve_restart(&mut live, &mut h.context()));
        assert_eq!(live.ball.state, BallEvent::Play);
        assert_eq!(live.ball.restart_side, None);
        assert_eq!(live.possession_side(), Some(Side::Home));
    }

    #[test]
    fn certain_penalty_is_scored() {
        let mut h = Harness::new(56);
        h.rules.penalty_conversion = 1.0;
        let mut live = h.kick_off();
        let spot = crate::pitch::penalty_spot(Side::Away);
        set_restart(&mut live, BallEvent::Penalty, Side::Away, spot, h.now);
        h.advance(5);
        assert!(resolve_restart(&mut live, &mut h.context()));
        assert_eq!(live.info.away_score, 1);
        assert_eq!(live.ball.state, BallEvent::Kickoff);
        assert_eq!(live.ball.restart_side, Some(Side::Home));
    }

    #[test]
    fn loose_ball_ends_up_with_someone() {
        let mut h = Harness::new(57);
        let mut live = in_play(&mut h);
        live.ball.possessor = None;
        live.ball.x = 50.0;
        live.ball.y = 32.0;
        live.ball.speed = 0.1;
        advance(&mut live, &mut h.context());
        assert!(live.ball.possessor.is_some());
    }
}
