//! The match clock and the per-tick update.
//!
//! One wall-clock second is one match minute. The first half ends when
//! 45 seconds have elapsed; the break lasts a configured number of seconds
//! and the kick-off time is then rebased so that the clock reads 45 at the
//! restart and 46 a second later. The match ends once the clock reaches
//! 90 plus the injury time drawn at kick-off.

use chrono::Duration;
use matchday_types::{BallEvent, EventKind, MatchPeriod, MatchStatus, Side};
use rand::Rng;
use tracing::info;

use crate::live::{LiveMatch, TickContext};
use crate::pitch::Point;
use crate::{availability, ball, commentary, events, positioning, ratings, stats};

/// Minute the first half ends.
pub const HALF_LENGTH: u32 = 45;

/// Minute the second half ends before injury time.
pub const FULL_LENGTH: u32 = 90;

/// Phase change produced by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The match kept its status.
    None,
    /// The first half ended.
    Halftime,
    /// The second half started.
    SecondHalf,
    /// The final whistle blew.
    FullTime,
}

/// Wall-clock seconds since kick-off (or the rebased kick-off).
fn elapsed_minutes<R: Rng + ?Sized>(live: &LiveMatch, ctx: &TickContext<'_, R>) -> u32 {
    let secs = ctx
        .now
        .signed_duration_since(live.info.start_time)
        .num_seconds()
        .max(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Advance one match by one tick.
///
/// Finished and cooling-down matches are left untouched, and during the
/// break only the end of the break is checked, so the minute never moves
/// outside live play.
pub fn advance<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
) -> Transition {
    match live.info.status {
        MatchStatus::Finished | MatchStatus::Cooldown => return Transition::None,
        MatchStatus::Halftime => {
            let over = live
                .info
                .halftime_end_time
                .is_none_or(|end| ctx.now >= end);
            if over {
                start_second_half(live, ctx);
                return Transition::SecondHalf;
            }
            return Transition::None;
        }
        MatchStatus::Live => {}
    }

    let elapsed = elapsed_minutes(live, ctx);
    let full_time = FULL_LENGTH.saturating_add(live.info.injury_time);
    match live.info.period {
        MatchPeriod::FirstHalf if elapsed >= HALF_LENGTH => {
            enter_halftime(live, ctx);
            return Transition::Halftime;
        }
        MatchPeriod::SecondHalf if elapsed >= full_time => {
            finish(live, ctx, full_time);
            return Transition::FullTime;
        }
        MatchPeriod::FirstHalf | MatchPeriod::SecondHalf => {}
    }
    live.info.minute = live.info.minute.max(elapsed.min(full_time));

    play(live, ctx);
    Transition::None
}

/// One tick of live play.
fn play<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    ball::resolve_restart(live, ctx);
    events::generate(live, ctx);
    availability::maybe_tactical_change(live, ctx);
    positioning::refresh_positions(live, ctx);
    ball::advance(live, ctx);
    stats::update(live, ctx.rng, ctx.now);
    live.info.last_update = ctx.now;
}

fn enter_halftime<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    let break_length = ctx.rules.halftime_break();
    let m = &mut live.info;
    m.minute = HALF_LENGTH;
    m.status = MatchStatus::Halftime;
    m.is_in_break = true;
    m.halftime_started_at = Some(ctx.now);
    m.halftime_end_time = Some(ctx.now + break_length);
    m.last_update = ctx.now;

    let text = String::from("Halftime! Teams head to the tunnel");
    commentary::push(live, ctx, EventKind::Halftime, text, None);
    info!(
        match_id = %live.id(),
        home_score = live.info.home_score,
        away_score = live.info.away_score,
        "Halftime"
    );
}

fn start_second_half<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    let m = &mut live.info;
    m.status = MatchStatus::Live;
    m.period = MatchPeriod::SecondHalf;
    m.is_in_break = false;
    m.start_time = ctx.now - Duration::seconds(i64::from(HALF_LENGTH));
    m.last_update = ctx.now;

    ball::set_restart(live, BallEvent::Kickoff, Side::Away, Point::centre(), ctx.now);
    positioning::refresh_positions(live, ctx);

    let text = String::from("Second half underway!");
    commentary::push(live, ctx, EventKind::Kickoff, text, None);
    info!(match_id = %live.id(), "Second half started");
}

fn finish<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>, full_time: u32) {
    let m = &mut live.info;
    m.minute = m.minute.max(full_time);
    m.status = MatchStatus::Finished;
    m.end_time = Some(ctx.now);
    m.last_update = ctx.now;

    ratings::finalize(live, ctx);

    let m = &live.info;
    let text = format!(
        "Full time! {home} {h} - {a} {away}",
        home = m.home_team.name,
        h = m.home_score,
        a = m.away_score,
        away = m.away_team.name,
    );
    commentary::push(live, ctx, EventKind::FullTime, text, None);
    info!(
        match_id = %live.id(),
        home = %live.info.home_team.name,
        away = %live.info.away_team.name,
        home_score = live.info.home_score,
        away_score = live.info.away_score,
        "Full time"
    );
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    fn tick(h: &mut Harness, live: &mut LiveMatch) -> Transition {
        h.advance(1);
        advance(live, &mut h.context())
    }

    #[test]
    fn halftime_at_45_resumes_at_46() {
        let mut h = Harness::new(71);
        let mut live = h.kick_off();
        for _ in 0..44 {
            assert_eq!(tick(&mut h, &mut live), Transition::None);
        }
        assert_eq!(live.info.minute, 44);

        assert_eq!(tick(&mut h, &mut live), Transition::Halftime);
        assert_eq!(live.info.minute, 45);
        assert_eq!(live.info.status, MatchStatus::Halftime);
        assert!(live.info.is_in_break);
        assert_eq!(live.commentary.front().unwrap().kind, EventKind::Halftime);

        for _ in 0..14 {
            assert_eq!(tick(&mut h, &mut live), Transition::None);
            assert_eq!(live.info.minute, 45);
        }
        assert_eq!(tick(&mut h, &mut live), Transition::SecondHalf);
        assert_eq!(live.info.status, MatchStatus::Live);
        assert_eq!(live.info.period, MatchPeriod::SecondHalf);
        assert_eq!(live.info.minute, 45);
        assert_eq!(live.ball.restart_side, Some(Side::Away));

        assert_eq!(tick(&mut h, &mut live), Transition::None);
        assert_eq!(live.info.minute, 46);
        assert_eq!(tick(&mut h, &mut live), Transition::None);
        assert_eq!(live.info.minute, 47);
    }

    #[test]
    fn full_time_after_injury_time() {
        let mut h = Harness::new(72);
        let mut live = h.kick_off();
        live.info.injury_time = 3;
        let mut whistle = None;
        for step in 0..200 {
            if tick(&mut h, &mut live) == Transition::FullTime {
                whistle = Some(step);
                break;
            }
        }
        assert!(whistle.is_some());
        assert_eq!(live.info.status, MatchStatus::Finished);
        assert_eq!(live.info.minute, 93);
        assert!(live.info.end_time.is_some());
        assert!(!live.info.player_ratings.is_empty());
        let last = live.commentary.front().unwrap();
        assert_eq!(last.kind, EventKind::FullTime);
        assert!(last.text.starts_with("Full time!"));

        assert_eq!(tick(&mut h, &mut live), Transition::None);
        assert_eq!(live.info.minute, 93);
    }

    #[test]
    fn whole_matches_keep_every_invariant() {
        for seed in 0..6 {
            let mut h = Harness::new(100 + seed);
            h.rules.event_chance = 0.5;
            let mut live = h.kick_off();
            let mut minute = 0;
            let mut goals = 0;
            loop {
                let transition = tick(&mut h, &mut live);
                assert!(live.info.minute >= minute);
                minute = live.info.minute;

                let p = &live.probabilities;
                assert!((p.home_win + p.draw + p.away_win - 1.0).abs() < 1e-6);
                for v in [p.home_win, p.draw, p.away_win] {
                    assert!((0.0..=1.0).contains(&v));
                }
                assert!((-1.0..=1.0).contains(&live.momentum.home));
                assert!((-1.0..=1.0).contains(&live.momentum.away));
                assert_eq!(live.stats.home.possession + live.stats.away.possession, 100);
                assert!(live.commentary.len() <= h.rules.commentary_cap);
                assert!(live.ball.x >= 0.0 && live.ball.x <= 100.0);
                assert!(live.ball.y >= 0.0 && live.ball.y <= 64.0);

                let total = live.info.total_goals();
                assert!(total == goals || total == goals + 1);
                goals = total;

                if transition == Transition::FullTime {
                    break;
                }
            }
            assert_eq!(live.info.status, MatchStatus::Finished);
            for side in Side::BOTH {
                assert!(live.info.substitutions(side) <= h.rules.max_substitutions);
            }
        }
    }
}
