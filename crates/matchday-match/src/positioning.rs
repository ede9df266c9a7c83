//! Player positioning.
//!
//! Each formation is a template of eleven slots written from the home
//! side's point of view as depth from the own goal line and a `y` across
//! the pitch. Lineups are stored in slot order, so a player's slot is
//! their index in the lineup. Targets are bent by tactic, possession, and
//! a slow flow term, then jittered so the shape never looks frozen.
//!
//! During a dead ball the shape depends on the restart: both teams in
//! their own half for a kick-off, a crowded box for corners and penalties,
//! a cluster around the ball for free kicks and throw-ins.

use matchday_types::{
    BallEvent, Formation, Player, PlayerId, PlayerLocation, Position, PositionGroup, Side, Tactic,
};
use rand::Rng;

use crate::live::{LiveMatch, TickContext};
use crate::pitch::{
    CENTRE_Y, PENALTY_AREA_DEPTH, PITCH_LENGTH, Point, depth_of, depth_to_x, side_y,
};

/// Horizontal jitter applied to every open-play target.
const JITTER_X: f64 = 2.5;

/// Vertical jitter applied to every open-play target.
const JITTER_Y: f64 = 2.0;

/// One position in a formation template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Role the slot asks for.
    pub role: Position,
    /// Depth from the own goal line.
    pub depth: f64,
    /// Position across the pitch.
    pub y: f64,
}

const fn slot(role: Position, depth: f64, y: f64) -> Slot {
    Slot { role, depth, y }
}

use Position::{
    AttackingMidfielder as CAM, CentralMidfielder as CM, CentreBack as CB,
    DefensiveMidfielder as CDM, Goalkeeper as GK, LeftBack as LB, LeftWinger as LW,
    RightBack as RB, RightWinger as RW, Striker as ST,
};

const FOUR_FOUR_TWO: [Slot; 11] = [
    slot(GK, 5.0, 32.0),
    slot(LB, 22.0, 8.0),
    slot(CB, 18.0, 24.0),
    slot(CB, 18.0, 40.0),
    slot(RB, 22.0, 56.0),
    slot(LW, 45.0, 10.0),
    slot(CM, 40.0, 26.0),
    slot(CM, 40.0, 38.0),
    slot(RW, 45.0, 54.0),
    slot(ST, 62.0, 26.0),
    slot(ST, 62.0, 38.0),
];

const FOUR_THREE_THREE: [Slot; 11] = [
    slot(GK, 5.0, 32.0),
    slot(LB, 22.0, 8.0),
    slot(CB, 18.0, 24.0),
    slot(CB, 18.0, 40.0),
    slot(RB, 22.0, 56.0),
    slot(CM, 40.0, 20.0),
    slot(CDM, 34.0, 32.0),
    slot(CM, 40.0, 44.0),
    slot(LW, 60.0, 10.0),
    slot(ST, 64.0, 32.0),
    slot(RW, 60.0, 54.0),
];

const THREE_FIVE_TWO: [Slot; 11] = [
    slot(GK, 5.0, 32.0),
    slot(CB, 18.0, 18.0),
    slot(CB, 16.0, 32.0),
    slot(CB, 18.0, 46.0),
    slot(LB, 40.0, 6.0),
    slot(CM, 40.0, 22.0),
    slot(CDM, 32.0, 32.0),
    slot(CM, 40.0, 42.0),
    slot(RB, 40.0, 58.0),
    slot(ST, 62.0, 26.0),
    slot(ST, 62.0, 38.0),
];

const FOUR_TWO_THREE_ONE: [Slot; 11] = [
    slot(GK, 5.0, 32.0),
    slot(LB, 22.0, 8.0),
    slot(CB, 18.0, 24.0),
    slot(CB, 18.0, 40.0),
    slot(RB, 22.0, 56.0),
    slot(CDM, 34.0, 24.0),
    slot(CDM, 34.0, 40.0),
    slot(LW, 52.0, 10.0),
    slot(CAM, 50.0, 32.0),
    slot(RW, 52.0, 54.0),
    slot(ST, 64.0, 32.0),
];

const FIVE_THREE_TWO: [Slot; 11] = [
    slot(GK, 5.0, 32.0),
    slot(LB, 24.0, 6.0),
    slot(CB, 17.0, 20.0),
    slot(CB, 15.0, 32.0),
    slot(CB, 17.0, 44.0),
    slot(RB, 24.0, 58.0),
    slot(CM, 40.0, 20.0),
    slot(CDM, 36.0, 32.0),
    slot(CM, 40.0, 44.0),
    slot(ST, 60.0, 26.0),
    slot(ST, 60.0, 38.0),
];

/// The eleven slots of a formation, goalkeeper first.
pub const fn slots(formation: Formation) -> &'static [Slot; 11] {
    match formation {
        Formation::FourFourTwo => &FOUR_FOUR_TWO,
        Formation::FourThreeThree => &FOUR_THREE_THREE,
        Formation::ThreeFiveTwo => &THREE_FIVE_TWO,
        Formation::FourTwoThreeOne => &FOUR_TWO_THREE_ONE,
        Formation::FiveThreeTwo => &FIVE_THREE_TWO,
    }
}

/// Slot a lineup index occupies.
pub fn slot_at(formation: Formation, index: usize) -> Option<Slot> {
    slots(formation).get(index).copied()
}

/// Slot of a player in a match, if they are in a lineup.
pub fn slot_of(live: &LiveMatch, player: PlayerId) -> Option<(Side, Slot)> {
    Side::BOTH.into_iter().find_map(|side| {
        let index = live.info.lineup(side).iter().position(|&p| p == player)?;
        slot_at(live.info.formation(side), index).map(|s| (side, s))
    })
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Inputs shared by every target of one side on one tick.
#[derive(Debug, Clone, Copy)]
struct ShapeInput {
    side: Side,
    tactic: Tactic,
    in_possession: bool,
    minute: u32,
    state: BallEvent,
    restart_side: Option<Side>,
    ball: Point,
}

/// Open-play target as `(depth, template y)`.
fn open_play(slot: Slot, input: &ShapeInput) -> (f64, f64) {
    let mut depth = slot.depth;
    let mut y = slot.y;
    if slot.role.is_goalkeeper() {
        if input.in_possession {
            depth += 4.0;
        }
        return (depth, y);
    }

    match input.tactic {
        Tactic::Balanced => {}
        Tactic::CompactDefense => {
            depth *= 0.85;
            y = (y - CENTRE_Y).mul_add(0.8, CENTRE_Y);
        }
        Tactic::WingPlay => {
            if (y - CENTRE_Y).abs() > 15.0 {
                y = (y - CENTRE_Y).mul_add(1.2, CENTRE_Y);
            }
        }
        Tactic::CounterAttack => {
            depth += match (input.in_possession, slot.role.group()) {
                (true, PositionGroup::Forward) => 10.0,
                (true, PositionGroup::Midfielder) => 5.0,
                (true, _) => 0.0,
                (false, _) => -4.0,
            };
        }
    }

    depth += if input.in_possession { 6.0 } else { -4.0 };
    depth += (f64::from(input.minute) / 10.0).sin() * 3.0;
    (depth, y)
}

/// Dead-ball target as `(depth, template y)`.
fn set_piece(slot: Slot, input: &ShapeInput) -> (f64, f64) {
    let attacking = input.restart_side == Some(input.side);
    let group = slot.role.group();
    let narrow = |factor: f64| (slot.y - CENTRE_Y).mul_add(factor, CENTRE_Y);

    match input.state {
        BallEvent::Play => open_play(slot, input),
        BallEvent::Kickoff => ((slot.depth * 0.75).min(47.0), slot.y),
        BallEvent::Corner | BallEvent::Penalty if group == PositionGroup::Goalkeeper => {
            if attacking {
                (slot.depth + 10.0, CENTRE_Y)
            } else {
                (1.0, CENTRE_Y)
            }
        }
        BallEvent::Penalty => {
            if attacking {
                (PITCH_LENGTH - PENALTY_AREA_DEPTH - 4.0, narrow(0.6))
            } else {
                (PENALTY_AREA_DEPTH + 3.0, narrow(0.6))
            }
        }
        BallEvent::Corner => match (attacking, group, slot.role) {
            (true, PositionGroup::Forward, _) | (true, _, Position::CentreBack) => {
                (90.0, narrow(0.3))
            }
            (true, PositionGroup::Midfielder, _) => (80.0, narrow(0.6)),
            (true, _, _) => (55.0, slot.y),
            (false, PositionGroup::Defender, _) => (6.0, narrow(0.4)),
            (false, PositionGroup::Midfielder, _) => (12.0, narrow(0.6)),
            (false, _, _) => (35.0, slot.y),
        },
        BallEvent::FreeKick | BallEvent::ThrowIn => {
            if group == PositionGroup::Goalkeeper {
                return open_play(slot, input);
            }
            let ball_depth = depth_of(input.side, input.ball.x);
            let ball_y = side_y(input.side, input.ball.y);
            (
                slot.depth.mul_add(0.6, ball_depth * 0.4),
                slot.y.mul_add(0.6, ball_y * 0.4),
            )
        }
        BallEvent::GoalKick => {
            let (depth, y) = open_play(slot, input);
            if attacking || group == PositionGroup::Goalkeeper {
                (depth, y)
            } else {
                (depth + 8.0, y)
            }
        }
    }
}

fn target(slot: Slot, input: &ShapeInput) -> Point {
    let (depth, y) = if input.state.is_set_piece() {
        set_piece(slot, input)
    } else {
        open_play(slot, input)
    };
    Point::new(depth_to_x(input.side, depth), side_y(input.side, y))
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

/// Move every player on the pitch towards their target for this tick.
///
/// The player on the ball is left alone; the ball engine moves them. For a
/// dead ball the designated taker stands on the ball. Players who are no
/// longer available lose their location entry.
pub fn refresh_positions<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    let possession = live.possession_side();
    let open_play = live.ball.state == BallEvent::Play;

    for side in Side::BOTH {
        let input = ShapeInput {
            side,
            tactic: live.info.tactic(side),
            in_possession: possession == Some(side),
            minute: live.info.minute,
            state: live.ball.state,
            restart_side: live.ball.restart_side,
            ball: live.ball_point(),
        };
        let formation = live.info.formation(side);
        let lineup = live.info.lineup(side).to_vec();

        for (index, player) in lineup.into_iter().enumerate() {
            if !live.is_available(player) {
                live.locations.remove(&player);
                continue;
            }
            let on_ball = live.ball.possessor == Some(player);
            if open_play && on_ball && live.locations.contains_key(&player) {
                continue;
            }
            let Some(slot) = slot_at(formation, index) else {
                continue;
            };
            let base = target(slot, &input);
            let spot = if input.state.is_set_piece() {
                base
            } else {
                Point::new(
                    base.x + ctx.rng.random_range(-JITTER_X..=JITTER_X),
                    base.y + ctx.rng.random_range(-JITTER_Y..=JITTER_Y),
                )
            }
            .clamped();
            place(live, player, side, spot, ctx);
        }
    }

    if live.ball.state.is_set_piece() {
        if let Some(taker) = restart_taker(live, ctx.players) {
            let ball = live.ball_point();
            if let Some(side) = live.info.side_of(taker) {
                place(live, taker, side, ball, ctx);
            }
        }
    }
}

fn place<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    player: PlayerId,
    side: Side,
    spot: Point,
    ctx: &TickContext<'_, R>,
) {
    live.locations.insert(
        player,
        PlayerLocation {
            player_id: player,
            side,
            x: spot.x,
            y: spot.y,
            timestamp: ctx.now,
        },
    );
}

// ---------------------------------------------------------------------------
// Takers
// ---------------------------------------------------------------------------

/// Player who takes the current restart.
///
/// Kick-offs go to the most advanced midfielder, corners to the
/// best passer, penalties to the striker (or the best shooter), goal kicks
/// to the goalkeeper, and free kicks and throw-ins to whoever is nearest.
pub fn restart_taker(
    live: &LiveMatch,
    players: &std::collections::BTreeMap<PlayerId, Player>,
) -> Option<PlayerId> {
    let side = live.ball.restart_side?;
    let formation = live.info.formation(side);
    let candidates: Vec<(PlayerId, Slot)> = live
        .info
        .lineup(side)
        .iter()
        .enumerate()
        .filter(|&(_, &p)| live.is_available(p))
        .filter_map(|(i, &p)| slot_at(formation, i).map(|s| (p, s)))
        .collect();
    let outfield = || candidates.iter().filter(|(_, s)| !s.role.is_goalkeeper());
    let attribute = |id: PlayerId, f: fn(&Player) -> u8| players.get(&id).map_or(0, f);
    let ball = live.ball_point();
    let distance = |id: PlayerId| live.location(id).map_or(f64::MAX, |l| l.distance(ball));

    let best_by = |f: fn(&Player) -> u8| {
        outfield()
            .max_by_key(|(id, _)| (attribute(*id, f), std::cmp::Reverse(*id)))
            .map(|(id, _)| *id)
    };
    let nearest = || {
        outfield()
            .min_by(|a, b| distance(a.0).total_cmp(&distance(b.0)))
            .map(|(id, _)| *id)
    };

    match live.ball.state {
        BallEvent::Play => None,
        BallEvent::Kickoff => outfield()
            .filter(|(_, s)| s.role.group() == PositionGroup::Midfielder)
            .max_by(|a, b| a.1.depth.total_cmp(&b.1.depth))
            .map(|(id, _)| *id)
            .or_else(nearest),
        BallEvent::Corner => best_by(|p| p.characteristics.passing),
        BallEvent::Penalty => outfield()
            .find(|(_, s)| s.role == Position::Striker)
            .map(|(id, _)| *id)
            .or_else(|| best_by(|p| p.characteristics.shooting)),
        BallEvent::GoalKick => candidates
            .iter()
            .find(|(_, s)| s.role.is_goalkeeper())
            .map(|(id, _)| *id)
            .or_else(nearest),
        BallEvent::FreeKick | BallEvent::ThrowIn => nearest(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use matchday_types::{AvailabilityStatus, PlayerAvailability};

    use super::*;
    use crate::pitch::{PITCH_WIDTH, in_own_half};
    use crate::testing::Harness;

    #[test]
    fn every_formation_has_one_goalkeeper_first() {
        for formation in Formation::ALL {
            let s = slots(formation);
            assert!(s[0].role.is_goalkeeper());
            assert_eq!(s.iter().filter(|x| x.role.is_goalkeeper()).count(), 1);
        }
    }

    #[test]
    fn kickoff_keeps_both_teams_in_their_half() {
        let mut h = Harness::new(1);
        let live = h.kick_off();
        for loc in live.locations.values() {
            if Some(loc.player_id) == live.ball.possessor {
                continue;
            }
            let on_ball = (loc.x - 50.0).abs() < 1e-9 && (loc.y - CENTRE_Y).abs() < 1e-9;
            assert!(on_ball || in_own_half(loc.side, loc.x), "{loc:?}");
        }
    }

    #[test]
    fn kickoff_taker_is_a_midfielder_on_the_spot() {
        let mut h = Harness::new(2);
        let live = h.kick_off();
        let taker = restart_taker(&live, &h.players).unwrap();
        let (side, slot) = slot_of(&live, taker).unwrap();
        assert_eq!(side, Side::Home);
        assert_eq!(slot.role.group(), PositionGroup::Midfielder);
        let furthest_forward = live
            .info
            .home_lineup
            .iter()
            .filter_map(|&p| slot_of(&live, p))
            .filter(|(_, s)| s.role.group() == PositionGroup::Midfielder)
            .map(|(_, s)| s.depth)
            .fold(f64::MIN, f64::max);
        assert!((slot.depth - furthest_forward).abs() < 1e-9);
        let spot = live.location(taker).unwrap();
        assert!((spot.x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn open_play_positions_stay_on_the_pitch() {
        let mut h = Harness::new(4);
        let mut live = h.kick_off();
        live.ball.state = BallEvent::Play;
        live.ball.restart_side = None;
        for minute in 0..90 {
            live.info.minute = minute;
            refresh_positions(&mut live, &mut h.context());
            for loc in live.locations.values() {
                assert!((0.0..=PITCH_LENGTH).contains(&loc.x));
                assert!((0.0..=PITCH_WIDTH).contains(&loc.y));
            }
        }
    }

    #[test]
    fn unavailable_players_leave_the_pitch() {
        let mut h = Harness::new(5);
        let mut live = h.kick_off();
        let gone = live.info.home_lineup[3];
        live.availability.insert(
            gone,
            PlayerAvailability {
                player_id: gone,
                side: Side::Home,
                status: AvailabilityStatus::RedCard,
                minute: 10,
                reason: String::from("test"),
            },
        );
        refresh_positions(&mut live, &mut h.context());
        assert!(!live.locations.contains_key(&gone));
        assert_eq!(live.locations.len(), 21);
    }

    #[test]
    fn away_side_mirrors_home_template() {
        let input = |side| ShapeInput {
            side,
            tactic: Tactic::Balanced,
            in_possession: false,
            minute: 0,
            state: BallEvent::Kickoff,
            restart_side: Some(Side::Home),
            ball: Point::centre(),
        };
        let keeper = slots(Formation::FourFourTwo)[0];
        let home = target(keeper, &input(Side::Home));
        let away = target(keeper, &input(Side::Away));
        assert!((home.x + away.x - PITCH_LENGTH).abs() < 1e-9);
    }

    #[test]
    fn corner_taker_is_best_passer() {
        let mut h = Harness::new(6);
        let mut live = h.kick_off();
        live.ball.state = BallEvent::Corner;
        live.ball.restart_side = Some(Side::Away);
        let taker = restart_taker(&live, &h.players).unwrap();
        let best = live
            .info
            .away_lineup
            .iter()
            .skip(1)
            .map(|id| h.players[id].characteristics.passing)
            .max()
            .unwrap();
        assert_eq!(h.players[&taker].characteristics.passing, best);
    }
}
