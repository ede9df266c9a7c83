//! Red cards, injuries, and substitutions.
//!
//! A player who leaves the pitch gets an availability entry and loses their
//! location. Substitutes take over the outgoing player's lineup slot, so
//! slot-based positioning keeps working. A red-carded player keeps the slot
//! but stays unavailable, leaving the side a player short.

use matchday_league::BASE_MATCH_RATING;
use matchday_types::{
    AvailabilityStatus, EventKind, PlayerAvailability, PlayerId, PlayerLocation, Side,
};
use rand::Rng;
use tracing::debug;

use crate::commentary;
use crate::lineup::best_substitute;
use crate::live::{LiveMatch, Stint, TickContext};
use crate::pitch::{PITCH_WIDTH, Point};
use crate::positioning::slot_of;

/// Every player who can no longer take part, in id order.
pub fn unavailable(live: &LiveMatch) -> Vec<PlayerAvailability> {
    live.availability
        .values()
        .filter(|a| a.status != AvailabilityStatus::Available)
        .cloned()
        .collect()
}

/// Take a player out of the match.
fn mark(
    live: &mut LiveMatch,
    player: PlayerId,
    side: Side,
    status: AvailabilityStatus,
    reason: &str,
) {
    live.availability.insert(
        player,
        PlayerAvailability {
            player_id: player,
            side,
            status,
            minute: live.info.minute,
            reason: reason.to_owned(),
        },
    );
    live.end_stint(player);
    live.locations.remove(&player);
    if live.ball.possessor == Some(player) {
        live.ball.possessor = None;
        live.ball.last_touch = Some(player);
    }
}

/// Send a player off. The side is not allowed a replacement.
pub fn send_off(live: &mut LiveMatch, player: PlayerId, reason: &str) -> Option<Side> {
    let side = live.info.side_of(player)?;
    mark(live, player, side, AvailabilityStatus::RedCard, reason);
    Some(side)
}

/// Take an injured player off and bring on a replacement if one is allowed.
pub fn injure<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    player: PlayerId,
    reason: &str,
) -> Option<PlayerId> {
    let side = live.info.side_of(player)?;
    if !live.is_available(player) {
        return None;
    }
    let replacement = substitute(live, ctx, side, player, AvailabilityStatus::Injured, reason);
    if replacement.is_none() {
        mark(live, player, side, AvailabilityStatus::Injured, reason);
        let name = ctx
            .players
            .get(&player)
            .map_or("A player", |p| p.name.as_str())
            .to_owned();
        commentary::push(
            live,
            ctx,
            EventKind::Substitution,
            format!("{name} is forced off injured and cannot be replaced"),
            Some(player),
        );
    }
    replacement
}

/// Replace `off` with the best bench player for their slot.
///
/// Returns `None`, leaving `off` untouched, when the side has used every
/// substitution or has nobody left on the bench.
pub fn substitute<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    side: Side,
    off: PlayerId,
    status: AvailabilityStatus,
    reason: &str,
) -> Option<PlayerId> {
    if live.info.substitutions(side) >= ctx.rules.max_substitutions {
        return None;
    }
    let (_, slot) = slot_of(live, off)?;
    let bench: Vec<_> = live
        .info
        .bench(side)
        .iter()
        .filter_map(|id| ctx.players.get(id))
        .collect();
    let incoming = best_substitute(&bench, slot.role)?;

    let touchline = if side == Side::Home { 0.0 } else { PITCH_WIDTH };
    let spot = live
        .location(off)
        .unwrap_or_else(|| Point::new(50.0, touchline));
    mark(live, off, side, status, reason);

    if let Some(entry) = live.info.lineup_mut(side).iter_mut().find(|p| **p == off) {
        *entry = incoming;
    }
    live.info.bench_mut(side).retain(|&p| p != incoming);
    let used = live.info.substitutions_mut(side);
    *used = used.saturating_add(1);
    live.stints.insert(
        incoming,
        Stint {
            side,
            from: live.info.minute,
            until: None,
        },
    );
    live.locations.insert(
        incoming,
        PlayerLocation {
            player_id: incoming,
            side,
            x: spot.x,
            y: spot.y,
            timestamp: ctx.now,
        },
    );
    if let Some(player) = ctx.players.get_mut(&incoming) {
        player.current_rating = BASE_MATCH_RATING;
    }

    let name = |id: PlayerId| {
        ctx.players
            .get(&id)
            .map_or_else(String::new, |p| p.name.clone())
    };
    let text = format!(
        "Substitution for {team}: {on} replaces {off_name}",
        team = live.info.team(side).name,
        on = name(incoming),
        off_name = name(off),
    );
    debug!(
        match_id = %live.id(),
        side = ?side,
        player_on = %incoming,
        player_off = %off,
        "Substitution"
    );
    commentary::push(live, ctx, EventKind::Substitution, text, Some(incoming));
    Some(incoming)
}

/// Occasionally replace a side's worst-rated outfield player late on.
pub fn maybe_tactical_change<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
) {
    if live.info.minute < ctx.rules.substitution_minute {
        return;
    }
    for side in Side::BOTH {
        if !ctx.rng.random_bool(ctx.rules.substitution_chance.clamp(0.0, 1.0)) {
            continue;
        }
        let weakest = live
            .on_pitch(side)
            .into_iter()
            .filter_map(|id| ctx.players.get(&id))
            .filter(|p| !p.position.is_goalkeeper())
            .min_by(|a, b| {
                a.current_rating
                    .total_cmp(&b.current_rating)
                    .then(a.id.cmp(&b.id))
            })
            .map(|p| p.id);
        if let Some(off) = weakest {
            let status = AvailabilityStatus::Substituted;
            substitute(live, ctx, side, off, status, "Tactical change");
        }
    }
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

    #[test]
    fn red_card_leaves_side_short() {
        let mut h = Harness::new(21);
        let mut live = h.kick_off();
        let off = live.info.away_lineup[4];
        assert_eq!(send_off(&mut live, off, "Violent conduct"), Some(Side::Away));
        assert_eq!(live.players_on_pitch(Side::Away), 10);
        assert!(!live.locations.contains_key(&off));
        let out = unavailable(&live);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status, AvailabilityStatus::RedCard);
        assert_eq!(live.info.away_substitutions, 0);
    }

    #[test]
    fn injury_brings_on_a_substitute() {
        let mut h = Harness::new(22);
        let mut live = h.kick_off();
        let off = live.info.home_lineup[2];
        let bench_before = live.info.home_bench.len();
        let on = injure(&mut live, &mut h.context(), off, "Hamstring").unwrap();
        assert_eq!(live.info.home_lineup[2], on);
        assert_eq!(live.players_on_pitch(Side::Home), 11);
        assert_eq!(live.info.home_bench.len(), bench_before - 1);
        assert_eq!(live.info.home_substitutions, 1);
        assert_eq!(live.availability[&off].status, AvailabilityStatus::Injured);
        assert!(live.stints[&off].until.is_some());
        assert!(live.locations.contains_key(&on));
    }

    #[test]
    fn substitutions_are_capped() {
        let mut h = Harness::new(23);
        h.rules.max_substitutions = 1;
        let mut live = h.kick_off();
        let first = live.info.home_lineup[5];
        let second = live.info.home_lineup[6];
        let mut ctx = h.context();
        let swapped = AvailabilityStatus::Substituted;
        assert!(substitute(&mut live, &mut ctx, Side::Home, first, swapped, "x").is_some());
        assert!(substitute(&mut live, &mut ctx, Side::Home, second, swapped, "x").is_none());
        assert!(live.is_available(second));
        assert_eq!(injure(&mut live, &mut ctx, second, "Knock"), None);
        assert_eq!(live.players_on_pitch(Side::Home), 10);
    }

    #[test]
    fn tactical_changes_wait_for_the_hour() {
        let mut h = Harness::new(24);
        h.rules.substitution_chance = 1.0;
        let mut live = h.kick_off();
        live.info.minute = 30;
        maybe_tactical_change(&mut live, &mut h.context());
        assert_eq!(live.info.home_substitutions, 0);
        live.info.minute = 61;
        maybe_tactical_change(&mut live, &mut h.context());
        assert_eq!(live.info.home_substitutions, 1);
        assert_eq!(live.info.away_substitutions, 1);
        assert_eq!(
            live.commentary.front().unwrap().kind,
            EventKind::Substitution
        );
    }
}
