//! Match commentary.
//!
//! Every entry carries an audio variant and a playback speed: goals are
//! read faster, cards slower. Each match keeps only its most recent
//! entries, newest first.

use matchday_types::{CommentaryEntry, EventKind, PlayerId, Side};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::live::{LiveMatch, TickContext};

/// Flavour lines. `{player}` and `{team}` are filled at random from
/// either side.
pub const FLAVOUR_TEMPLATES: [&str; 16] = [
    "Great save by the goalkeeper!",
    "{player} makes a brilliant run down the wing",
    "{player} with a crucial tackle",
    "Penalty appeal waved away",
    "{team} on the attack here",
    "Excellent cross from {player}",
    "The crowd is on their feet!",
    "Weather conditions affecting play",
    "{player} dribbles past the defender",
    "Shot blocked by {player}",
    "Offside flag raised against {team}",
    "Beautiful passing move by {team}",
    "{team} keeping the ball well in midfield",
    "{player} wins the header",
    "Lovely first touch from {player}",
    "{team} pressing high up the pitch",
];

/// Text read out for an entry.
pub fn audio_text(kind: EventKind, text: &str) -> String {
    match kind {
        EventKind::Goal => format!("GOOOOOAAAL! {text}"),
        EventKind::Card => format!("Card shown. {text}"),
        _ => text.to_owned(),
    }
}

/// Playback speed hint for an entry.
pub const fn audio_speed(kind: EventKind) -> f64 {
    match kind {
        EventKind::Goal => 1.2,
        EventKind::Card => 0.9,
        _ => 1.0,
    }
}

/// Add an entry at the current minute and trim to the configured cap.
pub fn push<R: Rng + ?Sized>(
    live: &mut LiveMatch,
    ctx: &mut TickContext<'_, R>,
    kind: EventKind,
    text: String,
    player: Option<PlayerId>,
) {
    *ctx.commentary_seq = ctx.commentary_seq.next();
    let player_name = player
        .and_then(|id| ctx.players.get(&id))
        .map(|p| p.name.clone());
    let entry = CommentaryEntry {
        id: *ctx.commentary_seq,
        match_id: live.id(),
        minute: live.info.minute,
        audio_text: audio_text(kind, &text),
        audio_speed: audio_speed(kind),
        text,
        kind,
        player_id: player,
        player_name,
        timestamp: ctx.now,
    };
    live.commentary.push_front(entry);
    live.commentary.truncate(ctx.rules.commentary_cap);
}

/// Fill a flavour template and add it.
pub fn flavour<R: Rng + ?Sized>(live: &mut LiveMatch, ctx: &mut TickContext<'_, R>) {
    let template = FLAVOUR_TEMPLATES
        .choose(ctx.rng)
        .copied()
        .unwrap_or("The crowd is on their feet!");
    let side = if ctx.rng.random_bool(0.5) {
        Side::Home
    } else {
        Side::Away
    };

    let mut text = template.to_owned();
    let mut subject = None;
    if text.contains("{player}") {
        let pick = live.on_pitch(side).choose(ctx.rng).copied();
        let name = pick
            .and_then(|id| ctx.players.get(&id))
            .map_or_else(|| live.info.team(side).name.clone(), |p| p.name.clone());
        text = text.replace("{player}", &name);
        subject = pick;
    }
    if text.contains("{team}") {
        text = text.replace("{team}", &live.info.team(side).name);
    }
    push(live, ctx, EventKind::Commentary, text, subject);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[test]
    fn audio_variants_follow_event_kind() {
        assert_eq!(audio_text(EventKind::Goal, "X"), "GOOOOOAAAL! X");
        assert_eq!(audio_text(EventKind::Card, "X"), "Card shown. X");
        assert_eq!(audio_text(EventKind::Corner, "X"), "X");
        assert!(audio_speed(EventKind::Goal) > audio_speed(EventKind::Corner));
        assert!(audio_speed(EventKind::Card) < audio_speed(EventKind::Corner));
    }

    #[test]
    fn buffer_is_capped_newest_first() {
        let mut h = Harness::new(9);
        h.rules.commentary_cap = 5;
        let mut live = h.kick_off();
        for n in 0..12 {
            push(
                &mut live,
                &mut h.context(),
                EventKind::Commentary,
                format!("line {n}"),
                None,
            );
        }
        assert_eq!(live.commentary.len(), 5);
        assert_eq!(live.commentary.front().unwrap().text, "line 11");
        let ids: Vec<_> = live.commentary.iter().map(|c| c.id).collect();
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn flavour_leaves_no_placeholders() {
        let mut h = Harness::new(10);
        let mut live = h.kick_off();
        for _ in 0..50 {
            flavour(&mut live, &mut h.context());
            let text = &live.commentary.front().unwrap().text;
            assert!(!text.contains('{'), "{text}");
        }
    }
}
