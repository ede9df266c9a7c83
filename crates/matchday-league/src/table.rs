//! League standings and team form.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use matchday_types::{FORM_LENGTH, FormResult, League, LeagueTableRow, TeamId, TeamInfo};

/// Final score of a finished match, from the home side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Home team.
    pub home: TeamId,
    /// Away team.
    pub away: TeamId,
    /// Home goals.
    pub home_goals: u32,
    /// Away goals.
    pub away_goals: u32,
}

/// Standings for every league.
#[derive(Debug, Clone, Default)]
pub struct LeagueTables {
    tables: BTreeMap<League, Vec<LeagueTableRow>>,
}

impl LeagueTables {
    /// Empty standings with one zeroed row per team.
    pub fn new<'a, I>(teams: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a TeamInfo>,
    {
        let mut tables: BTreeMap<League, Vec<LeagueTableRow>> = BTreeMap::new();
        for team in teams {
            tables.entry(team.league).or_default().push(LeagueTableRow {
                position: 0,
                team_id: team.id,
                team_name: team.name.clone(),
                short_name: team.short_name.clone(),
                played: 0,
                won: 0,
                drawn: 0,
                lost: 0,
                goals_for: 0,
                goals_against: 0,
                goal_difference: 0,
                points: 0,
                form: team.form.clone(),
                last_update: now,
            });
        }
        for rows in tables.values_mut() {
            sort_rows(rows);
        }
        Self { tables }
    }

    /// Current standings of a league, top first.
    pub fn table(&self, league: League) -> &[LeagueTableRow] {
        self.tables.get(&league).map_or(&[], Vec::as_slice)
    }

    /// Leader of a league.
    pub fn leader(&self, league: League) -> Option<&LeagueTableRow> {
        self.table(league).first()
    }

    /// Apply a finished match and re-sort the league.
    ///
    /// `home_form`/`away_form` are the teams' form sequences after the
    /// result was recorded, copied into the rows.
    pub fn record(
        &mut self,
        league: League,
        result: &MatchResult,
        forms: (&[FormResult], &[FormResult]),
        now: DateTime<Utc>,
    ) {
        let Some(rows) = self.tables.get_mut(&league) else {
            return;
        };
        let sides = [
            (result.home, result.home_goals, result.away_goals, forms.0),
            (result.away, result.away_goals, result.home_goals, forms.1),
        ];
        for (team, scored, conceded, form) in sides {
            let Some(row) = rows.iter_mut().find(|row| row.team_id == team) else {
                continue;
            };
            row.played = row.played.saturating_add(1);
            row.goals_for = row.goals_for.saturating_add(scored);
            row.goals_against = row.goals_against.saturating_add(conceded);
            row.goal_difference = goal_difference(row.goals_for, row.goals_against);
            let outcome = FormResult::from_score(scored, conceded);
            match outcome {
                FormResult::Win => row.won = row.won.saturating_add(1),
                FormResult::Draw => row.drawn = row.drawn.saturating_add(1),
                FormResult::Loss => row.lost = row.lost.saturating_add(1),
            }
            row.points = row.points.saturating_add(outcome.points());
            row.form = form.to_vec();
            row.last_update = now;
        }
        sort_rows(rows);
    }
}

fn goal_difference(scored: u32, conceded: u32) -> i32 {
    let diff = i64::from(scored).saturating_sub(i64::from(conceded));
    i32::try_from(diff).unwrap_or(if diff < 0 { i32::MIN } else { i32::MAX })
}

/// Points, then goal difference, then goals scored, then name.
fn sort_rows(rows: &mut [LeagueTableRow]) {
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
            .then(a.team_name.cmp(&b.team_name))
    });
    for (position, row) in (1_u32..).zip(rows.iter_mut()) {
        row.position = position;
    }
}

/// Push a result onto a team's form and update its streaks.
pub fn apply_form(team: &mut TeamInfo, result: FormResult, at_home: bool) {
    team.form.insert(0, result);
    team.form.truncate(FORM_LENGTH);
    team.form_points = team.form.iter().map(|r| r.points()).sum();

    let streak = if at_home {
        &mut team.home_streak
    } else {
        &mut team.away_streak
    };
    *streak = match (result, *streak) {
        (FormResult::Win, s) if s >= 0 => s.saturating_add(1),
        (FormResult::Win, _) => 1,
        (_, s) if s <= 0 => s.saturating_sub(1),
        _ => -1,
    };
}
