//! Standings: aggregate a group's match results into a ranked table.

use crate::models::{EntrantId, GameMatch, Group, MatchStatus, PointsRule, Side, Standing};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Recompute the standings of `group` from `matches`.
///
/// Only matches belonging to the group count, so the result does not depend on
/// which other matches are passed or in what order. Every entrant on a side is
/// credited, which makes rotating-partner records individual.
///
/// Ranking: points, wins, game differential, set differential, then position in
/// the group (seed/registration order). Ranks are 1-based and unique.
pub fn recompute(group: &Group, matches: &[GameMatch], points: PointsRule) -> Vec<Standing> {
    let mut table: HashMap<_, Standing> = group
        .entrants
        .iter()
        .map(|&id| (id, Standing::new(id, group.id)))
        .collect();

    for m in matches.iter().filter(|m| m.group_id == Some(group.id)) {
        apply_match(&mut table, m);
    }

    let mut rows: Vec<Standing> = table.into_values().collect();
    for row in &mut rows {
        row.points = points.points(row.wins, row.losses);
    }
    rows.sort_by_key(|s| {
        (
            Reverse(s.points),
            Reverse(s.wins),
            Reverse(s.game_diff()),
            Reverse(s.set_diff()),
            group.position_of(s.entrant_id).unwrap_or(usize::MAX),
        )
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }
    rows
}

/// Add one match to the table.
fn apply_match(table: &mut HashMap<EntrantId, Standing>, m: &GameMatch) {
    let Some(winner) = m.winner else {
        return;
    };
    match m.status {
        MatchStatus::Finished => {
            let (sets_a, sets_b) = m.sets_won();
            let (games_a, games_b) = m.games_won();
            credit(table, m.side(Side::A), winner == Side::A, (games_a, games_b), (sets_a, sets_b));
            credit(table, m.side(Side::B), winner == Side::B, (games_b, games_a), (sets_b, sets_a));
        }
        MatchStatus::Walkover => {
            credit(table, m.side(winner), true, (0, 0), (0, 0));
            credit(table, m.side(winner.other()), false, (0, 0), (0, 0));
        }
        MatchStatus::Bye => {
            credit(table, m.side(winner), true, (0, 0), (0, 0));
        }
        MatchStatus::Scheduled | MatchStatus::InProgress | MatchStatus::Cancelled => {}
    }
}

fn credit(
    table: &mut HashMap<EntrantId, Standing>,
    side: &[EntrantId],
    won: bool,
    (games_for, games_against): (u32, u32),
    (sets_for, sets_against): (u32, u32),
) {
    for id in side {
        let Some(row) = table.get_mut(id) else {
            log::warn!("Match side references entrant {} outside its group", id);
            continue;
        };
        if won {
            row.wins = row.wins.saturating_add(1);
        } else {
            row.losses = row.losses.saturating_add(1);
        }
        row.games_for = row.games_for.saturating_add(games_for);
        row.games_against = row.games_against.saturating_add(games_against);
        row.sets_for = row.sets_for.saturating_add(sets_for);
        row.sets_against = row.sets_against.saturating_add(sets_against);
    }
}
