//! Integration tests for standings recomputation and tie-breaks.

use chaveamento::logic::winner_from_score;
use chaveamento::{
    recompute, schedule, EntrantId, FormatKind, FormatSpec, GameMatch, Group, MatchStatus,
    PointsRule, SetScore, Side, Standing,
};
use uuid::Uuid;

fn group_of(n: usize, format: FormatKind) -> Group {
    Group::new(1, format, (0..n).map(|_| Uuid::new_v4()).collect())
}

fn finish(m: &mut GameMatch, sets: &[(u32, u32)]) {
    m.score = sets.iter().map(|&(a, b)| SetScore::new(a, b)).collect();
    m.winner = Some(winner_from_score(&m.score).unwrap());
    m.status = MatchStatus::Finished;
}

fn row(table: &[Standing], id: EntrantId) -> &Standing {
    table.iter().find(|s| s.entrant_id == id).unwrap()
}

/// Match between positions `a` and `b` of a fixed-pair group.
fn find(matches: &mut [GameMatch], a: EntrantId, b: EntrantId) -> &mut GameMatch {
    matches
        .iter_mut()
        .find(|m| {
            (m.side_a == vec![a] && m.side_b == vec![b]) || (m.side_a == vec![b] && m.side_b == vec![a])
        })
        .unwrap()
}

#[test]
fn no_results_rank_by_group_order() {
    let group = group_of(4, FormatKind::FixedPair);
    let matches = schedule(&group, &FormatSpec::FixedPair { group_size: 4 });
    let table = recompute(&group, &matches, PointsRule::default());
    for (i, &id) in group.entrants.iter().enumerate() {
        assert_eq!(row(&table, id).rank, i as u32 + 1);
        assert_eq!(row(&table, id).points, 0);
    }
}

#[test]
fn counts_wins_games_and_sets() {
    let group = group_of(2, FormatKind::FixedPair);
    let (a, b) = (group.entrants[0], group.entrants[1]);
    let mut matches = schedule(&group, &FormatSpec::FixedPair { group_size: 2 });
    let m = find(&mut matches, a, b);
    let a_is_side_a = m.side_a == vec![a];
    let sets = if a_is_side_a {
        vec![(6, 4), (3, 6), (7, 5)]
    } else {
        vec![(4, 6), (6, 3), (5, 7)]
    };
    finish(m, &sets);

    let table = recompute(&group, &matches, PointsRule::default());
    let ra = row(&table, a);
    assert_eq!((ra.wins, ra.losses, ra.points), (1, 0, 1));
    assert_eq!((ra.games_for, ra.games_against), (16, 15));
    assert_eq!((ra.sets_for, ra.sets_against), (2, 1));
    assert_eq!(ra.rank, 1);
    let rb = row(&table, b);
    assert_eq!((rb.wins, rb.losses), (0, 1));
    assert_eq!((rb.games_for, rb.games_against), (15, 16));
    assert_eq!((rb.sets_for, rb.sets_against), (1, 2));
    assert_eq!(rb.rank, 2);
}

#[test]
fn ties_on_wins_break_by_game_difference() {
    // a beats b 6-0, b beats c 6-4, c beats a 6-5: everyone 1-1.
    let group = group_of(3, FormatKind::FixedPair);
    let [a, b, c] = [group.entrants[0], group.entrants[1], group.entrants[2]];
    let mut matches = schedule(&group, &FormatSpec::FixedPair { group_size: 3 });
    for (w, l, gw, gl) in [(a, b, 6, 0), (b, c, 6, 4), (c, a, 6, 5)] {
        let m = find(&mut matches, w, l);
        let sets = if m.side_a == vec![w] { [(gw, gl)] } else { [(gl, gw)] };
        finish(m, &sets);
    }
    let table = recompute(&group, &matches, PointsRule::default());
    // Game difference: a +5, c -1, b -4.
    assert_eq!(row(&table, a).rank, 1);
    assert_eq!(row(&table, c).rank, 2);
    assert_eq!(row(&table, b).rank, 3);
}

/// Record `sets` (from the winner's view) for the match between `w` and `l`.
fn win(matches: &mut [GameMatch], w: EntrantId, l: EntrantId, sets: &[(u32, u32)]) {
    let m = find(matches, w, l);
    let sets: Vec<(u32, u32)> = if m.side_a == vec![w] {
        sets.to_vec()
    } else {
        sets.iter().map(|&(x, y)| (y, x)).collect()
    };
    finish(m, &sets);
}

#[test]
fn equal_game_difference_breaks_by_set_difference() {
    let group = group_of(3, FormatKind::FixedPair);
    let [a, b, c] = [group.entrants[0], group.entrants[1], group.entrants[2]];
    let mut matches = schedule(&group, &FormatSpec::FixedPair { group_size: 3 });
    // Both beat c by six games; a drops a set on the way.
    win(&mut matches, a, c, &[(6, 0), (0, 6), (6, 0)]);
    win(&mut matches, b, c, &[(6, 3), (6, 3)]);

    let table = recompute(&group, &matches, PointsRule::default());
    let (ra, rb) = (row(&table, a), row(&table, b));
    assert_eq!((ra.points, ra.wins, ra.game_diff()), (rb.points, rb.wins, rb.game_diff()));
    assert_eq!((ra.set_diff(), rb.set_diff()), (1, 2));
    assert_eq!(rb.rank, 1);
    assert_eq!(ra.rank, 2);
    assert_eq!(row(&table, c).rank, 3);
}

#[test]
fn full_tie_falls_back_to_group_position() {
    let group = group_of(3, FormatKind::FixedPair);
    let [a, b, c] = [group.entrants[0], group.entrants[1], group.entrants[2]];
    let mut matches = schedule(&group, &FormatSpec::FixedPair { group_size: 3 });
    // Different scores, same differentials: +6 games and +2 sets each.
    win(&mut matches, b, c, &[(7, 4), (6, 3)]);
    win(&mut matches, a, c, &[(6, 3), (6, 3)]);

    let table = recompute(&group, &matches, PointsRule::default());
    let (ra, rb) = (row(&table, a), row(&table, b));
    assert_eq!(
        (ra.points, ra.wins, ra.game_diff(), ra.set_diff()),
        (rb.points, rb.wins, rb.game_diff(), rb.set_diff())
    );
    assert_eq!(ra.rank, 1);
    assert_eq!(rb.rank, 2);
}

#[test]
fn points_saturate_instead_of_wrapping() {
    let rule = PointsRule {
        per_win: u32::MAX,
        per_loss: u32::MAX,
    };
    assert_eq!(rule.points(2, 3), u32::MAX);
    assert_eq!(PointsRule::default().points(4, 9), 4);
}

#[test]
fn recompute_is_order_independent() {
    let group = group_of(4, FormatKind::FixedPair);
    let mut matches = schedule(&group, &FormatSpec::FixedPair { group_size: 4 });
    for (i, m) in matches.iter_mut().enumerate() {
        if i % 3 != 2 {
            finish(m, &[(6, i as u32 % 5)]);
        }
    }
    let forward = recompute(&group, &matches, PointsRule::default());
    matches.reverse();
    let backward = recompute(&group, &matches, PointsRule::default());
    assert_eq!(forward, backward);

    let ranks: Vec<u32> = {
        let mut r: Vec<u32> = forward.iter().map(|s| s.rank).collect();
        r.sort();
        r
    };
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[test]
fn rotating_partner_credits_individual_players() {
    let group = group_of(4, FormatKind::RotatingPartner);
    let [a, b, c, d] = [group.entrants[0], group.entrants[1], group.entrants[2], group.entrants[3]];
    let mut matches = schedule(&group, &FormatSpec::RotatingPartner);
    // AB beat CD, AC beat BD, AD lose to BC.
    finish(&mut matches[0], &[(6, 2)]);
    finish(&mut matches[1], &[(6, 3)]);
    finish(&mut matches[2], &[(4, 6)]);

    let table = recompute(&group, &matches, PointsRule::default());
    assert_eq!((row(&table, a).wins, row(&table, a).losses), (2, 1));
    assert_eq!((row(&table, b).wins, row(&table, b).losses), (2, 1));
    assert_eq!((row(&table, c).wins, row(&table, c).losses), (2, 1));
    assert_eq!((row(&table, d).wins, row(&table, d).losses), (0, 3));
    assert_eq!(row(&table, a).games_for, 6 + 6 + 4);
    assert_eq!(row(&table, d).rank, 4);
    assert!(table.iter().all(|s| s.played() == 3));
}

#[test]
fn walkover_bye_and_cancelled_matches() {
    let group = group_of(4, FormatKind::FixedPair);
    let mut matches = schedule(&group, &FormatSpec::FixedPair { group_size: 4 });

    let wo = &mut matches[0];
    wo.status = MatchStatus::Walkover;
    wo.winner = Some(Side::B);
    let (wo_winner, wo_loser) = (wo.side_b[0], wo.side_a[0]);

    let bye = &mut matches[1];
    bye.status = MatchStatus::Bye;
    bye.winner = Some(Side::A);
    bye.side_b.clear();
    let bye_winner = bye.side_a[0];

    let cancelled = &mut matches[2];
    cancelled.status = MatchStatus::Cancelled;
    cancelled.score = vec![SetScore::new(6, 0)];
    cancelled.winner = Some(Side::A);

    let table = recompute(&group, &matches, PointsRule::default());
    let w = row(&table, wo_winner);
    assert!(w.wins >= 1);
    assert_eq!(row(&table, wo_loser).losses, 1);
    assert!(row(&table, bye_winner).wins >= 1);
    assert!(table.iter().all(|s| s.games_for == 0 && s.sets_for == 0));
    let total_wins: u32 = table.iter().map(|s| s.wins).sum();
    let total_losses: u32 = table.iter().map(|s| s.losses).sum();
    assert_eq!((total_wins, total_losses), (2, 1));
}

#[test]
fn points_follow_the_configured_rule() {
    let group = group_of(2, FormatKind::FixedPair);
    let mut matches = schedule(&group, &FormatSpec::FixedPair { group_size: 2 });
    finish(&mut matches[0], &[(6, 1)]);
    let rule = PointsRule { per_win: 3, per_loss: 1 };
    let table = recompute(&group, &matches, rule);
    let winner = matches[0].side_a[0];
    let loser = matches[0].side_b[0];
    assert_eq!(row(&table, winner).points, 3);
    assert_eq!(row(&table, loser).points, 1);
}

#[test]
fn matches_of_other_groups_are_ignored() {
    let group = group_of(2, FormatKind::FixedPair);
    let other = group_of(2, FormatKind::FixedPair);
    let mut foreign = schedule(&other, &FormatSpec::FixedPair { group_size: 2 });
    finish(&mut foreign[0], &[(6, 0)]);
    let mut matches = schedule(&group, &FormatSpec::FixedPair { group_size: 2 });
    matches.extend(foreign);

    let table = recompute(&group, &matches, PointsRule::default());
    assert_eq!(table.len(), 2);
    assert!(table.iter().all(|s| s.played() == 0));
}
