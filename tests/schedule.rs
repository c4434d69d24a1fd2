//! Integration tests for round-robin scheduling.

use chaveamento::{
    assign_groups, schedule, Entrant, EntrantId, FormatKind, FormatSpec, GameMatch, Group,
    MatchStatus, RoundType,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use uuid::Uuid;

fn group_of(n: usize, format: FormatKind) -> Group {
    Group::new(1, format, (0..n).map(|_| Uuid::new_v4()).collect())
}

fn key(a: EntrantId, b: EntrantId) -> (EntrantId, EntrantId) {
    (a.min(b), a.max(b))
}

/// Partner and opponent counts for doubles matches.
fn doubles_counts(
    matches: &[GameMatch],
) -> (HashMap<(EntrantId, EntrantId), u32>, HashMap<(EntrantId, EntrantId), u32>) {
    let mut partners = HashMap::new();
    let mut opponents = HashMap::new();
    for m in matches {
        for side in [&m.side_a, &m.side_b] {
            assert_eq!(side.len(), 2);
            *partners.entry(key(side[0], side[1])).or_insert(0) += 1;
        }
        for &x in &m.side_a {
            for &y in &m.side_b {
                *opponents.entry(key(x, y)).or_insert(0) += 1;
            }
        }
    }
    (partners, opponents)
}

#[test]
fn fixed_pair_round_robin_is_complete() {
    for n in 2..=8 {
        let group = group_of(n, FormatKind::FixedPair);
        let matches = schedule(&group, &FormatSpec::FixedPair { group_size: n });
        assert_eq!(matches.len(), n * (n - 1) / 2);

        let mut seen = HashMap::new();
        for m in &matches {
            assert_eq!(m.side_a.len(), 1);
            assert_eq!(m.side_b.len(), 1);
            assert_ne!(m.side_a[0], m.side_b[0]);
            *seen.entry(key(m.side_a[0], m.side_b[0])).or_insert(0) += 1;
        }
        assert_eq!(seen.len(), n * (n - 1) / 2);
        assert!(seen.values().all(|&c| c == 1));
    }
}

#[test]
fn new_matches_are_scheduled_without_score() {
    let group = group_of(4, FormatKind::FixedPair);
    for m in schedule(&group, &FormatSpec::FixedPair { group_size: 4 }) {
        assert_eq!(m.status, MatchStatus::Scheduled);
        assert!(m.score.is_empty());
        assert_eq!(m.winner, None);
        assert_eq!(m.group_id, Some(group.id));
        assert!(matches!(m.round, RoundType::Group { round } if round >= 1));
    }
}

#[test]
fn eight_pairs_make_two_groups_of_six_matches() {
    let entrants: Vec<Entrant> = (0..8)
        .map(|i| Entrant::pair(format!("A{i}"), format!("B{i}"), None))
        .collect();
    let format = FormatSpec::FixedPair { group_size: 4 };
    let a = assign_groups(&entrants, &format, None, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(a.groups.len(), 2);
    for g in &a.groups {
        assert_eq!(schedule(g, &format).len(), 6);
    }
}

#[test]
fn rotating_partner_follows_the_k4_table() {
    let group = group_of(4, FormatKind::RotatingPartner);
    let [a, b, c, d] = [group.entrants[0], group.entrants[1], group.entrants[2], group.entrants[3]];
    let matches = schedule(&group, &FormatSpec::RotatingPartner);

    assert_eq!(matches.len(), 3);
    assert_eq!((matches[0].side_a.clone(), matches[0].side_b.clone()), (vec![a, b], vec![c, d]));
    assert_eq!((matches[1].side_a.clone(), matches[1].side_b.clone()), (vec![a, c], vec![b, d]));
    assert_eq!((matches[2].side_a.clone(), matches[2].side_b.clone()), (vec![a, d], vec![b, c]));
    let rounds: Vec<Option<u32>> = matches.iter().map(|m| m.group_round()).collect();
    assert_eq!(rounds, vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn rotating_partner_pairs_partner_once_and_oppose_twice() {
    let group = group_of(4, FormatKind::RotatingPartner);
    let (partners, opponents) = doubles_counts(&schedule(&group, &FormatSpec::RotatingPartner));
    for (i, &x) in group.entrants.iter().enumerate() {
        for &y in &group.entrants[i + 1..] {
            assert_eq!(partners.get(&key(x, y)), Some(&1));
            assert_eq!(opponents.get(&key(x, y)), Some(&2));
        }
    }
}

#[test]
fn rei_da_praia_with_eight_players_makes_two_canonical_groups() {
    let entrants: Vec<Entrant> = (0..8).map(|i| Entrant::individual(format!("P{i}"), None)).collect();
    let a = assign_groups(&entrants, &FormatSpec::RotatingPartner, None, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(a.groups.len(), 2);
    for g in &a.groups {
        let matches = schedule(g, &FormatSpec::RotatingPartner);
        assert_eq!(matches.len(), 3);
        let e = &g.entrants;
        assert_eq!(matches[0].side_a, vec![e[0], e[1]]);
        assert_eq!(matches[1].side_a, vec![e[0], e[2]]);
        assert_eq!(matches[2].side_a, vec![e[0], e[3]]);
    }
}

#[test]
fn super_eight_uses_the_full_rotation_table() {
    let group = group_of(8, FormatKind::SuperX);
    let matches = schedule(&group, &FormatSpec::SuperX { size: 8 });
    assert_eq!(matches.len(), 14);

    for round in 1..=7 {
        let mut seen: Vec<EntrantId> = matches
            .iter()
            .filter(|m| m.group_round() == Some(round))
            .flat_map(|m| m.side_a.iter().chain(m.side_b.iter()).copied())
            .collect();
        seen.sort();
        let mut all = group.entrants.clone();
        all.sort();
        assert_eq!(seen, all, "round {round}");
    }

    for &player in &group.entrants {
        assert_eq!(matches.iter().filter(|m| m.involves(player)).count(), 7);
    }

    let (partners, opponents) = doubles_counts(&matches);
    assert_eq!(partners.len(), 28);
    assert!(partners.values().all(|&c| c == 1));
    assert!(opponents.values().all(|&c| c == 2));
}

#[test]
fn super_twelve_has_eleven_rounds_of_three() {
    let group = group_of(12, FormatKind::SuperX);
    let matches = schedule(&group, &FormatSpec::SuperX { size: 12 });
    assert_eq!(matches.len(), 33);
    assert_eq!(matches.iter().filter_map(|m| m.group_round()).max(), Some(11));
    let (partners, _) = doubles_counts(&matches);
    assert_eq!(partners.len(), 66);
}

#[test]
fn teams_play_a_single_round_robin() {
    let group = group_of(3, FormatKind::Team);
    let format = FormatSpec::Team { team_size: 4, teams_per_group: None };
    let matches = schedule(&group, &format);
    assert_eq!(matches.len(), 3);
    assert!(matches.iter().all(|m| m.side_a.len() == 1 && m.side_b.len() == 1));
}
