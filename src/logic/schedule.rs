//! Round-robin scheduling: fixture tables per format and match creation for a group.

use crate::logic::formats::rules_for;
use crate::models::{FormatSpec, GameMatch, Group, RoundType};

/// One match of a scheduling table, as positions inside the group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fixture {
    /// 1-based round.
    pub round: u32,
    pub side_a: Vec<usize>,
    pub side_b: Vec<usize>,
}

impl Fixture {
    fn single(round: u32, a: usize, b: usize) -> Self {
        Self {
            round,
            side_a: vec![a],
            side_b: vec![b],
        }
    }

    fn doubles(round: u32, a: [usize; 2], b: [usize; 2]) -> Self {
        Self {
            round,
            side_a: a.to_vec(),
            side_b: b.to_vec(),
        }
    }
}

/// Canonical 1-factorization of K4: AB-CD, AC-BD, AD-BC.
const K4_TABLE: [[[usize; 2]; 2]; 3] = [[[0, 1], [2, 3]], [[0, 2], [1, 3]], [[0, 3], [1, 2]]];

/// Super-8 base round over Z7 plus a fixed point (7). Developing it over 7 rounds
/// makes every pair partners once and opponents twice.
const SUPER_8_BASE: [[[usize; 2]; 2]; 2] = [[[7, 0], [1, 3]], [[2, 6], [4, 5]]];

/// Super-12 base round over Z11 plus a fixed point (11), developed over 11 rounds.
const SUPER_12_BASE: [[[usize; 2]; 2]; 3] = [
    [[11, 0], [1, 3]],
    [[2, 9], [6, 7]],
    [[4, 10], [5, 8]],
];

/// Circle-method round robin: every unordered pair once, `n - 1` rounds for even `n`
/// and `n` rounds for odd `n` (one entrant rests each round).
pub fn round_robin_fixtures(n: usize) -> Vec<Fixture> {
    if n < 2 {
        return Vec::new();
    }
    let slots = if n % 2 == 0 { n } else { n + 1 };
    let mut ring: Vec<usize> = (0..slots).collect();
    let mut fixtures = Vec::with_capacity(n * (n - 1) / 2);

    for round in 0..slots - 1 {
        for i in 0..slots / 2 {
            let (mut a, mut b) = (ring[i], ring[slots - 1 - i]);
            // Anchor alternates sides so nobody is always listed first.
            if i == 0 && round % 2 == 1 {
                std::mem::swap(&mut a, &mut b);
            }
            if a < n && b < n {
                fixtures.push(Fixture::single(round as u32 + 1, a, b));
            }
        }
        ring[1..].rotate_right(1);
    }
    fixtures
}

/// The three rounds of a four-player Rei da Praia group.
pub fn rotating_partner_fixtures() -> Vec<Fixture> {
    K4_TABLE
        .iter()
        .enumerate()
        .map(|(i, [a, b])| Fixture::doubles(i as u32 + 1, *a, *b))
        .collect()
}

/// Whist table for a supported Super-X size; empty for any other size.
pub fn super_x_fixtures(size: usize) -> Vec<Fixture> {
    match size {
        8 => develop_cyclic(&SUPER_8_BASE, size),
        12 => develop_cyclic(&SUPER_12_BASE, size),
        _ => Vec::new(),
    }
}

/// Shift every non-fixed position of the base round by the round number modulo `size - 1`.
fn develop_cyclic(base: &[[[usize; 2]; 2]], size: usize) -> Vec<Fixture> {
    let modulus = size - 1;
    let shift = |x: usize, r: usize| if x == modulus { x } else { (x + r) % modulus };
    (0..modulus)
        .flat_map(|r| {
            base.iter().map(move |[a, b]| {
                Fixture::doubles(
                    r as u32 + 1,
                    [shift(a[0], r), shift(a[1], r)],
                    [shift(b[0], r), shift(b[1], r)],
                )
            })
        })
        .collect()
}

/// Create the group's matches in `scheduled` status with an empty score.
pub fn schedule(group: &Group, format: &FormatSpec) -> Vec<GameMatch> {
    let rules = rules_for(format);
    let resolve = |positions: &[usize]| -> Vec<_> {
        positions
            .iter()
            .filter_map(|&p| group.entrants.get(p).copied())
            .collect()
    };
    let matches: Vec<GameMatch> = rules
        .fixtures(group.entrants.len())
        .iter()
        .map(|f| {
            GameMatch::new(
                Some(group.id),
                RoundType::Group { round: f.round },
                resolve(&f.side_a),
                resolve(&f.side_b),
            )
        })
        .collect();
    log::debug!(
        "Scheduled {} matches for group {} ({} entrants)",
        matches.len(),
        group.label(),
        group.entrants.len()
    );
    matches
}
