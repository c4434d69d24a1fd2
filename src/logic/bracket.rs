//! Elimination bracket: qualify, seed, place BYEs and advance winners.

use crate::models::{
    Bracket, EntrantId, GameMatch, Group, GroupId, MatchId, Occupant, RoundType, StageError,
    Standing,
};
use std::collections::HashMap;

/// An entrant going through to the knockout phase.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Qualifier {
    pub entrant_id: EntrantId,
    pub group_id: GroupId,
    pub group_ordinal: u32,
    pub group_rank: u32,
    /// 1-based bracket seed.
    pub seed: u32,
}

/// Top `classifiers_per_group` of every group, seeded by (group rank, group ordinal).
///
/// A group with fewer standings than `classifiers_per_group` sends what it has.
pub fn qualifiers(
    groups: &[Group],
    standings: &HashMap<GroupId, Vec<Standing>>,
    classifiers_per_group: usize,
) -> Result<Vec<Qualifier>, StageError> {
    if groups.iter().any(|g| !g.complete) {
        return Err(StageError::GroupsIncomplete);
    }

    let mut ordered: Vec<&Group> = groups.iter().collect();
    ordered.sort_by_key(|g| g.ordinal);

    let mut out = Vec::new();
    let mut contributing = 0;
    for group in ordered {
        let mut rows: Vec<&Standing> = standings
            .get(&group.id)
            .map(|rows| rows.iter().collect())
            .unwrap_or_default();
        rows.sort_by_key(|s| s.rank);
        let before = out.len();
        out.extend(rows.into_iter().take(classifiers_per_group).map(|s| Qualifier {
            entrant_id: s.entrant_id,
            group_id: group.id,
            group_ordinal: group.ordinal,
            group_rank: s.rank,
            seed: 0,
        }));
        if out.len() > before {
            contributing += 1;
        }
    }
    if contributing < 2 {
        return Err(StageError::InsufficientGroups { contributing });
    }

    out.sort_by_key(|q| (q.group_rank, q.group_ordinal));
    for (i, q) in out.iter_mut().enumerate() {
        q.seed = i as u32 + 1;
    }
    Ok(out)
}

/// Seed sitting in each first-round slot of a standard seeded bracket:
/// 1 meets `size`, and the top two seeds can only meet in the final.
pub fn seed_order(size: u32) -> Vec<u32> {
    let mut order = vec![1u32];
    while (order.len() as u32) < size {
        let n = order.len() as u32 * 2;
        order = order.iter().flat_map(|&s| [s, n + 1 - s]).collect();
    }
    order
}

/// Build the knockout tree from final group standings.
///
/// Seeds past the qualifier count become BYEs, so byes land on the top seeds.
/// When two qualifiers from the same group would meet in round one, the lower
/// seed swaps with a same-rank qualifier from another pairing if one exists.
pub fn build_bracket(
    groups: &[Group],
    standings: &HashMap<GroupId, Vec<Standing>>,
    classifiers_per_group: usize,
) -> Result<Bracket, StageError> {
    let qualified = qualifiers(groups, standings, classifiers_per_group)?;
    let size = (qualified.len() as u32).max(2).next_power_of_two();

    let mut slots: Vec<Option<usize>> = seed_order(size)
        .into_iter()
        .map(|seed| (seed as usize <= qualified.len()).then(|| seed as usize - 1))
        .collect();
    avoid_same_group(&mut slots, &qualified);

    let mut bracket = Bracket::empty(size);
    for (slot, occupant) in slots.iter().enumerate() {
        let occupant = match occupant {
            Some(q) => Occupant::Entrant(qualified[*q].entrant_id),
            None => Occupant::Bye,
        };
        bracket.place(slot, occupant)?;
    }
    log::debug!(
        "Bracket of {} built for {} qualifiers ({} byes)",
        size,
        qualified.len(),
        size as usize - qualified.len()
    );
    Ok(bracket)
}

fn same_group(slots: &[Option<usize>], qualified: &[Qualifier], a: usize, b: usize) -> bool {
    match (slots[a], slots[b]) {
        (Some(x), Some(y)) => qualified[x].group_id == qualified[y].group_id,
        _ => false,
    }
}

fn avoid_same_group(slots: &mut [Option<usize>], qualified: &[Qualifier]) {
    for pair in 0..slots.len() / 2 {
        let (left, right) = (2 * pair, 2 * pair + 1);
        if !same_group(slots, qualified, left, right) {
            continue;
        }
        let (Some(l), Some(r)) = (slots[left], slots[right]) else {
            continue;
        };
        let (mover, keeper) = if qualified[l].seed > qualified[r].seed {
            (left, right)
        } else {
            (right, left)
        };
        let Some(moving) = slots[mover] else {
            continue;
        };
        let keeper_group = slots[keeper].map(|k| qualified[k].group_id);

        let candidate = (0..slots.len())
            .filter(|&s| s / 2 != pair)
            .filter_map(|s| slots[s].map(|q| (s, q)))
            .filter(|&(s, q)| {
                let other = &qualified[q];
                let sibling_group = slots[s ^ 1].map(|x| qualified[x].group_id);
                other.group_rank == qualified[moving].group_rank
                    && Some(other.group_id) != keeper_group
                    && sibling_group != Some(qualified[moving].group_id)
            })
            .min_by_key(|&(s, q)| (qualified[q].seed.abs_diff(qualified[moving].seed), s));

        if let Some((s, _)) = candidate {
            slots.swap(mover, s);
        } else {
            log::debug!("No alternative placement for same-group pairing in slot pair {}", pair);
        }
    }
}

impl Bracket {
    /// Copy `winner` from `node` into the next-round slot.
    ///
    /// When the sibling slot is already filled the next match is opened; against
    /// a BYE the winner keeps moving up with a `bye` match recorded.
    pub fn advance_winner(&mut self, node: usize, winner: EntrantId) -> Result<(), StageError> {
        let from = self.nodes.get(node).ok_or(StageError::InvalidState)?;
        if from.occupant != Occupant::Entrant(winner) {
            return Err(StageError::EntrantNotFound(winner));
        }
        let target = from.advances_to.ok_or(StageError::InvalidState)?;
        self.place(target, Occupant::Entrant(winner))
    }

    /// Slot holding `entrant` for the match `match_id`.
    pub fn node_of(&self, match_id: MatchId, entrant: EntrantId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.match_id == Some(match_id) && n.occupant == Occupant::Entrant(entrant))
    }

    /// True once any knockout match has a recorded result (byes do not count).
    pub fn has_results(&self) -> bool {
        self.matches.iter().any(|m| m.status.has_result())
    }

    fn place(&mut self, index: usize, occupant: Occupant) -> Result<(), StageError> {
        let node = &mut self.nodes[index];
        if node.occupant.is_filled() {
            return Err(StageError::SlotOccupied {
                round: node.round,
                slot: node.slot,
            });
        }
        node.occupant = occupant;
        if node.advances_to.is_none() {
            if let Occupant::Entrant(id) = occupant {
                log::info!("Bracket won by {}", id);
            }
            return Ok(());
        }
        if self.nodes[self.sibling(index)].occupant.is_filled() {
            self.open_match(index)?;
        }
        Ok(())
    }

    /// Both slots of the pairing containing `index` are filled: create its match.
    fn open_match(&mut self, index: usize) -> Result<(), StageError> {
        let node = &self.nodes[index];
        let left = self.index(node.round, node.slot & !1);
        let right = left + 1;
        let parent = node.advances_to.ok_or(StageError::InvalidState)?;
        let round = RoundType::Elimination {
            round: node.round,
            phase: node.phase,
        };

        let (game, advancing) = match (self.nodes[left].occupant, self.nodes[right].occupant) {
            (Occupant::Entrant(a), Occupant::Entrant(b)) => {
                (Some(GameMatch::new(None, round, vec![a], vec![b])), None)
            }
            (Occupant::Entrant(x), Occupant::Bye) | (Occupant::Bye, Occupant::Entrant(x)) => {
                (Some(GameMatch::bye(round, x)), Some(Occupant::Entrant(x)))
            }
            (Occupant::Bye, Occupant::Bye) => (None, Some(Occupant::Bye)),
            _ => (None, None),
        };

        if let Some(game) = game {
            self.nodes[left].match_id = Some(game.id);
            self.nodes[right].match_id = Some(game.id);
            self.matches.push(game);
        }
        match advancing {
            Some(occupant) => self.place(parent, occupant),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_order_pairs_top_with_bottom() {
        assert_eq!(seed_order(2), vec![1, 2]);
        assert_eq!(seed_order(4), vec![1, 4, 2, 3]);
        assert_eq!(seed_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
        for size in [2u32, 4, 8, 16, 32] {
            let order = seed_order(size);
            for pair in order.chunks(2) {
                assert_eq!(pair[0] + pair[1], size + 1);
            }
        }
    }
}
