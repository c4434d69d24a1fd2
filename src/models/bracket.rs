//! Elimination bracket stored as a flat arena of slots.
//!
//! Round 0 holds `size` slots, each later round half as many, and the last
//! round is the single champion slot. A slot's parent is computed, never
//! pointed to: `(round, slot)` advances to `(round + 1, slot / 2)`.

use crate::models::entrant::EntrantId;
use crate::models::game::{GameMatch, MatchId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationPhase {
    /// Round of N (N slots, N >= 16).
    RoundOf(u32),
    QuarterFinal,
    SemiFinal,
    Final,
    /// The slot the final's winner lands in.
    Champion,
}

impl EliminationPhase {
    /// Phase for a round with `slots` slots.
    pub fn from_slots(slots: u32) -> Self {
        match slots {
            0 | 1 => EliminationPhase::Champion,
            2 => EliminationPhase::Final,
            4 => EliminationPhase::SemiFinal,
            8 => EliminationPhase::QuarterFinal,
            n => EliminationPhase::RoundOf(n),
        }
    }
}

/// What sits in a slot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entrant", rename_all = "snake_case")]
pub enum Occupant {
    /// Waiting for the previous round.
    #[default]
    Empty,
    Bye,
    Entrant(EntrantId),
}

impl Occupant {
    pub fn entrant(&self) -> Option<EntrantId> {
        match self {
            Occupant::Entrant(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_filled(&self) -> bool {
        !matches!(self, Occupant::Empty)
    }
}

/// One bracket slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EliminationNode {
    pub round: u32,
    pub slot: u32,
    pub phase: EliminationPhase,
    pub occupant: Occupant,
    /// Match played between this slot and its sibling, once both are filled.
    pub match_id: Option<MatchId>,
    /// Arena index of the next-round slot; None for the champion slot.
    pub advances_to: Option<usize>,
}

/// Whole knockout tree for a stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// First-round slot count, a power of two.
    pub size: u32,
    pub nodes: Vec<EliminationNode>,
    pub matches: Vec<GameMatch>,
}

impl Bracket {
    /// Empty tree for `size` first-round slots.
    pub fn empty(size: u32) -> Self {
        let size = size.max(2).next_power_of_two();
        let rounds = size.trailing_zeros();
        let mut nodes = Vec::with_capacity(2 * size as usize - 1);
        for round in 0..=rounds {
            let slots = size >> round;
            for slot in 0..slots {
                let advances_to = (round < rounds).then(|| index_of(size, round + 1, slot / 2));
                nodes.push(EliminationNode {
                    round,
                    slot,
                    phase: EliminationPhase::from_slots(slots),
                    occupant: Occupant::Empty,
                    match_id: None,
                    advances_to,
                });
            }
        }
        Self {
            size,
            nodes,
            matches: Vec::new(),
        }
    }

    /// Number of playing rounds (the champion slot is round `rounds()`).
    pub fn rounds(&self) -> u32 {
        self.size.trailing_zeros()
    }

    pub fn index(&self, round: u32, slot: u32) -> usize {
        index_of(self.size, round, slot)
    }

    pub fn node(&self, round: u32, slot: u32) -> Option<&EliminationNode> {
        if round > self.rounds() || slot >= self.size >> round {
            return None;
        }
        self.nodes.get(self.index(round, slot))
    }

    /// Arena index of the slot that plays against `index`.
    pub fn sibling(&self, index: usize) -> usize {
        let node = &self.nodes[index];
        self.index(node.round, node.slot ^ 1)
    }

    /// First-round occupants in slot order.
    pub fn first_round(&self) -> &[EliminationNode] {
        &self.nodes[..self.size as usize]
    }

    pub fn champion(&self) -> Option<EntrantId> {
        self.nodes.last().and_then(|n| n.occupant.entrant())
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }
}

/// Arena offset of round `round` is `2 * (size - (size >> round))`.
fn index_of(size: u32, round: u32, slot: u32) -> usize {
    (2 * (size - (size >> round)) + slot) as usize
}
