//! Match (game), Side, scores and RoundType.

use crate::models::bracket::EliminationPhase;
use crate::models::entrant::EntrantId;
use crate::models::group::GroupId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of the match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Finished,
    Bye,
    Cancelled,
    Walkover,
}

impl MatchStatus {
    /// No further result can be recorded.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            MatchStatus::Finished | MatchStatus::Bye | MatchStatus::Cancelled | MatchStatus::Walkover
        )
    }

    /// A result entered by the host (as opposed to a synthesized bye).
    pub fn has_result(self) -> bool {
        matches!(self, MatchStatus::Finished | MatchStatus::Walkover)
    }
}

/// Most sets a single match may report.
pub const MAX_SETS: usize = 5;

/// Highest game tally accepted for one side of a set.
pub const MAX_GAMES_PER_SET: u32 = 99;

/// Games won by each side in one set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub a: u32,
    pub b: u32,
}

impl SetScore {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }

    pub fn winner(&self) -> Option<Side> {
        match self.a.cmp(&self.b) {
            std::cmp::Ordering::Greater => Some(Side::A),
            std::cmp::Ordering::Less => Some(Side::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Where this match sits in the stage.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundType {
    /// Round robin round, 1-based.
    Group { round: u32 },
    /// Knockout round; `round` is 0 for the first bracket round.
    Elimination { round: u32, phase: EliminationPhase },
}

/// A single match between two sides. A side holds one entrant, or two in
/// rotating-partner formats where individuals are paired for the match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// None for elimination matches.
    pub group_id: Option<GroupId>,
    pub round: RoundType,
    pub side_a: Vec<EntrantId>,
    pub side_b: Vec<EntrantId>,
    pub status: MatchStatus,
    /// Set tallies in play order.
    pub score: Vec<SetScore>,
    /// None until the match is decided.
    pub winner: Option<Side>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    pub fn new(
        group_id: Option<GroupId>,
        round: RoundType,
        side_a: Vec<EntrantId>,
        side_b: Vec<EntrantId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            round,
            side_a,
            side_b,
            status: MatchStatus::Scheduled,
            score: Vec::new(),
            winner: None,
            finished_at: None,
        }
    }

    /// Synthesized advancement with no opponent. `side_b` stays empty.
    pub fn bye(round: RoundType, occupant: EntrantId) -> Self {
        Self {
            status: MatchStatus::Bye,
            winner: Some(Side::A),
            finished_at: Some(Utc::now()),
            ..Self::new(None, round, vec![occupant], Vec::new())
        }
    }

    pub fn side(&self, side: Side) -> &[EntrantId] {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn involves(&self, entrant: EntrantId) -> bool {
        self.side_a.contains(&entrant) || self.side_b.contains(&entrant)
    }

    /// Sets won by (A, B).
    pub fn sets_won(&self) -> (u32, u32) {
        self.score
            .iter()
            .fold((0, 0), |(a, b), set| match set.winner() {
                Some(Side::A) => (a + 1, b),
                Some(Side::B) => (a, b + 1),
                None => (a, b),
            })
    }

    /// Games won by (A, B) summed over every set.
    pub fn games_won(&self) -> (u32, u32) {
        self.score
            .iter()
            .fold((0u32, 0u32), |(a, b), set| {
                (a.saturating_add(set.a), b.saturating_add(set.b))
            })
    }

    pub fn group_round(&self) -> Option<u32> {
        match self.round {
            RoundType::Group { round } => Some(round),
            RoundType::Elimination { .. } => None,
        }
    }
}
