//! Standing rows and the points rule.

use crate::models::entrant::EntrantId;
use crate::models::group::GroupId;
use serde::{Deserialize, Serialize};

/// Highest weight a single win or loss may carry.
pub const MAX_POINTS_PER_RESULT: u32 = 100;

/// Linear weighting of wins and losses into points.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PointsRule {
    pub per_win: u32,
    pub per_loss: u32,
}

impl Default for PointsRule {
    fn default() -> Self {
        Self {
            per_win: 1,
            per_loss: 0,
        }
    }
}

impl PointsRule {
    pub fn points(&self, wins: u32, losses: u32) -> u32 {
        wins.saturating_mul(self.per_win)
            .saturating_add(losses.saturating_mul(self.per_loss))
    }
}

/// One entrant's record inside a group. Derived from the group's matches.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub entrant_id: EntrantId,
    pub group_id: GroupId,
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub games_for: u32,
    pub games_against: u32,
    pub sets_for: u32,
    pub sets_against: u32,
    /// 1-based, unique within the group.
    pub rank: u32,
}

impl Standing {
    pub fn new(entrant_id: EntrantId, group_id: GroupId) -> Self {
        Self {
            entrant_id,
            group_id,
            ..Self::default()
        }
    }

    pub fn game_diff(&self) -> i64 {
        i64::from(self.games_for) - i64::from(self.games_against)
    }

    pub fn set_diff(&self) -> i64 {
        i64::from(self.sets_for) - i64::from(self.sets_against)
    }

    pub fn played(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }
}
