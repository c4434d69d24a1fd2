//! Group of entrants playing a round robin.

use crate::models::entrant::EntrantId;
use crate::models::format::FormatKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// 1-based position among the stage's groups (group "A" is 1).
    pub ordinal: u32,
    pub format: FormatKind,
    /// Entrants in seed/registration order. This order is the last standings tie-break.
    pub entrants: Vec<EntrantId>,
    /// True once every match of the group is final.
    pub complete: bool,
}

impl Group {
    pub fn new(ordinal: u32, format: FormatKind, entrants: Vec<EntrantId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ordinal,
            format,
            entrants,
            complete: false,
        }
    }

    /// Letter label for display: 1 -> "A", 2 -> "B", ... past "Z" falls back to the number.
    pub fn label(&self) -> String {
        match self.ordinal {
            n @ 1..=26 => char::from(b'A' + (n - 1) as u8).to_string(),
            n => n.to_string(),
        }
    }

    /// Position of an entrant inside the group.
    pub fn position_of(&self, entrant: EntrantId) -> Option<usize> {
        self.entrants.iter().position(|e| *e == entrant)
    }
}
