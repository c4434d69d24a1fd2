//! Player and Entrant data structures.

use crate::models::group::GroupId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player.
pub type PlayerId = Uuid;

/// Unique identifier for an entrant (individual, pair or team).
pub type EntrantId = Uuid;

/// A person playing in the stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Something that occupies a group position: one player, a fixed pair (dupla) or a team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: EntrantId,
    pub display_name: String,
    pub players: Vec<Player>,
    /// External ranking; lower is stronger. `None` sorts after every seeded entrant.
    #[serde(default)]
    pub seed: Option<u32>,
    /// Set by group assignment.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl Entrant {
    /// Build an entrant from an explicit list of players.
    pub fn new(display_name: impl Into<String>, players: Vec<Player>, seed: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            players,
            seed,
            group_id: None,
        }
    }

    /// An individual entrant whose single player carries the display name.
    pub fn individual(name: impl Into<String>, seed: Option<u32>) -> Self {
        let name = name.into();
        let player = Player::new(name.clone());
        Self::new(name, vec![player], seed)
    }

    /// A fixed pair named "A / B".
    pub fn pair(a: impl Into<String>, b: impl Into<String>, seed: Option<u32>) -> Self {
        let (a, b) = (Player::new(a), Player::new(b));
        let name = format!("{} / {}", a.name, b.name);
        Self::new(name, vec![a, b], seed)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Seeded entrants first by seed, then unseeded; ties keep caller order.
    pub fn seed_key(&self) -> (bool, u32) {
        match self.seed {
            Some(s) => (false, s),
            None => (true, 0),
        }
    }
}
