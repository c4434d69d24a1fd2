//! Stage (etapa) and StageState.

use crate::models::bracket::Bracket;
use crate::models::entrant::{Entrant, EntrantId};
use crate::models::format::{FormatKind, StageConfig};
use crate::models::game::{GameMatch, MatchId};
use crate::models::group::{Group, GroupId};
use crate::models::standing::Standing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Errors that can occur during stage operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
    /// Entrant count does not fit the format.
    InvalidEntrantCount { format: FormatKind, count: usize },
    /// Format parameter (Super-X size, group size, team size, classifiers) is not supported.
    InvalidVariantSize { format: FormatKind, size: usize },
    /// Entrant has the wrong number of players for the format.
    InvalidEntrant(EntrantId),
    /// Elimination requested while group matches are still open.
    GroupsIncomplete,
    /// Fewer than 2 groups sent qualifiers.
    InsufficientGroups { contributing: usize },
    /// Cancellation requested after results were recorded.
    HasResults,
    /// Manual team formation repeats or omits this entrant.
    DuplicateAssignment(EntrantId),
    /// Stage is not in a state that allows this action.
    InvalidState,
    EntrantNotFound(EntrantId),
    MatchNotFound(MatchId),
    /// A display name already exists (names are unique, case-insensitive).
    DuplicateEntrantName,
    /// Score is empty, has no set winner, or reports an impossible tally.
    InvalidScore,
    /// Points weights are out of range or reward a loss over a win.
    InvalidPointsRule { per_win: u32, per_loss: u32 },
    /// Match already finished with a different result.
    ResultConflict(MatchId),
    /// Bracket slot already holds an occupant.
    SlotOccupied { round: u32, slot: u32 },
    /// Manual team formation passed for a format without teams.
    ManualGroupingUnsupported,
    /// Roster CSV could not be read.
    InvalidRoster { line: u64, reason: String },
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::InvalidEntrantCount { format, count } => {
                write!(f, "{} entrants cannot be split into {} groups", count, format)
            }
            StageError::InvalidVariantSize { format, size } => {
                write!(f, "Size {} is not supported for {}", size, format)
            }
            StageError::InvalidEntrant(_) => write!(f, "Entrant has the wrong number of players for this format"),
            StageError::GroupsIncomplete => write!(f, "Not all group matches are finished"),
            StageError::InsufficientGroups { contributing } => {
                write!(f, "Need qualifiers from at least 2 groups (got {})", contributing)
            }
            StageError::HasResults => write!(f, "Results have already been recorded"),
            StageError::DuplicateAssignment(_) => {
                write!(f, "Team formation must use every player exactly once")
            }
            StageError::InvalidState => write!(f, "Invalid state for this action"),
            StageError::EntrantNotFound(_) => write!(f, "Entrant not found"),
            StageError::MatchNotFound(_) => write!(f, "Match not found"),
            StageError::DuplicateEntrantName => write!(f, "An entrant with this name already exists"),
            StageError::InvalidScore => write!(f, "Score must have a winner and realistic set tallies"),
            StageError::InvalidPointsRule { per_win, per_loss } => {
                write!(f, "Points rule {}/{} is not allowed", per_win, per_loss)
            }
            StageError::ResultConflict(_) => {
                write!(f, "Match already has a different result")
            }
            StageError::SlotOccupied { round, slot } => {
                write!(f, "Bracket slot {} of round {} is already filled", slot, round)
            }
            StageError::ManualGroupingUnsupported => {
                write!(f, "Manual team formation is only available for team formats")
            }
            StageError::InvalidRoster { line, reason } => {
                write!(f, "Roster line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for StageError {}

/// Unique identifier for a stage.
pub type StageId = Uuid;

/// Current phase of the stage.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    /// Collecting entrants; configuration can change.
    #[default]
    Open,
    /// Groups and round-robin matches exist; results being recorded.
    GroupsGenerated,
    /// Every group match is final.
    GroupsComplete,
    /// Knockout bracket exists.
    EliminationGenerated,
    Finished,
}

/// Full stage state: entrants, groups, matches, standings, bracket and phase.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub config: StageConfig,
    pub state: StageState,
    /// Registered entrants in registration order.
    pub entrants: Vec<Entrant>,
    /// Team entrants formed at group generation (team formats only).
    pub teams: Vec<Entrant>,
    pub groups: Vec<Group>,
    /// Group-phase matches.
    pub matches: Vec<GameMatch>,
    pub standings: Vec<Standing>,
    pub bracket: Option<Bracket>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stage {
    /// Create a new stage in Open state with no entrants.
    pub fn new(name: impl Into<String>, config: StageConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            config,
            state: StageState::Open,
            entrants: Vec::new(),
            teams: Vec::new(),
            groups: Vec::new(),
            matches: Vec::new(),
            standings: Vec::new(),
            bracket: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a stage with initial entrants. Still Open until groups are generated.
    pub fn with_entrants(name: impl Into<String>, config: StageConfig, entrants: Vec<Entrant>) -> Self {
        Self {
            entrants,
            ..Self::new(name, config)
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Replace the configuration (only valid while Open).
    pub fn set_config(&mut self, config: StageConfig) -> Result<(), StageError> {
        if self.state != StageState::Open {
            return Err(StageError::InvalidState);
        }
        config.validate()?;
        self.config = config;
        self.touch();
        Ok(())
    }

    /// Register an entrant (only valid while Open). Names must be unique (case-insensitive).
    pub fn add_entrant(&mut self, mut entrant: Entrant) -> Result<EntrantId, StageError> {
        if self.state != StageState::Open {
            return Err(StageError::InvalidState);
        }
        let name = entrant.display_name.trim().to_string();
        if name.is_empty() || entrant.players.is_empty() {
            return Err(StageError::InvalidEntrant(entrant.id));
        }
        let is_duplicate = self
            .entrants
            .iter()
            .any(|e| e.display_name.eq_ignore_ascii_case(&name));
        if is_duplicate {
            return Err(StageError::DuplicateEntrantName);
        }
        entrant.display_name = name;
        entrant.group_id = None;
        let id = entrant.id;
        self.entrants.push(entrant);
        self.touch();
        Ok(id)
    }

    /// Withdraw an entrant by id (only valid while Open).
    pub fn remove_entrant(&mut self, entrant_id: EntrantId) -> Result<(), StageError> {
        if self.state != StageState::Open {
            return Err(StageError::InvalidState);
        }
        let idx = self
            .entrants
            .iter()
            .position(|e| e.id == entrant_id)
            .ok_or(StageError::EntrantNotFound(entrant_id))?;
        self.entrants.remove(idx);
        self.touch();
        Ok(())
    }

    /// Look up whoever occupies group positions: a registered entrant or a formed team.
    pub fn participant(&self, id: EntrantId) -> Option<&Entrant> {
        self.entrants
            .iter()
            .chain(self.teams.iter())
            .find(|e| e.id == id)
    }

    /// Any match of the stage, group phase or bracket.
    pub fn find_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .or_else(|| self.bracket.as_ref().and_then(|b| b.get_match(id)))
    }

    pub fn group_matches(&self, group_id: GroupId) -> impl Iterator<Item = &GameMatch> {
        self.matches
            .iter()
            .filter(move |m| m.group_id == Some(group_id))
    }

    /// Standings of one group ordered by rank.
    pub fn standings_for(&self, group_id: GroupId) -> Vec<Standing> {
        let mut rows: Vec<Standing> = self
            .standings
            .iter()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.rank);
        rows
    }

    /// Standings keyed by group.
    pub fn standings_by_group(&self) -> HashMap<GroupId, Vec<Standing>> {
        self.groups
            .iter()
            .map(|g| (g.id, self.standings_for(g.id)))
            .collect()
    }

    pub fn all_groups_complete(&self) -> bool {
        !self.groups.is_empty() && self.groups.iter().all(|g| g.complete)
    }
}
