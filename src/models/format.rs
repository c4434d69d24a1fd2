//! Format variants and per-stage configuration.

use crate::models::stage::StageError;
use crate::models::standing::{PointsRule, MAX_POINTS_PER_RESULT};
use serde::{Deserialize, Serialize};

/// Super-X sizes that have a scheduling table.
pub const SUPER_X_SIZES: [usize; 2] = [8, 12];

/// Default number of entrants each group sends to the elimination phase.
pub const DEFAULT_CLASSIFIERS_PER_GROUP: usize = 2;

/// Tag stored on groups.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    FixedPair,
    RotatingPartner,
    SuperX,
    Team,
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatKind::FixedPair => write!(f, "duplas"),
            FormatKind::RotatingPartner => write!(f, "rei da praia"),
            FormatKind::SuperX => write!(f, "super-x"),
            FormatKind::Team => write!(f, "times"),
        }
    }
}

/// Format selected for a stage, with its parameters.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatSpec {
    /// Fixed pairs (duplas), groups of `group_size`.
    FixedPair { group_size: usize },
    /// Rei da Praia: individuals in groups of 4, partners rotate each round.
    RotatingPartner,
    /// One group of exactly `size` individuals with a partner-rotation table.
    SuperX { size: usize },
    /// Individuals formed into teams of `team_size`; `None` plays all teams in one group.
    Team {
        team_size: usize,
        #[serde(default)]
        teams_per_group: Option<usize>,
    },
}

impl Default for FormatSpec {
    fn default() -> Self {
        FormatSpec::FixedPair { group_size: 4 }
    }
}

impl FormatSpec {
    pub fn kind(&self) -> FormatKind {
        match self {
            FormatSpec::FixedPair { .. } => FormatKind::FixedPair,
            FormatSpec::RotatingPartner => FormatKind::RotatingPartner,
            FormatSpec::SuperX { .. } => FormatKind::SuperX,
            FormatSpec::Team { .. } => FormatKind::Team,
        }
    }
}

fn default_classifiers() -> usize {
    DEFAULT_CLASSIFIERS_PER_GROUP
}

/// Everything the caller configures for one stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub format: FormatSpec,
    #[serde(default = "default_classifiers")]
    pub classifiers_per_group: usize,
    #[serde(default)]
    pub points: PointsRule,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            format: FormatSpec::default(),
            classifiers_per_group: DEFAULT_CLASSIFIERS_PER_GROUP,
            points: PointsRule::default(),
        }
    }
}

impl StageConfig {
    pub fn with_format(format: FormatSpec) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Reject points weights that would overflow or reward losing.
    pub fn validate(&self) -> Result<(), StageError> {
        let PointsRule { per_win, per_loss } = self.points;
        if per_win > MAX_POINTS_PER_RESULT || per_loss > per_win {
            return Err(StageError::InvalidPointsRule { per_win, per_loss });
        }
        Ok(())
    }
}
