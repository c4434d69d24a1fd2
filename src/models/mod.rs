//! Data structures for a stage: entrants, groups, matches, standings, bracket and stage state.

mod bracket;
mod entrant;
mod format;
mod game;
mod group;
mod stage;
mod standing;

pub use bracket::{Bracket, EliminationNode, EliminationPhase, Occupant};
pub use entrant::{Entrant, EntrantId, Player, PlayerId};
pub use format::{
    FormatKind, FormatSpec, StageConfig, DEFAULT_CLASSIFIERS_PER_GROUP, SUPER_X_SIZES,
};
pub use game::{
    GameMatch, MatchId, MatchStatus, RoundType, SetScore, Side, MAX_GAMES_PER_SET, MAX_SETS,
};
pub use group::{Group, GroupId};
pub use stage::{Stage, StageError, StageId, StageState};
pub use standing::{PointsRule, Standing, MAX_POINTS_PER_RESULT};
