//! Beach tennis stage organizer: library with models and the chaveamento engine.

pub mod logic;
pub mod models;

pub use logic::{
    assign_groups, build_bracket, cancel_elimination, cancel_groups, champion,
    finish_after_groups, generate_elimination, generate_groups, import_roster, parse_roster,
    recompute, record_result, record_walkover, schedule, start_match, Assignment,
};
pub use models::{
    Bracket, EliminationNode, EliminationPhase, Entrant, EntrantId, FormatKind, FormatSpec,
    GameMatch, Group, GroupId, MatchId, MatchStatus, Occupant, Player, PlayerId, PointsRule,
    RoundType, SetScore, Side, Stage, StageConfig, StageError, StageId, StageState, Standing,
};
