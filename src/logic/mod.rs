//! Stage business logic: group assignment, scheduling, standings, bracket and the phase flow.

mod assignment;
mod bracket;
mod finals;
mod formats;
mod group_play;
mod results;
mod roster;
mod schedule;
mod standings;

pub use assignment::{assign_groups, Assignment};
pub use bracket::{build_bracket, qualifiers, seed_order, Qualifier};
pub use finals::{cancel_elimination, champion, finish_after_groups, generate_elimination};
pub use formats::{
    balanced_sizes, rules_for, FixedPairRules, FormatRules, RotatingPartnerRules, SuperXRules,
    TeamRules,
};
pub use group_play::{cancel_groups, generate_groups};
pub use results::{record_result, record_walkover, start_match, winner_from_score};
pub use roster::{import_roster, parse_roster};
pub use schedule::{
    rotating_partner_fixtures, round_robin_fixtures, schedule, super_x_fixtures, Fixture,
};
pub use standings::recompute;
