//! Result recording for group and knockout matches.
//!
//! Recording is idempotent per match id: submitting the result a match already
//! has is a no-op, a different result for a decided match is `ResultConflict`.

use crate::logic::standings::recompute;
use crate::models::{
    GameMatch, GroupId, MatchId, MatchStatus, SetScore, Side, Stage, StageError, StageState,
    MAX_GAMES_PER_SET, MAX_SETS,
};
use chrono::Utc;

/// How a match was decided.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Outcome {
    Played { score: Vec<SetScore>, winner: Side },
    Walkover(Side),
}

impl Outcome {
    /// True when `m` already carries exactly this outcome.
    fn already_applied(&self, m: &GameMatch) -> bool {
        match self {
            Outcome::Played { score, .. } => m.status == MatchStatus::Finished && m.score == *score,
            Outcome::Walkover(side) => m.status == MatchStatus::Walkover && m.winner == Some(*side),
        }
    }

    fn apply(self, m: &mut GameMatch) {
        match self {
            Outcome::Played { score, winner } => {
                m.status = MatchStatus::Finished;
                m.score = score;
                m.winner = Some(winner);
            }
            Outcome::Walkover(side) => {
                m.status = MatchStatus::Walkover;
                m.score.clear();
                m.winner = Some(side);
            }
        }
        m.finished_at = Some(Utc::now());
    }
}

/// Side that won more sets. Ties, empty scores and out-of-range tallies are rejected.
pub fn winner_from_score(score: &[SetScore]) -> Result<Side, StageError> {
    let in_range = |s: &SetScore| s.a <= MAX_GAMES_PER_SET && s.b <= MAX_GAMES_PER_SET;
    if score.len() > MAX_SETS || !score.iter().all(in_range) {
        return Err(StageError::InvalidScore);
    }
    let (a, b) = score
        .iter()
        .fold((0u32, 0u32), |(a, b), set| match set.winner() {
            Some(Side::A) => (a + 1, b),
            Some(Side::B) => (a, b + 1),
            None => (a, b),
        });
    match a.cmp(&b) {
        std::cmp::Ordering::Greater => Ok(Side::A),
        std::cmp::Ordering::Less => Ok(Side::B),
        std::cmp::Ordering::Equal => Err(StageError::InvalidScore),
    }
}

/// Mark a scheduled match as being played.
pub fn start_match(stage: &mut Stage, match_id: MatchId) -> Result<(), StageError> {
    let found = stage
        .find_match(match_id)
        .ok_or(StageError::MatchNotFound(match_id))?;
    let expected = match found.group_id {
        Some(_) => StageState::GroupsGenerated,
        None => StageState::EliminationGenerated,
    };
    if stage.state != expected {
        return Err(StageError::InvalidState);
    }
    let m = match expected {
        StageState::GroupsGenerated => stage.matches.iter_mut().find(|m| m.id == match_id),
        _ => stage.bracket.as_mut().and_then(|b| b.get_match_mut(match_id)),
    }
    .ok_or(StageError::MatchNotFound(match_id))?;

    match m.status {
        MatchStatus::Scheduled => m.status = MatchStatus::InProgress,
        MatchStatus::InProgress => {}
        _ => return Err(StageError::InvalidState),
    }
    stage.touch();
    Ok(())
}

/// Record a played result. The winner is the side with more sets.
pub fn record_result(
    stage: &mut Stage,
    match_id: MatchId,
    score: Vec<SetScore>,
) -> Result<(), StageError> {
    let winner = winner_from_score(&score)?;
    decide(stage, match_id, Outcome::Played { score, winner })
}

/// Award the match to `winner` without a score.
pub fn record_walkover(stage: &mut Stage, match_id: MatchId, winner: Side) -> Result<(), StageError> {
    decide(stage, match_id, Outcome::Walkover(winner))
}

fn decide(stage: &mut Stage, match_id: MatchId, outcome: Outcome) -> Result<(), StageError> {
    let found = stage
        .find_match(match_id)
        .ok_or(StageError::MatchNotFound(match_id))?;
    match found.group_id {
        Some(_) => decide_group_match(stage, match_id, outcome),
        None => decide_bracket_match(stage, match_id, outcome),
    }
}

/// Check a match can take `outcome`. `Ok(false)` means it already has it.
fn accepts(m: &GameMatch, outcome: &Outcome) -> Result<bool, StageError> {
    if outcome.already_applied(m) {
        return Ok(false);
    }
    if m.status.is_final() {
        return Err(StageError::ResultConflict(m.id));
    }
    if m.side_a.is_empty() || m.side_b.is_empty() {
        return Err(StageError::InvalidState);
    }
    Ok(true)
}

fn decide_group_match(stage: &mut Stage, match_id: MatchId, outcome: Outcome) -> Result<(), StageError> {
    let idx = stage
        .matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or(StageError::MatchNotFound(match_id))?;
    if !accepts(&stage.matches[idx], &outcome)? {
        return Ok(());
    }
    if stage.state != StageState::GroupsGenerated {
        return Err(StageError::InvalidState);
    }

    outcome.apply(&mut stage.matches[idx]);
    if let Some(group_id) = stage.matches[idx].group_id {
        refresh_group(stage, group_id);
    }
    if stage.all_groups_complete() {
        stage.state = StageState::GroupsComplete;
        log::info!("Stage {}: all groups complete", stage.id);
    }
    stage.touch();
    Ok(())
}

/// Recompute one group's standings and completion flag.
fn refresh_group(stage: &mut Stage, group_id: GroupId) {
    let Some(pos) = stage.groups.iter().position(|g| g.id == group_id) else {
        return;
    };
    let rows = recompute(&stage.groups[pos], &stage.matches, stage.config.points);
    stage.standings.retain(|s| s.group_id != group_id);
    stage.standings.extend(rows);

    let complete = stage.group_matches(group_id).all(|m| m.status.is_final());
    let group = &mut stage.groups[pos];
    if complete && !group.complete {
        log::debug!("Group {} complete", group.label());
    }
    group.complete = complete;
}

fn decide_bracket_match(stage: &mut Stage, match_id: MatchId, outcome: Outcome) -> Result<(), StageError> {
    let Some(current) = stage.bracket.as_ref() else {
        return Err(StageError::MatchNotFound(match_id));
    };
    let m = current
        .get_match(match_id)
        .ok_or(StageError::MatchNotFound(match_id))?;
    if !accepts(m, &outcome)? {
        return Ok(());
    }
    if stage.state != StageState::EliminationGenerated {
        return Err(StageError::InvalidState);
    }

    // Work on a copy so a failed advancement leaves the bracket as it was.
    let mut bracket = current.clone();
    let game = bracket
        .get_match_mut(match_id)
        .ok_or(StageError::MatchNotFound(match_id))?;
    outcome.apply(game);
    let winner_side = game.winner.ok_or(StageError::InvalidScore)?;
    let winner = *game
        .side(winner_side)
        .first()
        .ok_or(StageError::InvalidState)?;
    let node = bracket
        .node_of(match_id, winner)
        .ok_or(StageError::EntrantNotFound(winner))?;
    bracket.advance_winner(node, winner)?;

    let champion = bracket.champion();
    stage.bracket = Some(bracket);
    if let Some(champion) = champion {
        stage.state = StageState::Finished;
        log::info!("Stage {}: finished, champion {}", stage.id, champion);
    }
    stage.touch();
    Ok(())
}
