//! Elimination phase: build the bracket from group standings, cancel it, or close a
//! single-group stage without one.

use crate::logic::bracket::build_bracket;
use crate::models::{EntrantId, Stage, StageError, StageState};

/// Seed the knockout bracket from final standings (GroupsComplete -> EliminationGenerated).
pub fn generate_elimination(stage: &mut Stage) -> Result<(), StageError> {
    match stage.state {
        StageState::GroupsComplete => {}
        StageState::GroupsGenerated => return Err(StageError::GroupsIncomplete),
        _ => return Err(StageError::InvalidState),
    }
    let standings = stage.standings_by_group();
    let bracket = build_bracket(
        &stage.groups,
        &standings,
        stage.config.classifiers_per_group,
    )?;

    log::info!(
        "Stage {}: elimination generated, bracket of {} with {} matches open",
        stage.id,
        bracket.size,
        bracket.matches.len()
    );
    stage.bracket = Some(bracket);
    stage.state = StageState::EliminationGenerated;
    stage.touch();
    Ok(())
}

/// Drop the whole bracket (EliminationGenerated -> GroupsComplete).
///
/// All or nothing: once any knockout match has a result the call fails with
/// `HasResults` and every node stays as it was.
pub fn cancel_elimination(stage: &mut Stage) -> Result<(), StageError> {
    match stage.state {
        StageState::EliminationGenerated => {}
        StageState::Finished if stage.bracket.is_some() => return Err(StageError::HasResults),
        _ => return Err(StageError::InvalidState),
    }
    if stage.bracket.as_ref().is_some_and(|b| b.has_results()) {
        return Err(StageError::HasResults);
    }
    stage.bracket = None;
    stage.state = StageState::GroupsComplete;
    stage.touch();
    log::info!("Stage {}: elimination cancelled", stage.id);
    Ok(())
}

/// Close a single-group stage (Super-X) once its matches are done (GroupsComplete -> Finished).
pub fn finish_after_groups(stage: &mut Stage) -> Result<(), StageError> {
    if stage.state != StageState::GroupsComplete || stage.groups.len() != 1 {
        return Err(StageError::InvalidState);
    }
    stage.state = StageState::Finished;
    stage.touch();
    log::info!("Stage {}: finished after group play", stage.id);
    Ok(())
}

/// Winner of a finished stage: the bracket champion, or the leader of a single group.
pub fn champion(stage: &Stage) -> Option<EntrantId> {
    if stage.state != StageState::Finished {
        return None;
    }
    match &stage.bracket {
        Some(bracket) => bracket.champion(),
        None => stage
            .groups
            .first()
            .and_then(|g| stage.standings_for(g.id).first().map(|s| s.entrant_id)),
    }
}
