//! Group phase: generate groups with their round-robin matches, or tear them down.

use crate::logic::assignment::assign_groups;
use crate::logic::schedule::schedule;
use crate::logic::standings::recompute;
use crate::models::{
    EntrantId, FormatKind, GameMatch, GroupId, PlayerId, Stage, StageError, StageState, Standing,
};
use rand::RngCore;
use std::collections::HashMap;

/// Split the stage's entrants into groups and schedule every group (Open -> GroupsGenerated).
///
/// `manual_teams` lists teams as registered entrant ids (team formats only); `None`
/// forms teams automatically with `rng`. Validation happens before anything on the
/// stage changes, so a failed call leaves it Open and untouched.
pub fn generate_groups(
    stage: &mut Stage,
    manual_teams: Option<&[Vec<EntrantId>]>,
    rng: &mut dyn RngCore,
) -> Result<(), StageError> {
    if stage.state != StageState::Open {
        return Err(StageError::InvalidState);
    }
    stage.config.validate()?;

    let format = stage.config.format.clone();
    let assignment = assign_groups(&stage.entrants, &format, manual_teams, rng)?;

    let matches: Vec<GameMatch> = assignment
        .groups
        .iter()
        .flat_map(|g| schedule(g, &format))
        .collect();
    let standings: Vec<Standing> = assignment
        .groups
        .iter()
        .flat_map(|g| recompute(g, &matches, stage.config.points))
        .collect();

    if format.kind() == FormatKind::Team {
        let by_player: HashMap<PlayerId, GroupId> = assignment
            .entrants
            .iter()
            .flat_map(|team| team.players.iter().map(move |p| (p.id, team.group_id)))
            .filter_map(|(p, g)| g.map(|g| (p, g)))
            .collect();
        for e in &mut stage.entrants {
            e.group_id = e.players.first().and_then(|p| by_player.get(&p.id).copied());
        }
        stage.teams = assignment.entrants;
    } else {
        let by_entrant: HashMap<EntrantId, Option<GroupId>> = assignment
            .entrants
            .iter()
            .map(|e| (e.id, e.group_id))
            .collect();
        for e in &mut stage.entrants {
            e.group_id = by_entrant.get(&e.id).copied().flatten();
        }
        stage.teams.clear();
    }

    log::info!(
        "Stage {}: generated {} groups with {} matches ({})",
        stage.id,
        assignment.groups.len(),
        matches.len(),
        format.kind()
    );
    stage.groups = assignment.groups;
    stage.matches = matches;
    stage.standings = standings;
    stage.state = StageState::GroupsGenerated;
    stage.touch();
    Ok(())
}

/// Remove every group, match and standing (GroupsGenerated -> Open).
///
/// Refused with `HasResults` once any group match has a result; nothing is removed then.
pub fn cancel_groups(stage: &mut Stage) -> Result<(), StageError> {
    if stage.state != StageState::GroupsGenerated {
        return Err(StageError::InvalidState);
    }
    if stage.matches.iter().any(|m| m.status.has_result()) {
        return Err(StageError::HasResults);
    }

    stage.groups.clear();
    stage.matches.clear();
    stage.standings.clear();
    stage.teams.clear();
    for e in &mut stage.entrants {
        e.group_id = None;
    }
    stage.state = StageState::Open;
    stage.touch();
    log::info!("Stage {}: groups cancelled", stage.id);
    Ok(())
}
