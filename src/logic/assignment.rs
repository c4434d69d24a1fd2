//! Group assignment: split validated entrants into groups for the configured format.

use crate::logic::formats::rules_for;
use crate::models::{Entrant, EntrantId, FormatSpec, Group, StageError};
use rand::RngCore;

/// Groups plus the entrants that occupy them, each with `group_id` set.
///
/// For team formats the entrants are the newly formed teams; otherwise they are
/// copies of the input entrants.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub groups: Vec<Group>,
    pub entrants: Vec<Entrant>,
}

/// Partition `entrants` into groups.
///
/// Entrants are ordered by seed (unseeded last, registration order kept for ties)
/// and dealt serpentine across groups, skipping groups that are already full.
/// Nothing is returned on error, so callers never see a partial split.
pub fn assign_groups(
    entrants: &[Entrant],
    format: &FormatSpec,
    manual_teams: Option<&[Vec<EntrantId>]>,
    rng: &mut dyn RngCore,
) -> Result<Assignment, StageError> {
    let rules = rules_for(format);
    let mut prepared = rules.prepare(entrants, manual_teams, rng)?;
    let sizes = rules.group_sizes(prepared.len())?;

    let mut order: Vec<usize> = (0..prepared.len()).collect();
    order.sort_by_key(|&i| prepared[i].seed_key());

    let mut groups: Vec<Group> = sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| Group::new(i as u32 + 1, rules.kind(), Vec::with_capacity(size)))
        .collect();

    let mut pending = order.into_iter();
    let mut lap = 0usize;
    'deal: loop {
        let sweep: Vec<usize> = if lap % 2 == 0 {
            (0..groups.len()).collect()
        } else {
            (0..groups.len()).rev().collect()
        };
        for g in sweep {
            if groups[g].entrants.len() >= sizes[g] {
                continue;
            }
            let Some(i) = pending.next() else {
                break 'deal;
            };
            groups[g].entrants.push(prepared[i].id);
            prepared[i].group_id = Some(groups[g].id);
        }
        if groups.iter().zip(&sizes).all(|(g, &s)| g.entrants.len() >= s) {
            break;
        }
        lap += 1;
    }

    for g in &groups {
        log::debug!("Group {}: {} entrants", g.label(), g.entrants.len());
    }
    Ok(Assignment {
        groups,
        entrants: prepared,
    })
}
