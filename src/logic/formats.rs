//! Format capability set: how each format shapes entrants, sizes groups and schedules them.
//!
//! The orchestrator picks one `FormatRules` per stage via [`rules_for`]; group
//! assignment, scheduling and standings never branch on the format themselves.

use crate::logic::schedule::{
    rotating_partner_fixtures, round_robin_fixtures, super_x_fixtures, Fixture,
};
use crate::models::{
    Entrant, EntrantId, FormatKind, FormatSpec, StageError, SUPER_X_SIZES,
};
use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::HashSet;

/// Per-format rules used by assignment and scheduling.
pub trait FormatRules {
    fn kind(&self) -> FormatKind;

    /// Players each registered entrant must carry.
    fn players_per_entrant(&self) -> usize;

    /// Turn registered entrants into the entrants that occupy group positions.
    ///
    /// Identity for every format except teams. `manual_teams` is only meaningful for teams.
    fn prepare(
        &self,
        entrants: &[Entrant],
        manual_teams: Option<&[Vec<EntrantId>]>,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<Entrant>, StageError> {
        if manual_teams.is_some() {
            return Err(StageError::ManualGroupingUnsupported);
        }
        check_shape(entrants, self.players_per_entrant())?;
        Ok(entrants.to_vec())
    }

    /// Size of each group for `count` prepared entrants.
    fn group_sizes(&self, count: usize) -> Result<Vec<usize>, StageError>;

    /// Scheduling table over group positions `0..group_len`.
    fn fixtures(&self, group_len: usize) -> Vec<Fixture>;
}

/// Rules for the configured format.
pub fn rules_for(format: &FormatSpec) -> Box<dyn FormatRules> {
    match *format {
        FormatSpec::FixedPair { group_size } => Box::new(FixedPairRules { group_size }),
        FormatSpec::RotatingPartner => Box::new(RotatingPartnerRules),
        FormatSpec::SuperX { size } => Box::new(SuperXRules { size }),
        FormatSpec::Team {
            team_size,
            teams_per_group,
        } => Box::new(TeamRules {
            team_size,
            teams_per_group,
        }),
    }
}

fn check_shape(entrants: &[Entrant], players: usize) -> Result<(), StageError> {
    match entrants.iter().find(|e| e.player_count() != players) {
        Some(e) => Err(StageError::InvalidEntrant(e.id)),
        None => Ok(()),
    }
}

/// Split `count` entrants into groups of at most `max_size`, sizes differing by at most one
/// (larger groups first), with fewer groups when a group would otherwise hold a single entrant.
pub fn balanced_sizes(count: usize, max_size: usize) -> Vec<usize> {
    if count == 0 || max_size == 0 {
        return Vec::new();
    }
    let groups = count.div_ceil(max_size).min(count / 2).max(1);
    let base = count / groups;
    let extra = count % groups;
    (0..groups)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Duplas in groups of `group_size`.
pub struct FixedPairRules {
    pub group_size: usize,
}

impl FormatRules for FixedPairRules {
    fn kind(&self) -> FormatKind {
        FormatKind::FixedPair
    }

    fn players_per_entrant(&self) -> usize {
        2
    }

    fn group_sizes(&self, count: usize) -> Result<Vec<usize>, StageError> {
        if self.group_size < 2 {
            return Err(StageError::InvalidVariantSize {
                format: self.kind(),
                size: self.group_size,
            });
        }
        if count < 2 {
            return Err(StageError::InvalidEntrantCount {
                format: self.kind(),
                count,
            });
        }
        Ok(balanced_sizes(count, self.group_size))
    }

    fn fixtures(&self, group_len: usize) -> Vec<Fixture> {
        round_robin_fixtures(group_len)
    }
}

/// Rei da Praia: four players per group, partners rotate every round.
pub struct RotatingPartnerRules;

impl RotatingPartnerRules {
    pub const GROUP_SIZE: usize = 4;
    pub const MIN_PLAYERS: usize = 8;
}

impl FormatRules for RotatingPartnerRules {
    fn kind(&self) -> FormatKind {
        FormatKind::RotatingPartner
    }

    fn players_per_entrant(&self) -> usize {
        1
    }

    fn group_sizes(&self, count: usize) -> Result<Vec<usize>, StageError> {
        if count < Self::MIN_PLAYERS || count % Self::GROUP_SIZE != 0 {
            return Err(StageError::InvalidEntrantCount {
                format: self.kind(),
                count,
            });
        }
        Ok(vec![Self::GROUP_SIZE; count / Self::GROUP_SIZE])
    }

    fn fixtures(&self, _group_len: usize) -> Vec<Fixture> {
        rotating_partner_fixtures()
    }
}

/// Super-8 / Super-12: everyone in one group with a whist rotation table.
pub struct SuperXRules {
    pub size: usize,
}

impl FormatRules for SuperXRules {
    fn kind(&self) -> FormatKind {
        FormatKind::SuperX
    }

    fn players_per_entrant(&self) -> usize {
        1
    }

    fn group_sizes(&self, count: usize) -> Result<Vec<usize>, StageError> {
        if !SUPER_X_SIZES.contains(&self.size) {
            return Err(StageError::InvalidVariantSize {
                format: self.kind(),
                size: self.size,
            });
        }
        if count != self.size {
            return Err(StageError::InvalidVariantSize {
                format: self.kind(),
                size: count,
            });
        }
        Ok(vec![count])
    }

    fn fixtures(&self, group_len: usize) -> Vec<Fixture> {
        super_x_fixtures(group_len)
    }
}

/// Individuals formed into teams of `team_size`, teams play a round robin.
pub struct TeamRules {
    pub team_size: usize,
    pub teams_per_group: Option<usize>,
}

impl TeamRules {
    /// Seeded players are dealt serpentine across teams; the unseeded rest is shuffled first.
    fn form_automatic(&self, players: &[Entrant], rng: &mut dyn RngCore) -> Vec<Vec<Entrant>> {
        let team_count = players.len() / self.team_size;
        let (mut seeded, mut unseeded): (Vec<Entrant>, Vec<Entrant>) =
            players.iter().cloned().partition(|p| p.seed.is_some());
        seeded.sort_by_key(|p| p.seed_key());
        unseeded.shuffle(rng);

        let mut teams: Vec<Vec<Entrant>> = vec![Vec::with_capacity(self.team_size); team_count];
        for (i, player) in seeded.into_iter().chain(unseeded).enumerate() {
            let lap = i / team_count;
            let pos = i % team_count;
            let team = if lap % 2 == 0 { pos } else { team_count - 1 - pos };
            teams[team].push(player);
        }
        teams
    }

    /// Every registered player in exactly one team of the right size.
    fn form_manual(
        &self,
        players: &[Entrant],
        manual: &[Vec<EntrantId>],
    ) -> Result<Vec<Vec<Entrant>>, StageError> {
        let mut seen: HashSet<EntrantId> = HashSet::new();
        let mut teams = Vec::with_capacity(manual.len());
        for ids in manual {
            if ids.len() != self.team_size {
                return Err(StageError::InvalidEntrantCount {
                    format: self.kind(),
                    count: ids.len(),
                });
            }
            let mut team = Vec::with_capacity(ids.len());
            for &id in ids {
                if !seen.insert(id) {
                    return Err(StageError::DuplicateAssignment(id));
                }
                let player = players
                    .iter()
                    .find(|p| p.id == id)
                    .ok_or(StageError::EntrantNotFound(id))?;
                team.push(player.clone());
            }
            teams.push(team);
        }
        if let Some(missing) = players.iter().find(|p| !seen.contains(&p.id)) {
            return Err(StageError::DuplicateAssignment(missing.id));
        }
        Ok(teams)
    }
}

impl FormatRules for TeamRules {
    fn kind(&self) -> FormatKind {
        FormatKind::Team
    }

    fn players_per_entrant(&self) -> usize {
        1
    }

    fn prepare(
        &self,
        entrants: &[Entrant],
        manual_teams: Option<&[Vec<EntrantId>]>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Entrant>, StageError> {
        if self.team_size < 2 {
            return Err(StageError::InvalidVariantSize {
                format: self.kind(),
                size: self.team_size,
            });
        }
        check_shape(entrants, self.players_per_entrant())?;
        let count = entrants.len();
        if count % self.team_size != 0 || count / self.team_size < 2 {
            return Err(StageError::InvalidEntrantCount {
                format: self.kind(),
                count,
            });
        }

        let teams = match manual_teams {
            Some(manual) => self.form_manual(entrants, manual)?,
            None => self.form_automatic(entrants, rng),
        };

        Ok(teams
            .into_iter()
            .enumerate()
            .map(|(i, members)| {
                let players = members.into_iter().flat_map(|m| m.players).collect();
                Entrant::new(format!("Team {}", i + 1), players, Some(i as u32 + 1))
            })
            .collect())
    }

    fn group_sizes(&self, count: usize) -> Result<Vec<usize>, StageError> {
        match self.teams_per_group {
            None => Ok(vec![count]),
            Some(size) if size < 2 => Err(StageError::InvalidVariantSize {
                format: self.kind(),
                size,
            }),
            Some(size) => Ok(balanced_sizes(count, size)),
        }
    }

    fn fixtures(&self, group_len: usize) -> Vec<Fixture> {
        round_robin_fixtures(group_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_sizes_spread_overflow() {
        assert_eq!(balanced_sizes(8, 4), vec![4, 4]);
        assert_eq!(balanced_sizes(9, 4), vec![3, 3, 3]);
        assert_eq!(balanced_sizes(10, 4), vec![4, 3, 3]);
        assert_eq!(balanced_sizes(5, 4), vec![3, 2]);
    }

    #[test]
    fn balanced_sizes_never_leave_a_single_entrant() {
        assert_eq!(balanced_sizes(3, 2), vec![3]);
        for count in 2..40 {
            for max in 2..7 {
                let sizes = balanced_sizes(count, max);
                assert_eq!(sizes.iter().sum::<usize>(), count);
                assert!(sizes.iter().all(|&s| s >= 2), "{count}/{max}: {sizes:?}");
            }
        }
    }
}
