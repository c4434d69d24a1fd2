//! Roster import from CSV: `name,seed,member...` with a header row.
//!
//! An empty seed column means unseeded. Member columns become the entrant's
//! players; a row without members is an individual named after the entrant.

use crate::models::{Entrant, Player, Stage, StageError};
use std::io::Read;

/// Parse every row into an entrant. Stops at the first bad row.
pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<Entrant>, StageError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entrants = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| StageError::InvalidRoster {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let name = record.get(0).unwrap_or_default();
        if name.is_empty() {
            return Err(StageError::InvalidRoster {
                line,
                reason: "missing name".to_string(),
            });
        }
        let seed = match record.get(1).unwrap_or_default() {
            "" => None,
            s => Some(s.parse::<u32>().map_err(|_| StageError::InvalidRoster {
                line,
                reason: format!("invalid seed '{}'", s),
            })?),
        };
        let players: Vec<Player> = record
            .iter()
            .skip(2)
            .filter(|m| !m.is_empty())
            .map(Player::new)
            .collect();

        entrants.push(if players.is_empty() {
            Entrant::individual(name, seed)
        } else {
            Entrant::new(name, players, seed)
        });
    }
    Ok(entrants)
}

/// Register every roster row on an Open stage. All rows are added or none.
pub fn import_roster<R: Read>(stage: &mut Stage, reader: R) -> Result<usize, StageError> {
    let entrants = parse_roster(reader)?;
    let mut staged = stage.clone();
    for entrant in entrants.iter().cloned() {
        staged.add_entrant(entrant)?;
    }
    *stage = staged;
    log::info!("Stage {}: imported {} entrants", stage.id, entrants.len());
    Ok(entrants.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_with_members_become_pairs() {
        let csv = "name,seed,a,b\nAna / Bia,1,Ana,Bia\nCaio,,\n";
        let entrants = parse_roster(csv.as_bytes()).unwrap();
        assert_eq!(entrants.len(), 2);
        assert_eq!(entrants[0].player_count(), 2);
        assert_eq!(entrants[0].seed, Some(1));
        assert_eq!(entrants[1].player_count(), 1);
        assert_eq!(entrants[1].players[0].name, "Caio");
        assert_eq!(entrants[1].seed, None);
    }

    #[test]
    fn bad_seed_reports_line() {
        let csv = "name,seed\nAna,first\n";
        match parse_roster(csv.as_bytes()) {
            Err(StageError::InvalidRoster { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
