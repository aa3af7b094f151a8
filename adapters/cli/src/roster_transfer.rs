use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use skirmish_core::{CellCoord, Event, Faction, UnitKind};
use skirmish_system_deployment::{Deployment, DeploymentError};
use skirmish_world::{query, World};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "skirmish";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded roster payload.
pub(crate) const SNAPSHOT_HEADER: &str = "skirmish:v1";
/// Delimiter used to separate the prefix, board dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Deployed army of one faction, exchangeable as a single line of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RosterSnapshot {
    /// Edge length of the board the roster was deployed on.
    pub(crate) size: u32,
    /// Side the roster fights for.
    pub(crate) faction: Faction,
    /// Units composing the roster, in deployment order.
    pub(crate) units: Vec<RosterEntry>,
}

/// One deployed unit captured within a roster snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RosterEntry {
    /// Archetype of the unit.
    pub(crate) kind: UnitKind,
    /// Tile the unit stands on.
    pub(crate) cell: CellCoord,
}

#[derive(Serialize, Deserialize)]
struct SerializableRoster {
    faction: Faction,
    units: Vec<RosterEntry>,
}

impl RosterSnapshot {
    /// Captures every unit `faction` currently has on the board.
    pub(crate) fn capture(world: &World, faction: Faction) -> Self {
        let units = query::units(world)
            .into_iter()
            .filter(|unit| unit.faction == faction)
            .map(|unit| RosterEntry {
                kind: unit.kind,
                cell: unit.cell,
            })
            .collect();
        Self {
            size: query::battlefield(world).size(),
            faction,
            units,
        }
    }

    /// Places the roster through a fresh deployment ledger with `budget` points.
    ///
    /// Entries the ledger refuses are skipped and returned alongside the entry.
    pub(crate) fn deploy(
        &self,
        world: &mut World,
        budget: u32,
        out_events: &mut Vec<Event>,
    ) -> Vec<(RosterEntry, DeploymentError)> {
        let mut ledger = Deployment::new(self.faction, budget);
        self.units
            .iter()
            .filter_map(|entry| {
                ledger
                    .place_for_player(world, entry.kind.id(), entry.cell, out_events)
                    .err()
                    .map(|error| (*entry, error))
            })
            .collect()
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, RosterTransferError> {
        let payload = SerializableRoster {
            faction: self.faction,
            units: self.units.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(RosterTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{SNAPSHOT_HEADER}:{0}x{0}:{encoded}", self.size))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, RosterTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RosterTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(RosterTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(RosterTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(RosterTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(RosterTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(RosterTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(RosterTransferError::UnsupportedVersion(version.to_owned()));
        }

        let size = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: SerializableRoster =
            serde_json::from_slice(&bytes).map_err(RosterTransferError::InvalidPayload)?;

        Ok(Self {
            size,
            faction: decoded.faction,
            units: decoded.units,
        })
    }
}

/// Errors that can occur while encoding or decoding roster transfer strings.
#[derive(Debug, Error)]
pub(crate) enum RosterTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("roster string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("roster string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("roster string is missing the version")]
    MissingVersion,
    /// The board dimensions were missing.
    #[error("roster string is missing the board dimensions")]
    MissingDimensions,
    /// The payload segment was missing.
    #[error("roster string is missing the payload")]
    MissingPayload,
    /// The string used an unexpected prefix segment.
    #[error("roster prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The string used an unsupported version identifier.
    #[error("roster version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The board dimensions could not be parsed, or the board is not square.
    #[error("could not parse board dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode roster payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse roster payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<u32, RosterTransferError> {
    let invalid = || RosterTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || columns != rows {
        return Err(invalid());
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_world as world;

    fn crown_roster() -> RosterSnapshot {
        RosterSnapshot {
            size: 16,
            faction: Faction::A,
            units: vec![
                RosterEntry {
                    kind: UnitKind::Knight,
                    cell: CellCoord::new(12, 7),
                },
                RosterEntry {
                    kind: UnitKind::Archer,
                    cell: CellCoord::new(14, 3),
                },
            ],
        }
    }

    #[test]
    fn encoded_roster_decodes_to_the_same_army() {
        let snapshot = crown_roster();
        let encoded = snapshot.encode().expect("roster encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:16x16:")));

        let decoded = RosterSnapshot::decode(&encoded).expect("roster decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert!(matches!(
            RosterSnapshot::decode("   "),
            Err(RosterTransferError::EmptyPayload)
        ));
        assert!(matches!(
            RosterSnapshot::decode("legion:v1:16x16:e30"),
            Err(RosterTransferError::InvalidPrefix(prefix)) if prefix == "legion"
        ));
        assert!(matches!(
            RosterSnapshot::decode("skirmish:v2:16x16:e30"),
            Err(RosterTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            RosterSnapshot::decode("skirmish:v1:16x8:e30"),
            Err(RosterTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            RosterSnapshot::decode("skirmish:v1:16x16"),
            Err(RosterTransferError::MissingPayload)
        ));
        assert!(matches!(
            RosterSnapshot::decode("skirmish:v1:16x16:!!"),
            Err(RosterTransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn captured_roster_redeploys_on_a_fresh_board() {
        let mut source = World::new();
        let mut events = Vec::new();
        for entry in &crown_roster().units {
            let _ = world::place_unit(&mut source, entry.kind, Faction::A, entry.cell, &mut events)
                .expect("unit placed");
        }
        let captured = RosterSnapshot::capture(&source, Faction::A);
        assert_eq!(captured, crown_roster());

        let mut target = World::new();
        let refused = captured.deploy(&mut target, 1000, &mut events);
        assert!(refused.is_empty());
        assert_eq!(query::living_count(&target, Faction::A), 2);
    }

    #[test]
    fn deployment_refuses_entries_beyond_the_budget() {
        let mut target = World::new();
        let mut events = Vec::new();
        let refused = crown_roster().deploy(&mut target, 120, &mut events);
        assert_eq!(refused.len(), 1);
        assert_eq!(refused[0].0.kind, UnitKind::Archer);
        assert!(matches!(refused[0].1, DeploymentError::OverBudget { .. }));
    }
}
