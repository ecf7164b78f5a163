//! Player Commands
//!
//! Parsing of the two lines a player answers each turn. Parsing only checks
//! syntax; whether an obstacle exists or a build is allowed is decided by the
//! turn pipeline against the live state.

use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::error::InputError;
use crate::game::entity::CreepType;
use crate::game::structure::StructureKind;

/// First line: barracks to start training this turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRequest {
    /// Obstacle ids as sent; not yet checked against the map
    pub obstacle_ids: Vec<i64>,
}

/// Second line: what the queen does this turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum QueenCommand {
    /// Stay put
    Wait,
    /// Walk toward a point
    Move(Vec2),
    /// Build or upgrade on an obstacle (walks there first if too far)
    Build {
        /// Obstacle id as sent
        obstacle_id: i64,
        /// Requested structure
        kind: StructureKind,
    },
}

impl FromStr for TrainingRequest {
    type Err = InputError;

    /// `count id id ...`; an empty line trains nothing.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let Some(count) = tokens.next() else {
            return Ok(Self::default());
        };
        count
            .parse::<i64>()
            .map_err(|_| InputError::InvalidTrainingCount(count.to_string()))?;

        let obstacle_ids = tokens
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|_| InputError::InvalidObstacleId(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { obstacle_ids })
    }
}

impl FromStr for QueenCommand {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next().ok_or(InputError::EmptyCommand)?;

        match command {
            "WAIT" => Ok(QueenCommand::Wait),
            "MOVE" => {
                let mut coordinate = || {
                    tokens
                        .next()
                        .and_then(|t| t.parse::<i32>().ok())
                        .ok_or(InputError::InvalidMoveTarget)
                };
                let x = coordinate()?;
                let y = coordinate()?;
                Ok(QueenCommand::Move(Vec2::from_ints(x, y)))
            }
            "BUILD" => {
                let id_token = tokens.next().unwrap_or_default();
                let obstacle_id = id_token
                    .parse::<i64>()
                    .map_err(|_| InputError::InvalidObstacleId(id_token.to_string()))?;
                let spec = tokens.next().ok_or(InputError::MissingStructureType)?;
                let kind = parse_structure_spec(spec)?;
                Ok(QueenCommand::Build { obstacle_id, kind })
            }
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }
}

/// `MINE`, `TOWER` or `BARRACKS-<creep>`.
pub fn parse_structure_spec(spec: &str) -> Result<StructureKind, InputError> {
    let mut parts = spec.split('-');
    let structure = parts.next().unwrap_or_default();

    match structure {
        "MINE" => Ok(StructureKind::Mine),
        "TOWER" => Ok(StructureKind::Tower),
        "BARRACKS" => {
            let creep = parts.next().ok_or(InputError::MissingCreepType)?;
            let creep_type = creep
                .parse::<CreepType>()
                .map_err(|_| InputError::InvalidCreepType(creep.to_string()))?;
            Ok(StructureKind::Barracks(creep_type))
        }
        "" => Err(InputError::MissingStructureType),
        other => Err(InputError::InvalidStructureType(other.to_string())),
    }
}
