//! Error Types
//!
//! Player input failures carry a severity: fatal ones deactivate the player,
//! warnings only skip the offending action. Timeouts are not input errors;
//! they arrive as [`crate::game::tick::PlayerResponse::Timeout`].

use thiserror::Error;

/// How the referee reacts to a rejected player action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Player is deactivated for the rest of the match.
    Fatal,
    /// Action is skipped and logged to the match summary.
    Warning,
}

/// Player input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Training line does not start with an integer count.
    #[error("Couldn't process training count: {0}")]
    InvalidTrainingCount(String),

    /// A token that should be an obstacle id is not an integer.
    #[error("Couldn't process obstacleId: {0}")]
    InvalidObstacleId(String),

    /// No obstacle carries the given id.
    #[error("No obstacle with id = {0}")]
    UnknownObstacle(i64),

    /// Queen command line is empty.
    #[error("Expected a command, got an empty line")]
    EmptyCommand,

    /// Queen command is not WAIT, MOVE or BUILD.
    #[error("Didn't understand command: {0}")]
    UnknownCommand(String),

    /// MOVE arguments missing or not integers.
    #[error("In MOVE command, x and y must be integers")]
    InvalidMoveTarget,

    /// BUILD without a structure token.
    #[error("Structure type must be specified")]
    MissingStructureType,

    /// Structure token is not MINE, TOWER or BARRACKS.
    #[error("Invalid structure type: {0}")]
    InvalidStructureType(String),

    /// BARRACKS without a creep type suffix.
    #[error("BARRACKS type must be specified")]
    MissingCreepType,

    /// Creep type suffix is not recognised.
    #[error("Invalid BARRACKS type: {0}")]
    InvalidCreepType(String),

    /// Training requested from an obstacle without a barracks.
    #[error("Cannot spawn from {0}: not a barracks")]
    NotBarracks(u32),

    /// Training requested from a barracks of the other player.
    #[error("Cannot spawn from {0}: not owned")]
    NotOwned(u32),

    /// Training requested from a barracks that is already busy.
    #[error("Barracks {0} is training")]
    AlreadyTraining(u32),

    /// Whole training batch costs more than the player holds.
    #[error("Training too many creeps ({requested} total resources requested, {available} available)")]
    InsufficientResources {
        /// Total cost of the batch.
        requested: i32,
        /// Resources held by the player.
        available: i32,
    },

    /// Build target carries a structure of the other player.
    #[error("Cannot build on {0}: owned by enemy player")]
    OwnedByEnemy(u32),

    /// Build target is one of our own barracks mid-training.
    #[error("Cannot rebuild {0}: training is in progress")]
    TrainingInProgress(u32),

    /// Mine requested on an obstacle with no minerals left.
    #[error("Cannot build mine on {0}: no minerals left")]
    MineralsExhausted(u32),

    /// Both players built on the same obstacle this turn.
    #[error("Both players tried to build on {0}; neither build applies")]
    BuildConflict(u32),
}

impl InputError {
    /// Classify the error.
    pub fn severity(&self) -> Severity {
        match self {
            InputError::InvalidTrainingCount(_)
            | InputError::InvalidObstacleId(_)
            | InputError::UnknownObstacle(_)
            | InputError::EmptyCommand
            | InputError::UnknownCommand(_)
            | InputError::InvalidMoveTarget
            | InputError::MissingStructureType
            | InputError::InvalidStructureType(_)
            | InputError::MissingCreepType
            | InputError::InvalidCreepType(_) => Severity::Fatal,

            InputError::NotBarracks(_)
            | InputError::NotOwned(_)
            | InputError::AlreadyTraining(_)
            | InputError::InsufficientResources { .. }
            | InputError::OwnedByEnemy(_)
            | InputError::TrainingInProgress(_)
            | InputError::MineralsExhausted(_)
            | InputError::BuildConflict(_) => Severity::Warning,
        }
    }

    /// Shorthand for `severity() == Severity::Fatal`.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Simulation setup errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Map relaxation never converged within the retry ceiling.
    #[error("map generation did not converge after {attempts} attempts")]
    MapGeneration {
        /// Layouts generated and discarded.
        attempts: u32,
    },

    /// Configuration file could not be read.
    #[error("failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration file is not valid JSON for `MatchConfig`.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration values are out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_errors_are_fatal() {
        assert!(InputError::UnknownCommand("JUMP".into()).is_fatal());
        assert!(InputError::InvalidMoveTarget.is_fatal());
        assert!(InputError::InvalidCreepType("DRAGON".into()).is_fatal());
        assert!(InputError::UnknownObstacle(99).is_fatal());
    }

    #[test]
    fn test_game_rule_errors_are_warnings() {
        assert_eq!(InputError::OwnedByEnemy(3).severity(), Severity::Warning);
        assert_eq!(
            InputError::InsufficientResources { requested: 160, available: 100 }.severity(),
            Severity::Warning
        );
        assert_eq!(InputError::BuildConflict(4).severity(), Severity::Warning);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            InputError::NotBarracks(7).to_string(),
            "Cannot spawn from 7: not a barracks"
        );
        assert_eq!(
            SimError::MapGeneration { attempts: 3 }.to_string(),
            "map generation did not converge after 3 attempts"
        );
    }
}
