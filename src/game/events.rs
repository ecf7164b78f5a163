//! Game Events
//!
//! Events generated during simulation, for the match log and replay checks.

use serde::{Serialize, Deserialize};

use crate::game::entity::{CreepType, PlayerIndex};
use crate::game::structure::StructureKind;

/// What razed a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Razer {
    /// An enemy creep touched the obstacle.
    Creep,
    /// The enemy queen touched the obstacle.
    Queen,
    /// A giant brought a tower down.
    Siege,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A player action was skipped
    Warning {
        player: PlayerIndex,
        message: String,
    },

    /// A player stops issuing commands for the rest of the match
    PlayerDeactivated {
        player: PlayerIndex,
        reason: String,
    },

    /// A structure was created or upgraded
    StructureBuilt {
        player: PlayerIndex,
        obstacle_id: u32,
        kind: StructureKind,
    },

    /// A structure was removed by an enemy unit
    StructureRazed {
        obstacle_id: u32,
        owner: PlayerIndex,
        by: Razer,
    },

    /// A tower decayed to nothing
    TowerCollapsed {
        obstacle_id: u32,
        owner: PlayerIndex,
    },

    /// A mine ran out of minerals
    MineExhausted {
        obstacle_id: u32,
        owner: PlayerIndex,
    },

    /// A training cycle finished
    CreepsTrained {
        player: PlayerIndex,
        obstacle_id: u32,
        creep_type: CreepType,
        count: u32,
    },

    /// A creep died
    CreepKilled {
        creep_id: u32,
        owner: PlayerIndex,
    },

    /// Match ended
    MatchEnded {
        winner: Option<PlayerIndex>,
        turns: u32,
    },
}

/// A game event with timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Turn when event occurred
    pub turn: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(turn: u32, data: GameEventData) -> Self {
        Self { turn, data }
    }

    /// Player the event concerns, if any.
    pub fn player(&self) -> Option<PlayerIndex> {
        match &self.data {
            GameEventData::Warning { player, .. }
            | GameEventData::PlayerDeactivated { player, .. }
            | GameEventData::StructureBuilt { player, .. }
            | GameEventData::CreepsTrained { player, .. } => Some(*player),
            GameEventData::StructureRazed { owner, .. }
            | GameEventData::TowerCollapsed { owner, .. }
            | GameEventData::MineExhausted { owner, .. }
            | GameEventData::CreepKilled { owner, .. } => Some(*owner),
            GameEventData::MatchEnded { winner, .. } => *winner,
        }
    }

    /// Create warning event.
    pub fn warning(turn: u32, player: PlayerIndex, message: impl Into<String>) -> Self {
        Self::new(turn, GameEventData::Warning { player, message: message.into() })
    }

    /// Create deactivation event.
    pub fn player_deactivated(turn: u32, player: PlayerIndex, reason: impl Into<String>) -> Self {
        Self::new(turn, GameEventData::PlayerDeactivated { player, reason: reason.into() })
    }

    /// Create match ended event.
    pub fn match_ended(turn: u32, winner: Option<PlayerIndex>) -> Self {
        Self::new(turn, GameEventData::MatchEnded { winner, turns: turn })
    }

    /// One-line summary for the match log, if the event belongs there.
    pub fn summary_line(&self) -> Option<String> {
        match &self.data {
            GameEventData::Warning { player, message } => {
                Some(format!("WARNING ({}): {}", player, message))
            }
            GameEventData::PlayerDeactivated { player, reason } => {
                Some(format!("{} deactivated: {}", player, reason))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines() {
        let warning = GameEvent::warning(3, PlayerIndex::FIRST, "Barracks 2 is training");
        assert_eq!(
            warning.summary_line().as_deref(),
            Some("WARNING (player 0): Barracks 2 is training")
        );
        assert_eq!(warning.player(), Some(PlayerIndex::FIRST));

        let ended = GameEvent::match_ended(40, None);
        assert!(ended.summary_line().is_none());
        assert_eq!(ended.player(), None);
    }
}
