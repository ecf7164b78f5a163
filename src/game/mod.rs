//! Game Logic Module
//!
//! All match simulation code. Deterministic given the seed and responses.
//!
//! ## Module Structure
//!
//! - `entity`: Queens, creeps, obstacles, collision bodies
//! - `structure`: Mines, towers, barracks
//! - `collision`: Iterative overlap resolution
//! - `map`: Symmetric obstacle layout generation
//! - `command`: Player line parsing
//! - `protocol`: Init and per-turn lines sent to players
//! - `state`: Match and player state
//! - `tick`: The turn pipeline
//! - `events`: Game events for replay/verification

pub mod entity;
pub mod structure;
pub mod collision;
pub mod map;
pub mod command;
pub mod protocol;
pub mod state;
pub mod tick;
pub mod events;

// Re-export key types
pub use entity::{CreepType, PlayerIndex};
pub use state::{MatchState, PlayerState, MatchPhase};
pub use structure::{Structure, StructureKind};
pub use tick::{PlayerResponse, TickResult};
pub use events::GameEvent;
