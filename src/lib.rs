//! # Royale Referee
//!
//! Deterministic referee for a two-player queen-and-creeps skirmish.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ROYALE REFEREE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - 2D vector, rounding, reflection           │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  ├── hash.rs     - State hashing for verification            │
//! │  └── constants.rs- Rules constants                           │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── entity.rs   - Queens, creeps, obstacles                 │
//! │  ├── structure.rs- Mines, towers, barracks                   │
//! │  ├── collision.rs- Overlap resolution                        │
//! │  ├── map.rs      - Symmetric map generation                  │
//! │  ├── command.rs  - Player line parsing                       │
//! │  ├── protocol.rs - Lines sent to players                     │
//! │  ├── state.rs    - Match and player state                    │
//! │  └── tick.rs     - Turn pipeline                             │
//! │                                                              │
//! │  runner/         - Bot I/O (non-deterministic)               │
//! │  ├── process.rs  - Child process transport                   │
//! │  └── scripted.rs - Built-in demo player                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules never read the clock or the
//! environment. All randomness comes from one seeded Xorshift128+, and
//! every phase visits entities in a fixed order (seat, spawn order,
//! obstacle id). Geometry stays in `f64`; coordinates are truncated to
//! integers only when written to players.
//!
//! Given the same seed and the same player responses, a match produces
//! the **same final state hash** every time.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod runner;

// Re-export commonly used types
pub use config::{MatchConfig, RunnerConfig};
pub use crate::core::rng::DeterministicRng;
pub use crate::core::vec2::Vec2;
pub use error::{InputError, SimError};
pub use game::state::{MatchState, PlayerState};
pub use game::tick::{replay_match, tick, PlayerResponse};
pub use runner::{run_match, Contestant, MatchOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
