//! Core deterministic primitives.
//!
//! Geometry, the seeded random source, state hashing and the rules
//! constants. Nothing in here knows about players or structures.

pub mod constants;
pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::Vec2;
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
