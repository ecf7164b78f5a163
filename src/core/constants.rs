//! Rules Constants
//!
//! Every tuning value of the skirmish in one place. Match-level knobs that
//! operators may override (seed, turn limit, map size) live in
//! [`crate::config::MatchConfig`] instead.

// =============================================================================
// WORLD
// =============================================================================

/// Playfield width in world units.
pub const WORLD_WIDTH: f64 = 1920.0;

/// Playfield height in world units.
pub const WORLD_HEIGHT: f64 = 1000.0;

/// Overlap below this is treated as resolved.
pub const COLLISION_EPSILON: f64 = 1e-6;

/// Pass cap for a full (looping) collision resolution.
pub const MAX_COLLISION_PASSES: u32 = 1000;

/// Extra separation added when two immovable bodies are pushed apart.
pub const IMMOVABLE_SEPARATION: f64 = 20.0;

/// Extra separation added to every movable body to beat float underresolution.
pub const MOVABLE_SEPARATION: f64 = 1.0;

// =============================================================================
// OBSTACLES
// =============================================================================

/// Smallest obstacle radius (inclusive).
pub const OBSTACLE_RADIUS_MIN: i32 = 60;

/// Largest obstacle radius (inclusive).
pub const OBSTACLE_RADIUS_MAX: i32 = 90;

/// Minimum gap kept between obstacles and between obstacles and the border.
pub const OBSTACLE_GAP: f64 = 90.0;

/// Range of the base mineral rate an obstacle can sustain.
pub const OBSTACLE_MINERAL_BASERATE_MIN: i32 = 1;
/// Upper bound of the base mineral rate (inclusive).
pub const OBSTACLE_MINERAL_BASERATE_MAX: i32 = 3;

/// Range of the mineral reserve of an obstacle.
pub const OBSTACLE_MINERAL_MIN: i32 = 200;
/// Upper bound of the mineral reserve (inclusive).
pub const OBSTACLE_MINERAL_MAX: i32 = 300;

/// Reserve bonus for obstacles near the centre (applied per threshold).
pub const OBSTACLE_MINERAL_INCREASE: i32 = 50;

/// Outer centre threshold for mineral bonuses.
pub const OBSTACLE_MINERAL_INCREASE_DISTANCE_1: f64 = 500.0;

/// Inner centre threshold for mineral bonuses.
pub const OBSTACLE_MINERAL_INCREASE_DISTANCE_2: f64 = 200.0;

// =============================================================================
// QUEEN
// =============================================================================

/// Queen collision radius.
pub const QUEEN_RADIUS: f64 = 30.0;

/// Queen mass.
pub const QUEEN_MASS: i32 = 10_000;

/// Maximum distance a queen travels per turn.
pub const QUEEN_SPEED: f64 = 60.0;

/// Distance of the starting corner from each world edge.
pub const QUEEN_SPAWN_DISTANCE: f64 = 200.0;

/// Max edge-to-edge distance at which the queen can build on an obstacle.
pub const BUILD_DISTANCE: f64 = 10.0;

/// Max edge-to-edge distance at which units raze structures or land hits.
pub const TOUCHING_DELTA: f64 = 5.0;

// =============================================================================
// STRUCTURES
// =============================================================================

/// Tower health when first built.
pub const TOWER_HP_INITIAL: i32 = 200;

/// Tower health added by each reinforcement.
pub const TOWER_HP_INCREMENT: i32 = 100;

/// Tower health cap.
pub const TOWER_HP_MAXIMUM: i32 = 800;

/// Tower health lost every tick.
pub const TOWER_HP_DECAY: i32 = 4;

/// Area a tower covers per point of health.
pub const TOWER_COVERAGE_PER_HP: f64 = 1000.0;

/// Minimum damage a tower deals to a creep.
pub const TOWER_CREEP_DAMAGE_MIN: i32 = 6;

/// Maximum damage a tower deals to a creep (inclusive).
pub const TOWER_CREEP_DAMAGE_MAX: i32 = 8;

/// Distance an enemy queen is shoved when inside tower range.
pub const TOWER_QUEEN_PUSHBACK: f64 = 20.0;

/// Income rate of a freshly built mine.
pub const MINE_INITIAL_RATE: i32 = 1;

// =============================================================================
// CREEPS
// =============================================================================

/// Distance new creeps are nudged toward the enemy queen on spawn.
pub const CREEP_SPAWN_NUDGE: f64 = 20.0;

/// Number of movement substeps per tick.
pub const CREEP_MOVE_SUBSTEPS: u32 = 5;

/// Health every creep loses at the start of its tick.
pub const CREEP_ATTRITION: i32 = 1;

/// Creeps aim this far short of the queen's centre.
pub const CREEP_TARGET_OFFSET: f64 = 3.0;
