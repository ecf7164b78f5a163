//! Physical Entities
//!
//! Queens, creeps and obstacles. Entities refer to each other by
//! [`PlayerIndex`] and obstacle id, never by reference.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::core::constants::{QUEEN_MASS, QUEEN_RADIUS, TOUCHING_DELTA};
use crate::core::vec2::Vec2;
use crate::game::structure::Structure;

// =============================================================================
// PLAYER INDEX
// =============================================================================

/// Seat of a player: 0 or 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerIndex(pub u8);

impl PlayerIndex {
    /// First seat, spawning top-left.
    pub const FIRST: Self = Self(0);
    /// Second seat, spawning bottom-right.
    pub const SECOND: Self = Self(1);
    /// Both seats in turn order.
    pub const BOTH: [Self; 2] = [Self::FIRST, Self::SECOND];

    /// The opposing seat.
    #[inline]
    pub const fn enemy(self) -> Self {
        Self(1 - self.0)
    }

    /// Array index of this seat.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

// =============================================================================
// BODY
// =============================================================================

/// Collision view of any physical entity.
///
/// `mass == 0` marks an immovable body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Centre
    pub location: Vec2,
    /// Collision radius
    pub radius: f64,
    /// Mass; 0 is immovable
    pub mass: i32,
}

impl Body {
    /// Create a body.
    pub const fn new(location: Vec2, radius: f64, mass: i32) -> Self {
        Self { location, radius, mass }
    }

    /// Does this body ignore collision pressure?
    #[inline]
    pub fn is_immovable(&self) -> bool {
        self.mass == 0
    }
}

// =============================================================================
// CREEP TYPE
// =============================================================================

/// Creep variants a barracks can train.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CreepType {
    /// Fast, cheap, chases the enemy queen.
    Melee = 0,
    /// Long range, hits the queen or nearby creeps.
    Ranged = 1,
    /// Heavy, only damages towers.
    Giant = 2,
}

/// Fixed statistics of a creep type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreepStats {
    /// Creeps produced per training cycle.
    pub count: u32,
    /// Resource cost of one training cycle.
    pub cost: i32,
    /// Distance per tick.
    pub speed: f64,
    /// Edge-to-edge attack range.
    pub attack_range: f64,
    /// Collision radius.
    pub radius: f64,
    /// Mass for collision weighting.
    pub mass: i32,
    /// Health on spawn.
    pub health: i32,
    /// Damage per tick to the enemy queen (and to creeps, for ranged).
    pub queen_damage: i32,
    /// Damage per tick to an enemy tower.
    pub tower_damage: i32,
    /// Ticks a barracks spends training.
    pub build_time: u32,
}

impl CreepStats {
    /// Edge distance at which the creep stops and attacks: attack range
    /// plus the contact tolerance.
    #[inline]
    pub fn reach(&self) -> f64 {
        self.attack_range + TOUCHING_DELTA
    }

    /// Whether a target at edge distance `gap` can be hit. Marching and
    /// combat both use this, so a creep attacks on the tick it stops.
    #[inline]
    pub fn in_reach(&self, gap: f64) -> bool {
        gap <= self.reach()
    }
}

const MELEE_STATS: CreepStats = CreepStats {
    count: 4,
    cost: 80,
    speed: 80.0,
    attack_range: 0.0,
    radius: 10.0,
    mass: 400,
    health: 30,
    queen_damage: 1,
    tower_damage: 0,
    build_time: 5,
};

const RANGED_STATS: CreepStats = CreepStats {
    count: 2,
    cost: 100,
    speed: 60.0,
    attack_range: 200.0,
    radius: 15.0,
    mass: 900,
    health: 45,
    queen_damage: 2,
    tower_damage: 0,
    build_time: 8,
};

const GIANT_STATS: CreepStats = CreepStats {
    count: 1,
    cost: 140,
    speed: 50.0,
    attack_range: 0.0,
    radius: 20.0,
    mass: 2000,
    health: 200,
    queen_damage: 0,
    tower_damage: 80,
    build_time: 10,
};

impl CreepType {
    /// All types in wire-index order.
    pub const ALL: [CreepType; 3] = [CreepType::Melee, CreepType::Ranged, CreepType::Giant];

    /// Statistics table entry.
    #[inline]
    pub fn stats(self) -> &'static CreepStats {
        match self {
            CreepType::Melee => &MELEE_STATS,
            CreepType::Ranged => &RANGED_STATS,
            CreepType::Giant => &GIANT_STATS,
        }
    }

    /// Index sent to players.
    #[inline]
    pub fn wire_index(self) -> u8 {
        self as u8
    }

    /// Canonical token.
    pub fn token(self) -> &'static str {
        match self {
            CreepType::Melee => "MELEE",
            CreepType::Ranged => "RANGED",
            CreepType::Giant => "GIANT",
        }
    }
}

impl FromStr for CreepType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MELEE" | "ZERGLING" => Ok(CreepType::Melee),
            "RANGED" | "ARCHER" => Ok(CreepType::Ranged),
            "GIANT" => Ok(CreepType::Giant),
            _ => Err(()),
        }
    }
}

// =============================================================================
// QUEEN
// =============================================================================

/// A player's queen.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Queen {
    /// Owner
    pub owner: PlayerIndex,
    /// Centre
    pub location: Vec2,
    /// Remaining health; the match is lost at zero.
    pub health: i32,
}

impl Queen {
    /// Create a queen.
    pub fn new(owner: PlayerIndex, location: Vec2, health: i32) -> Self {
        Self { owner, location, health }
    }

    /// Collision view.
    #[inline]
    pub fn body(&self) -> Body {
        Body::new(self.location, QUEEN_RADIUS, QUEEN_MASS)
    }

    /// Advance toward `target` by at most `max_distance`.
    pub fn move_towards(&mut self, target: Vec2, max_distance: f64) {
        self.location = self.location.towards(target, max_distance);
    }

    /// Has the queen fallen?
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

// =============================================================================
// CREEP
// =============================================================================

/// A mobile unit trained by a barracks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Creep {
    /// Unique id in spawn order
    pub id: u32,
    /// Owner
    pub owner: PlayerIndex,
    /// Variant
    pub creep_type: CreepType,
    /// Centre
    pub location: Vec2,
    /// Remaining health
    pub health: i32,
}

impl Creep {
    /// Create a creep at full health.
    pub fn new(id: u32, owner: PlayerIndex, creep_type: CreepType, location: Vec2) -> Self {
        Self {
            id,
            owner,
            creep_type,
            location,
            health: creep_type.stats().health,
        }
    }

    /// Statistics of this creep's type.
    #[inline]
    pub fn stats(&self) -> &'static CreepStats {
        self.creep_type.stats()
    }

    /// Collision view.
    #[inline]
    pub fn body(&self) -> Body {
        let stats = self.stats();
        Body::new(self.location, stats.radius, stats.mass)
    }

    /// Apply damage. Returns true if this killed the creep.
    pub fn damage(&mut self, amount: i32) -> bool {
        self.health -= amount;
        self.health <= 0
    }

    /// Still on the board?
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

// =============================================================================
// OBSTACLE
// =============================================================================

/// A fixed map node that can host one structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Obstacle {
    /// Unique id, equal to its index in the match's obstacle list
    pub id: u32,
    /// Centre
    pub location: Vec2,
    /// Collision radius
    pub radius: f64,
    /// Cap on a mine's income rate here
    pub max_mineral_rate: i32,
    /// Minerals left to extract
    pub minerals: i32,
    /// Attached structure, if any
    pub structure: Option<Structure>,
}

impl Obstacle {
    /// Create an empty obstacle.
    pub fn new(id: u32, location: Vec2, radius: f64, max_mineral_rate: i32, minerals: i32) -> Self {
        Self {
            id,
            location,
            radius,
            max_mineral_rate,
            minerals,
            structure: None,
        }
    }

    /// Collision view (immovable).
    #[inline]
    pub fn body(&self) -> Body {
        Body::new(self.location, self.radius, 0)
    }

    /// Footprint area.
    #[inline]
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    /// Owner of the attached structure.
    pub fn owner(&self) -> Option<PlayerIndex> {
        self.structure.as_ref().map(Structure::owner)
    }

    /// Edge-to-edge distance to a circle.
    #[inline]
    pub fn gap_to(&self, location: Vec2, radius: f64) -> f64 {
        self.location.distance(location) - self.radius - radius
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_index_enemy() {
        assert_eq!(PlayerIndex::FIRST.enemy(), PlayerIndex::SECOND);
        assert_eq!(PlayerIndex::SECOND.enemy(), PlayerIndex::FIRST);
        assert_eq!(PlayerIndex::SECOND.index(), 1);
    }

    #[test]
    fn test_creep_type_tokens() {
        assert_eq!("MELEE".parse::<CreepType>(), Ok(CreepType::Melee));
        assert_eq!("ZERGLING".parse::<CreepType>(), Ok(CreepType::Melee));
        assert_eq!("ARCHER".parse::<CreepType>(), Ok(CreepType::Ranged));
        assert_eq!("GIANT".parse::<CreepType>(), Ok(CreepType::Giant));
        assert!("melee".parse::<CreepType>().is_err());

        for creep_type in CreepType::ALL {
            assert_eq!(creep_type.token().parse::<CreepType>(), Ok(creep_type));
        }
    }

    #[test]
    fn test_creep_damage_kills_at_zero() {
        let mut creep = Creep::new(0, PlayerIndex::FIRST, CreepType::Melee, Vec2::ZERO);
        assert!(!creep.damage(29));
        assert!(creep.is_alive());
        assert!(creep.damage(1));
        assert!(!creep.is_alive());
    }

    #[test]
    fn test_obstacle_is_immovable() {
        let obstacle = Obstacle::new(0, Vec2::new(100.0, 100.0), 70.0, 2, 250);
        assert!(obstacle.body().is_immovable());
        assert!(obstacle.owner().is_none());
        assert!((obstacle.gap_to(Vec2::new(200.0, 100.0), 10.0) - 20.0).abs() < 1e-12);
    }
}
