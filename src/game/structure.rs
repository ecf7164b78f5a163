//! Structures
//!
//! Mines, towers and barracks attached to obstacles. A structure is stored
//! inside its obstacle, so the obstacle id is the structure's key.

use serde::{Serialize, Deserialize};

use crate::core::constants::{
    MINE_INITIAL_RATE, TOWER_COVERAGE_PER_HP, TOWER_HP_INCREMENT, TOWER_HP_MAXIMUM,
};
use crate::game::entity::{CreepType, PlayerIndex};

/// Structure kind as requested by a BUILD command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    /// Income source
    Mine,
    /// Area defence
    Tower,
    /// Creep production of the given type
    Barracks(CreepType),
}

/// A structure attached to exactly one obstacle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Structure {
    /// Income source
    Mine(Mine),
    /// Area defence
    Tower(Tower),
    /// Creep production
    Barracks(Barracks),
}

impl Structure {
    /// Owner; fixed for the structure's lifetime.
    pub fn owner(&self) -> PlayerIndex {
        match self {
            Structure::Mine(mine) => mine.owner,
            Structure::Tower(tower) => tower.owner,
            Structure::Barracks(barracks) => barracks.owner,
        }
    }

    /// Wire code: 0 mine, 1 tower, 2 barracks.
    pub fn wire_code(&self) -> i32 {
        match self {
            Structure::Mine(_) => 0,
            Structure::Tower(_) => 1,
            Structure::Barracks(_) => 2,
        }
    }
}

/// Mine state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mine {
    /// Owner
    pub owner: PlayerIndex,
    /// Minerals extracted per tick
    pub income_rate: i32,
}

impl Mine {
    /// Fresh mine.
    pub fn new(owner: PlayerIndex) -> Self {
        Self { owner, income_rate: MINE_INITIAL_RATE }
    }

    /// Raise the income rate by one, capped at the obstacle's maximum.
    pub fn upgrade(&mut self, max_rate: i32) {
        self.income_rate = (self.income_rate + 1).min(max_rate);
    }
}

/// Tower state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    /// Owner
    pub owner: PlayerIndex,
    /// Health; the tower collapses at zero
    pub health: i32,
    /// Current reach, derived from health
    pub attack_radius: f64,
}

impl Tower {
    /// New tower on an obstacle of the given area.
    pub fn new(owner: PlayerIndex, health: i32, obstacle_area: f64) -> Self {
        Self {
            owner,
            health,
            attack_radius: attack_radius(health, obstacle_area),
        }
    }

    /// Add health up to the cap.
    pub fn reinforce(&mut self, obstacle_area: f64) {
        self.health = (self.health + TOWER_HP_INCREMENT).min(TOWER_HP_MAXIMUM);
        self.refresh_radius(obstacle_area);
    }

    /// Recompute reach after a health change.
    pub fn refresh_radius(&mut self, obstacle_area: f64) {
        self.attack_radius = attack_radius(self.health, obstacle_area);
    }

    /// Has the tower collapsed?
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.health <= 0
    }
}

/// Tower reach: radius of a disc whose area is the obstacle plus the
/// coverage bought by remaining health.
pub fn attack_radius(health: i32, obstacle_area: f64) -> f64 {
    let covered = (health.max(0) as f64 * TOWER_COVERAGE_PER_HP + obstacle_area).max(0.0);
    (covered / std::f64::consts::PI).sqrt()
}

/// Training in progress at a barracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingJob {
    /// Type being trained; fixed until the job completes
    pub creep_type: CreepType,
    /// Ticks until the creeps appear
    pub ticks_remaining: u32,
}

/// Barracks state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Barracks {
    /// Owner
    pub owner: PlayerIndex,
    /// Type this barracks trains
    pub creep_type: CreepType,
    /// Current job, if training
    pub training: Option<TrainingJob>,
}

impl Barracks {
    /// Idle barracks.
    pub fn new(owner: PlayerIndex, creep_type: CreepType) -> Self {
        Self { owner, creep_type, training: None }
    }

    /// Is a job running?
    #[inline]
    pub fn is_training(&self) -> bool {
        self.training.is_some()
    }

    /// Start a job for this barracks' creep type.
    pub fn start_training(&mut self) {
        self.training = Some(TrainingJob {
            creep_type: self.creep_type,
            ticks_remaining: self.creep_type.stats().build_time,
        });
    }

    /// Advance the job by one tick. Returns the finished job, if any.
    pub fn advance(&mut self) -> Option<TrainingJob> {
        let job = self.training.as_mut()?;
        job.ticks_remaining = job.ticks_remaining.saturating_sub(1);
        if job.ticks_remaining == 0 {
            return self.training.take();
        }
        None
    }

    /// Ticks left in the current job (0 when idle).
    pub fn ticks_remaining(&self) -> u32 {
        self.training.map_or(0, |job| job.ticks_remaining)
    }
}
