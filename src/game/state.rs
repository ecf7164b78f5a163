//! Match State
//!
//! The arena every tick phase works on. Entities are addressed by seat
//! ([`PlayerIndex`]) and obstacle id; structures live inside their obstacle,
//! so nothing holds a reference to anything else.

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::config::MatchConfig;
use crate::core::constants::CREEP_SPAWN_NUDGE;
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::error::{InputError, SimError};
use crate::game::entity::{Body, Creep, CreepType, Obstacle, PlayerIndex, Queen};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::map::{generate_map, MapLayout};
use crate::game::structure::Structure;

// =============================================================================
// PLAYER STATE
// =============================================================================

/// State of a single player in the match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    /// Seat
    pub index: PlayerIndex,

    /// The player's queen
    pub queen: Queen,

    /// Spendable resources
    pub resources: i32,

    /// Living creeps, in spawn order
    pub creeps: Vec<Creep>,

    /// Still issuing commands?
    pub active: bool,

    /// Why the player was deactivated
    pub deactivation_reason: Option<String>,
}

impl PlayerState {
    /// Create a player at match start.
    pub fn new(index: PlayerIndex, queen_location: Vec2, health: i32, resources: i32) -> Self {
        Self {
            index,
            queen: Queen::new(index, queen_location, health),
            resources,
            creeps: Vec::new(),
            active: true,
            deactivation_reason: None,
        }
    }

    /// Hash player state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.index.0);
        hasher.update_bool(self.active);
        hasher.update_vec2(self.queen.location);
        hasher.update_i32(self.queen.health);
        hasher.update_i32(self.resources);
        hasher.update_u32(self.creeps.len() as u32);
        for creep in &self.creeps {
            hasher.update_u32(creep.id);
            hasher.update_u8(creep.creep_type.wire_index());
            hasher.update_vec2(creep.location);
            hasher.update_i32(creep.health);
        }
    }
}

// =============================================================================
// MATCH PHASE
// =============================================================================

/// Current phase of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MatchPhase {
    /// Turns are being played
    #[default]
    Playing,
    /// Match over
    Ended,
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete state of a match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    /// Turns completed so far
    pub turn: u32,

    /// Current match phase
    pub phase: MatchPhase,

    /// RNG seed (for verification)
    pub seed: u64,

    /// Deterministic RNG state, shared by map generation and tower damage
    pub rng: DeterministicRng,

    /// Obstacles; `obstacles[i].id == i`
    pub obstacles: Vec<Obstacle>,

    /// Both players, indexed by seat
    pub players: [PlayerState; 2],

    /// Next creep id (monotonic counter)
    pub next_creep_id: u32,

    /// Warnings and deactivations, in order
    pub summary: Vec<String>,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,

    /// Winner once the match has ended; `None` is a draw
    pub winner: Option<PlayerIndex>,

    /// Turn limit
    pub max_turns: u32,
}

impl MatchState {
    /// Create a match with a freshly generated map.
    pub fn new(config: &MatchConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = DeterministicRng::new(config.seed);
        let layout = generate_map(&mut rng, config)?;
        Ok(Self::from_layout(config, layout, rng))
    }

    /// Create a match on a given layout, continuing from `rng`.
    pub fn from_layout(config: &MatchConfig, layout: MapLayout, rng: DeterministicRng) -> Self {
        let [first, second] = layout.queen_locations;
        Self {
            turn: 0,
            phase: MatchPhase::Playing,
            seed: config.seed,
            rng,
            obstacles: layout.obstacles,
            players: [
                PlayerState::new(PlayerIndex::FIRST, first, config.queen_health, config.starting_resources),
                PlayerState::new(PlayerIndex::SECOND, second, config.queen_health, config.starting_resources),
            ],
            next_creep_id: 0,
            summary: Vec::new(),
            pending_events: Vec::new(),
            winner: None,
            max_turns: config.max_turns,
        }
    }

    /// Get a player by seat.
    #[inline]
    pub fn player(&self, index: PlayerIndex) -> &PlayerState {
        &self.players[index.index()]
    }

    /// Get a player mutably by seat.
    #[inline]
    pub fn player_mut(&mut self, index: PlayerIndex) -> &mut PlayerState {
        &mut self.players[index.index()]
    }

    /// Number of players still issuing commands.
    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.active).count()
    }

    /// Check if match has ended.
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, MatchPhase::Ended)
    }

    /// Look up an obstacle by a player-supplied id.
    pub fn obstacle_index(&self, id: i64) -> Result<usize, InputError> {
        usize::try_from(id)
            .ok()
            .filter(|&index| index < self.obstacles.len())
            .ok_or(InputError::UnknownObstacle(id))
    }

    /// Obstacle whose centre is closest to `location`. First wins a tie.
    pub fn nearest_obstacle(&self, location: Vec2) -> Option<usize> {
        self.obstacles
            .iter()
            .enumerate()
            .map(|(index, obstacle)| (index, obstacle.location.distance(location)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    // =========================================================================
    // Collision view
    // =========================================================================

    /// All bodies in resolver order: each seat's queen then its creeps, then
    /// the obstacles.
    pub fn bodies(&self) -> Vec<Body> {
        let mut bodies = Vec::new();
        for player in &self.players {
            bodies.push(player.queen.body());
            bodies.extend(player.creeps.iter().map(Creep::body));
        }
        bodies.extend(self.obstacles.iter().map(Obstacle::body));
        bodies
    }

    /// Write resolved locations back. `bodies` must come from [`Self::bodies`]
    /// with no creeps added or removed since. Obstacles are not written back.
    pub fn apply_bodies(&mut self, bodies: &[Body]) {
        let mut cursor = bodies.iter();
        for player in &mut self.players {
            if let Some(body) = cursor.next() {
                player.queen.location = body.location;
            }
            for creep in &mut player.creeps {
                if let Some(body) = cursor.next() {
                    creep.location = body.location;
                }
            }
        }
    }

    // =========================================================================
    // Creeps
    // =========================================================================

    /// Spawn a finished training batch at an obstacle, nudged toward the
    /// enemy queen. Returns the number of creeps created.
    pub fn spawn_creeps(&mut self, owner: PlayerIndex, obstacle: usize, creep_type: CreepType) -> u32 {
        let Some(origin) = self.obstacles.get(obstacle).map(|o| o.location) else {
            return 0;
        };
        let enemy_queen = self.player(owner.enemy()).queen.location;
        let location = origin.towards(enemy_queen, CREEP_SPAWN_NUDGE);

        let count = creep_type.stats().count;
        for _ in 0..count {
            let id = self.next_creep_id;
            self.next_creep_id += 1;
            self.player_mut(owner).creeps.push(Creep::new(id, owner, creep_type, location));
        }
        count
    }

    /// Drop dead creeps, emitting a kill event for each.
    pub fn remove_dead_creeps(&mut self) {
        let mut killed = Vec::new();
        for player in &mut self.players {
            player.creeps.retain(|creep| {
                if !creep.is_alive() {
                    killed.push((creep.id, creep.owner));
                }
                creep.is_alive()
            });
        }
        for (creep_id, owner) in killed {
            self.push_event(GameEventData::CreepKilled { creep_id, owner });
        }
    }

    // =========================================================================
    // Structures
    // =========================================================================

    /// Attach a structure, replacing whatever was there.
    pub fn set_structure(&mut self, obstacle: usize, structure: Structure) {
        if let Some(target) = self.obstacles.get_mut(obstacle) {
            target.structure = Some(structure);
        }
    }

    /// Remove and return the structure on an obstacle.
    pub fn clear_structure(&mut self, obstacle: usize) -> Option<Structure> {
        self.obstacles.get_mut(obstacle).and_then(|o| o.structure.take())
    }

    // =========================================================================
    // Player failures
    // =========================================================================

    /// Record a skipped action.
    pub fn warn(&mut self, player: PlayerIndex, error: &InputError) {
        let event = GameEvent::warning(self.turn, player, error.to_string());
        warn!(turn = self.turn, %player, %error, "action skipped");
        self.record(event);
    }

    /// Stop taking commands from a player. Their units stay on the board.
    pub fn deactivate(&mut self, player: PlayerIndex, reason: impl Into<String>) {
        let state = self.player_mut(player);
        if !state.active {
            return;
        }
        let reason = reason.into();
        state.active = false;
        state.deactivation_reason = Some(reason.clone());

        warn!(turn = self.turn, %player, %reason, "player deactivated");
        let event = GameEvent::player_deactivated(self.turn, player, reason);
        self.record(event);
    }

    fn record(&mut self, event: GameEvent) {
        if let Some(line) = event.summary_line() {
            self.summary.push(line);
        }
        self.pending_events.push(event);
    }

    // =========================================================================
    // Events and hashing
    // =========================================================================

    /// Queue an event for the current turn.
    pub fn push_event(&mut self, data: GameEventData) {
        self.pending_events.push(GameEvent::new(self.turn, data));
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.turn, self.seed, |hasher| {
            for player in &self.players {
                player.hash_into(hasher);
            }

            for obstacle in &self.obstacles {
                hasher.update_u32(obstacle.id);
                hasher.update_vec2(obstacle.location);
                hasher.update_i32(obstacle.minerals);
                hash_structure(hasher, obstacle.structure.as_ref());
            }

            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
            hasher.update_u32(self.next_creep_id);
        })
    }
}

fn hash_structure(hasher: &mut StateHasher, structure: Option<&Structure>) {
    let Some(structure) = structure else {
        hasher.update_u8(0xFF);
        return;
    };
    hasher.update_u8(structure.wire_code() as u8);
    hasher.update_u8(structure.owner().0);
    match structure {
        Structure::Mine(mine) => hasher.update_i32(mine.income_rate),
        Structure::Tower(tower) => {
            hasher.update_i32(tower.health);
            hasher.update_f64(tower.attack_radius);
        }
        Structure::Barracks(barracks) => {
            hasher.update_u8(barracks.creep_type.wire_index());
            hasher.update_u32(barracks.ticks_remaining());
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::structure::Barracks;

    fn empty_state() -> MatchState {
        let layout = MapLayout {
            obstacles: vec![
                Obstacle::new(0, Vec2::new(600.0, 500.0), 60.0, 2, 200),
                Obstacle::new(1, Vec2::new(1320.0, 500.0), 60.0, 2, 200),
            ],
            queen_locations: [Vec2::new(200.0, 200.0), Vec2::new(1720.0, 800.0)],
        };
        MatchState::from_layout(&MatchConfig::default(), layout, DeterministicRng::new(1))
    }

    #[test]
    fn test_new_match_from_config() {
        let state = MatchState::new(&MatchConfig::with_seed(5)).unwrap();
        assert_eq!(state.turn, 0);
        assert_eq!(state.active_count(), 2);
        assert_eq!(state.player(PlayerIndex::FIRST).resources, 100);
        assert_eq!(state.player(PlayerIndex::SECOND).queen.health, 100);
        assert!(!state.obstacles.is_empty());
    }

    #[test]
    fn test_obstacle_lookup() {
        let state = empty_state();
        assert_eq!(state.obstacle_index(1), Ok(1));
        assert_eq!(state.obstacle_index(2), Err(InputError::UnknownObstacle(2)));
        assert_eq!(state.obstacle_index(-1), Err(InputError::UnknownObstacle(-1)));
        assert_eq!(state.nearest_obstacle(Vec2::new(700.0, 500.0)), Some(0));
    }

    #[test]
    fn test_spawn_creeps_nudged_toward_enemy() {
        let mut state = empty_state();
        let spawned = state.spawn_creeps(PlayerIndex::FIRST, 0, CreepType::Melee);
        assert_eq!(spawned, 4);

        let enemy = state.player(PlayerIndex::SECOND).queen.location;
        let origin = state.obstacles[0].location;
        for (i, creep) in state.player(PlayerIndex::FIRST).creeps.iter().enumerate() {
            assert_eq!(creep.id, i as u32);
            assert!((creep.location.distance(origin) - CREEP_SPAWN_NUDGE).abs() < 1e-9);
            assert!(creep.location.distance(enemy) < origin.distance(enemy));
        }
    }

    #[test]
    fn test_bodies_round_trip_order() {
        let mut state = empty_state();
        state.spawn_creeps(PlayerIndex::SECOND, 1, CreepType::Ranged);

        let mut bodies = state.bodies();
        assert_eq!(bodies.len(), 1 + 1 + 2 + 2);
        // seat 0 has no creeps: [queen 0, queen 1, creep 1.0, creep 1.1, obstacles]
        bodies[2].location = Vec2::new(1000.0, 400.0);
        bodies[3].location = Vec2::new(1100.0, 400.0);
        state.apply_bodies(&bodies);

        let creeps = &state.player(PlayerIndex::SECOND).creeps;
        assert_eq!(creeps[0].location, Vec2::new(1000.0, 400.0));
        assert_eq!(creeps[1].location, Vec2::new(1100.0, 400.0));
        assert_eq!(state.obstacles[0].location, Vec2::new(600.0, 500.0));
    }

    #[test]
    fn test_serde_round_trip_keeps_hash() {
        let mut state = MatchState::new(&MatchConfig::with_seed(9)).unwrap();
        state.rng.next_u64();

        let json = serde_json::to_string(&state).unwrap();
        let mut restored: MatchState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.rng.state(), state.rng.state());
        assert_eq!(restored.compute_hash(), state.compute_hash());

        // Both copies roll the same tower damage from here on
        assert_eq!(restored.rng.next_int_range(6, 8), state.rng.next_int_range(6, 8));
    }

    #[test]
    fn test_deactivate_logs_once() {
        let mut state = empty_state();
        state.deactivate(PlayerIndex::SECOND, "timeout");
        state.deactivate(PlayerIndex::SECOND, "timeout again");

        assert_eq!(state.active_count(), 1);
        assert_eq!(state.summary, vec!["player 1 deactivated: timeout".to_string()]);
        assert_eq!(state.take_events().len(), 1);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_hash_tracks_structures() {
        let mut state = empty_state();
        let before = state.compute_hash();
        state.set_structure(0, Structure::Barracks(Barracks::new(PlayerIndex::FIRST, CreepType::Giant)));
        assert_ne!(before, state.compute_hash());

        state.clear_structure(0);
        assert_eq!(before, state.compute_hash());
    }
}
