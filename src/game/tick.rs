//! Authoritative Turn Pipeline
//!
//! One call to [`tick`] runs one turn. Phases run in a fixed order over the
//! whole state; nothing inside a phase depends on hash-map order or wall
//! time, so the same seed and responses always give the same match.
//!
//! 1. broadcast (see [`broadcast`], sent before responses are gathered)
//! 2. command intake, per seat
//! 3. training validation and spending
//! 4. queen command
//! 5. build conflict resolution
//! 6. build execution
//! 7. creep attrition
//! 8. creep movement in substeps
//! 9. combat
//! 10. razing by creeps
//! 11. razing by queens
//! 12. structure actions
//! 13. win check

use std::cmp::Ordering;

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::constants::{
    BUILD_DISTANCE, CREEP_ATTRITION, CREEP_MOVE_SUBSTEPS, CREEP_TARGET_OFFSET, QUEEN_RADIUS,
    QUEEN_SPEED, TOUCHING_DELTA, TOWER_CREEP_DAMAGE_MAX, TOWER_CREEP_DAMAGE_MIN, TOWER_HP_DECAY,
    TOWER_HP_INITIAL, TOWER_QUEEN_PUSHBACK,
};
use crate::core::vec2::Vec2;
use crate::error::InputError;
use crate::game::collision::{fix_collisions, ResolveOptions};
use crate::game::command::{QueenCommand, TrainingRequest};
use crate::game::entity::{Creep, CreepType, Obstacle, PlayerIndex};
use crate::game::events::{GameEvent, GameEventData, Razer};
use crate::game::protocol::turn_lines;
use crate::game::state::{MatchPhase, MatchState};
use crate::game::structure::{Barracks, Mine, Structure, StructureKind, Tower};

/// What a player sent back for one turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerResponse {
    /// Both lines arrived in time
    Lines {
        /// Line 1: training request
        training: String,
        /// Line 2: queen command
        queen: String,
    },
    /// Nothing (or not enough) arrived before the deadline
    Timeout,
}

impl PlayerResponse {
    /// Build a response from its two lines.
    pub fn lines(training: impl Into<String>, queen: impl Into<String>) -> Self {
        Self::Lines { training: training.into(), queen: queen.into() }
    }

    /// Train nothing, queen waits.
    pub fn idle() -> Self {
        Self::lines("0", "WAIT")
    }
}

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Whether match ended this tick
    pub match_ended: bool,
    /// Winner (if match ended with winner)
    pub winner: Option<PlayerIndex>,
}

/// A build that passed validation, applied in phase 6.
#[derive(Clone, Copy, Debug)]
struct ScheduledBuild {
    player: PlayerIndex,
    obstacle: usize,
    kind: StructureKind,
}

/// Phase 1: each seat's view of the current state.
pub fn broadcast(state: &MatchState) -> [Vec<String>; 2] {
    PlayerIndex::BOTH.map(|seat| turn_lines(state, seat))
}

/// Run one turn.
///
/// `responses` is indexed by seat. Responses of deactivated players are
/// ignored. Calling this on an ended match changes nothing.
pub fn tick(state: &mut MatchState, responses: &[PlayerResponse; 2]) -> TickResult {
    let mut result = TickResult::default();

    if state.is_ended() {
        result.match_ended = true;
        result.winner = state.winner;
        return result;
    }

    state.turn += 1;

    // 2-4. Commands, seat order
    let mut scheduled = Vec::new();
    for seat in PlayerIndex::BOTH {
        if state.player(seat).active {
            process_player(state, seat, &responses[seat.index()], &mut scheduled);
        }
    }

    // 5-6. Builds
    resolve_build_conflict(state, &mut scheduled);
    for build in scheduled {
        execute_build(state, build);
    }

    // 7-9. Creeps
    apply_attrition(state);
    move_creeps(state);
    resolve_combat(state);

    // 10-11. Razing
    raze_by_creeps(state);
    raze_by_queens(state);

    // 12. Structures
    act_structures(state);
    state.remove_dead_creeps();
    settle(state);

    // 13. Win check
    check_end_conditions(state, &mut result);

    #[cfg(feature = "debug-tracing")]
    debug!(turn = state.turn, hash = %hex::encode(state.compute_hash()), "turn complete");

    result.events = state.take_events();
    result
}

// =============================================================================
// COMMANDS
// =============================================================================

fn process_player(
    state: &mut MatchState,
    seat: PlayerIndex,
    response: &PlayerResponse,
    scheduled: &mut Vec<ScheduledBuild>,
) {
    let (training, queen) = match response {
        PlayerResponse::Timeout => {
            state.deactivate(seat, "timeout");
            return;
        }
        PlayerResponse::Lines { training, queen } => (training, queen),
    };

    if let Err(error) = process_training(state, seat, training) {
        reject(state, seat, &error);
        if error.is_fatal() {
            return;
        }
    }

    match process_queen_command(state, seat, queen) {
        Ok(Some(build)) => scheduled.push(build),
        Ok(None) => {}
        Err(error) => reject(state, seat, &error),
    }
}

/// Deactivate on a fatal error, log a warning otherwise.
fn reject(state: &mut MatchState, seat: PlayerIndex, error: &InputError) {
    if error.is_fatal() {
        state.deactivate(seat, error.to_string());
    } else {
        state.warn(seat, error);
    }
}

/// Phase 3. All-or-nothing: any rejected barracks or an unaffordable total
/// leaves every barracks and the resource counter untouched.
fn process_training(state: &mut MatchState, seat: PlayerIndex, line: &str) -> Result<(), InputError> {
    let request: TrainingRequest = line.parse()?;

    // Unknown ids are fatal, so resolve them all before any warning check
    let indices = request
        .obstacle_ids
        .iter()
        .map(|&id| state.obstacle_index(id))
        .collect::<Result<Vec<_>, _>>()?;

    let mut batch: Vec<usize> = Vec::with_capacity(indices.len());
    let mut requested = 0;
    for index in indices {
        let obstacle = &state.obstacles[index];
        let Some(Structure::Barracks(barracks)) = &obstacle.structure else {
            return Err(InputError::NotBarracks(obstacle.id));
        };
        if barracks.owner != seat {
            return Err(InputError::NotOwned(obstacle.id));
        }
        if barracks.is_training() || batch.contains(&index) {
            return Err(InputError::AlreadyTraining(obstacle.id));
        }
        requested += barracks.creep_type.stats().cost;
        batch.push(index);
    }

    let available = state.player(seat).resources;
    if requested > available {
        return Err(InputError::InsufficientResources { requested, available });
    }

    state.player_mut(seat).resources -= requested;
    for index in batch {
        if let Some(Structure::Barracks(barracks)) = &mut state.obstacles[index].structure {
            barracks.start_training();
            debug!(turn = state.turn, %seat, obstacle = index, creep = barracks.creep_type.token(), "training started");
        }
    }
    Ok(())
}

/// Phase 4. Returns the build to schedule, if the command is an in-range BUILD.
fn process_queen_command(
    state: &mut MatchState,
    seat: PlayerIndex,
    line: &str,
) -> Result<Option<ScheduledBuild>, InputError> {
    let command: QueenCommand = line.parse()?;

    match command {
        QueenCommand::Wait => Ok(None),
        QueenCommand::Move(target) => {
            state.player_mut(seat).queen.move_towards(target, QUEEN_SPEED);
            Ok(None)
        }
        QueenCommand::Build { obstacle_id, kind } => {
            let index = state.obstacle_index(obstacle_id)?;
            let obstacle = &state.obstacles[index];
            let queen = state.player(seat).queen.location;

            if obstacle.gap_to(queen, QUEEN_RADIUS) > BUILD_DISTANCE {
                let target = obstacle.location;
                state.player_mut(seat).queen.move_towards(target, QUEEN_SPEED);
                return Ok(None);
            }

            check_build(obstacle, seat, kind)?;
            Ok(Some(ScheduledBuild { player: seat, obstacle: index, kind }))
        }
    }
}

fn check_build(obstacle: &Obstacle, seat: PlayerIndex, kind: StructureKind) -> Result<(), InputError> {
    match &obstacle.structure {
        Some(structure) if structure.owner() != seat => {
            return Err(InputError::OwnedByEnemy(obstacle.id));
        }
        Some(Structure::Barracks(barracks)) if barracks.is_training() => {
            return Err(InputError::TrainingInProgress(obstacle.id));
        }
        _ => {}
    }
    if kind == StructureKind::Mine && obstacle.minerals <= 0 {
        return Err(InputError::MineralsExhausted(obstacle.id));
    }
    Ok(())
}

/// Phase 5. Two builds on one obstacle in the same turn cancel each other.
fn resolve_build_conflict(state: &mut MatchState, scheduled: &mut Vec<ScheduledBuild>) {
    let conflict = matches!(scheduled.as_slice(), [a, b] if a.obstacle == b.obstacle);
    if !conflict {
        return;
    }
    for build in scheduled.drain(..) {
        let id = state.obstacles[build.obstacle].id;
        state.warn(build.player, &InputError::BuildConflict(id));
    }
}

/// Phase 6.
fn execute_build(state: &mut MatchState, build: ScheduledBuild) {
    let ScheduledBuild { player, obstacle, kind } = build;
    let target = &mut state.obstacles[obstacle];
    let id = target.id;
    let area = target.area();
    let max_rate = target.max_mineral_rate;

    match (kind, &mut target.structure) {
        (StructureKind::Mine, Some(Structure::Mine(mine))) => mine.upgrade(max_rate),
        (StructureKind::Mine, slot) => *slot = Some(Structure::Mine(Mine::new(player))),
        (StructureKind::Tower, Some(Structure::Tower(tower))) => tower.reinforce(area),
        (StructureKind::Tower, slot) => {
            *slot = Some(Structure::Tower(Tower::new(player, TOWER_HP_INITIAL, area)));
        }
        (StructureKind::Barracks(creep_type), slot) => {
            *slot = Some(Structure::Barracks(Barracks::new(player, creep_type)));
        }
    }

    debug!(turn = state.turn, %player, obstacle = id, ?kind, "structure built");
    state.push_event(GameEventData::StructureBuilt { player, obstacle_id: id, kind });
}

// =============================================================================
// CREEPS
// =============================================================================

/// Phase 7.
fn apply_attrition(state: &mut MatchState) {
    for player in &mut state.players {
        for creep in &mut player.creeps {
            creep.damage(CREEP_ATTRITION);
        }
    }
    state.remove_dead_creeps();
}

/// Phase 8. Every substep moves all creeps a fifth of their speed, then runs
/// one collision pass over every body.
fn move_creeps(state: &mut MatchState) {
    for _ in 0..CREEP_MOVE_SUBSTEPS {
        for seat in PlayerIndex::BOTH {
            for i in 0..state.player(seat).creeps.len() {
                let creep = &state.player(seat).creeps[i];
                let Some(target) = march_target(state, creep) else {
                    continue;
                };
                let step = creep.stats().speed / CREEP_MOVE_SUBSTEPS as f64;
                let location = creep.location.towards(target, step);
                state.player_mut(seat).creeps[i].location = location;
            }
        }

        let mut bodies = state.bodies();
        fix_collisions(&mut bodies, &ResolveOptions::settle_once());
        state.apply_bodies(&bodies);
    }
}

/// Where a creep heads this substep; `None` once its target is in reach.
///
/// Giants go for the nearest enemy tower, everything else (and giants with no
/// tower left to hit) for the enemy queen.
fn march_target(state: &MatchState, creep: &Creep) -> Option<Vec2> {
    let stats = creep.stats();

    if creep.creep_type == CreepType::Giant {
        if let Some(index) = nearest_enemy_tower(state, creep.owner, creep.location) {
            let tower = &state.obstacles[index];
            return (!stats.in_reach(tower.gap_to(creep.location, stats.radius)))
                .then_some(tower.location);
        }
    }

    let queen = state.player(creep.owner.enemy()).queen.location;
    let gap = creep.location.distance(queen) - stats.radius - QUEEN_RADIUS;
    (!stats.in_reach(gap))
        .then(|| queen + (creep.location - queen).resized_to(CREEP_TARGET_OFFSET))
}

/// Obstacle carrying a tower of `owner`'s enemy closest to `location`.
fn nearest_enemy_tower(state: &MatchState, owner: PlayerIndex, location: Vec2) -> Option<usize> {
    state
        .obstacles
        .iter()
        .enumerate()
        .filter(|(_, obstacle)| {
            matches!(&obstacle.structure, Some(Structure::Tower(tower)) if tower.owner != owner)
        })
        .min_by(|a, b| compare_distance(a.1.location, b.1.location, location))
        .map(|(index, _)| index)
}

fn compare_distance(a: Vec2, b: Vec2, from: Vec2) -> Ordering {
    a.distance(from).total_cmp(&b.distance(from))
}

/// Phase 9. Creeps act in seat order, then spawn order. A creep killed
/// earlier in the phase does not act.
fn resolve_combat(state: &mut MatchState) {
    for seat in PlayerIndex::BOTH {
        let enemy = seat.enemy();
        for i in 0..state.player(seat).creeps.len() {
            let creep = state.player(seat).creeps[i].clone();
            if !creep.is_alive() {
                continue;
            }
            let stats = creep.stats();

            if creep.creep_type == CreepType::Giant {
                siege(state, &creep);
                continue;
            }

            let queen = &mut state.player_mut(enemy).queen;
            let gap = creep.location.distance(queen.location) - stats.radius - QUEEN_RADIUS;
            if stats.in_reach(gap) {
                queen.health -= stats.queen_damage;
                continue;
            }

            if creep.creep_type == CreepType::Ranged {
                let target = state
                    .player(enemy)
                    .creeps
                    .iter()
                    .enumerate()
                    .filter(|(_, other)| other.is_alive())
                    .filter(|(_, other)| {
                        stats.in_reach(creep.location.distance(other.location) - stats.radius - other.stats().radius)
                    })
                    .min_by(|a, b| compare_distance(a.1.location, b.1.location, creep.location))
                    .map(|(index, _)| index);
                if let Some(target) = target {
                    state.player_mut(enemy).creeps[target].damage(stats.queen_damage);
                }
            }
        }
    }
    state.remove_dead_creeps();
}

/// A giant in reach of an enemy tower knocks health off it.
fn siege(state: &mut MatchState, giant: &Creep) {
    let stats = giant.stats();
    let Some(index) = nearest_enemy_tower(state, giant.owner, giant.location) else {
        return;
    };
    let obstacle = &mut state.obstacles[index];
    if !stats.in_reach(obstacle.gap_to(giant.location, stats.radius)) {
        return;
    }

    let area = obstacle.area();
    let id = obstacle.id;
    let Some(Structure::Tower(tower)) = &mut obstacle.structure else {
        return;
    };
    tower.health -= stats.tower_damage;
    tower.refresh_radius(area);
    if tower.is_destroyed() {
        let owner = tower.owner;
        obstacle.structure = None;
        state.push_event(GameEventData::StructureRazed { obstacle_id: id, owner, by: Razer::Siege });
    }
}

// =============================================================================
// RAZING
// =============================================================================

/// Phase 10. Creeps tear down enemy mines they touch.
fn raze_by_creeps(state: &mut MatchState) {
    let view: &MatchState = state;
    let contacts: Vec<(usize, PlayerIndex)> = view
        .players
        .iter()
        .flat_map(|player| player.creeps.iter())
        .filter_map(|creep| {
            touching_obstacle(view, creep.location, creep.stats().radius).map(|index| (index, creep.owner))
        })
        .collect();

    for (index, razer) in contacts {
        let structure = &state.obstacles[index].structure;
        if matches!(structure, Some(Structure::Mine(mine)) if mine.owner != razer) {
            raze(state, index, Razer::Creep);
        }
    }
}

/// Phase 11. Queens tear down enemy mines and barracks; towers are immune.
fn raze_by_queens(state: &mut MatchState) {
    for seat in PlayerIndex::BOTH {
        let location = state.player(seat).queen.location;
        let Some(index) = touching_obstacle(state, location, QUEEN_RADIUS) else {
            continue;
        };
        let enemy_owned = match &state.obstacles[index].structure {
            Some(Structure::Mine(mine)) => mine.owner != seat,
            Some(Structure::Barracks(barracks)) => barracks.owner != seat,
            _ => false,
        };
        if enemy_owned {
            raze(state, index, Razer::Queen);
        }
    }
}

/// Nearest obstacle (by centre), if a unit at `location` is touching it.
fn touching_obstacle(state: &MatchState, location: Vec2, radius: f64) -> Option<usize> {
    state
        .nearest_obstacle(location)
        .filter(|&index| state.obstacles[index].gap_to(location, radius) <= TOUCHING_DELTA)
}

fn raze(state: &mut MatchState, index: usize, by: Razer) {
    let id = state.obstacles[index].id;
    if let Some(structure) = state.clear_structure(index) {
        debug!(turn = state.turn, obstacle = id, ?by, "structure razed");
        state.push_event(GameEventData::StructureRazed { obstacle_id: id, owner: structure.owner(), by });
    }
}

// =============================================================================
// STRUCTURES
// =============================================================================

/// Phase 12. Obstacles act in id order.
fn act_structures(state: &mut MatchState) {
    for index in 0..state.obstacles.len() {
        let Some(structure) = state.obstacles[index].structure.take() else {
            continue;
        };
        let kept = match structure {
            Structure::Tower(tower) => act_tower(state, index, tower).map(Structure::Tower),
            Structure::Mine(mine) => act_mine(state, index, mine).map(Structure::Mine),
            Structure::Barracks(barracks) => Some(Structure::Barracks(act_barracks(state, index, barracks))),
        };
        state.obstacles[index].structure = kept;
    }
}

/// Fire at the closest enemy creep, shove the enemy queen, then decay.
/// Returns `None` once the tower has collapsed.
fn act_tower(state: &mut MatchState, index: usize, mut tower: Tower) -> Option<Tower> {
    let origin = state.obstacles[index].location;
    let area = state.obstacles[index].area();
    let enemy = tower.owner.enemy();

    let target = state
        .player(enemy)
        .creeps
        .iter()
        .enumerate()
        .filter(|(_, creep)| creep.is_alive())
        .min_by(|a, b| compare_distance(a.1.location, b.1.location, origin))
        .filter(|(_, creep)| creep.location.distance(origin) < tower.attack_radius)
        .map(|(i, _)| i);
    if let Some(target) = target {
        let damage = state.rng.next_int_range(TOWER_CREEP_DAMAGE_MIN, TOWER_CREEP_DAMAGE_MAX);
        state.player_mut(enemy).creeps[target].damage(damage);
    }

    let queen = &mut state.player_mut(enemy).queen;
    if queen.location.distance(origin) < tower.attack_radius {
        let push = (queen.location - origin).resized_to(TOWER_QUEEN_PUSHBACK);
        queen.location += push;
    }

    tower.health -= TOWER_HP_DECAY;
    tower.refresh_radius(area);
    if tower.is_destroyed() {
        let obstacle_id = state.obstacles[index].id;
        state.push_event(GameEventData::TowerCollapsed { obstacle_id, owner: tower.owner });
        return None;
    }
    Some(tower)
}

/// Credit the owner and deplete the obstacle. Returns `None` once exhausted.
fn act_mine(state: &mut MatchState, index: usize, mine: Mine) -> Option<Mine> {
    let obstacle = &mut state.obstacles[index];
    let mined = mine.income_rate.min(obstacle.minerals).max(0);
    obstacle.minerals -= mined;
    let exhausted = obstacle.minerals <= 0;
    let obstacle_id = obstacle.id;

    state.player_mut(mine.owner).resources += mined;
    if exhausted {
        state.push_event(GameEventData::MineExhausted { obstacle_id, owner: mine.owner });
        return None;
    }
    Some(mine)
}

/// Advance training; a finished job spawns its creeps.
fn act_barracks(state: &mut MatchState, index: usize, mut barracks: Barracks) -> Barracks {
    if let Some(job) = barracks.advance() {
        let count = state.spawn_creeps(barracks.owner, index, job.creep_type);
        let obstacle_id = state.obstacles[index].id;
        state.push_event(GameEventData::CreepsTrained {
            player: barracks.owner,
            obstacle_id,
            creep_type: job.creep_type,
            count,
        });
    }
    barracks
}

/// Full collision cleanup at the end of the turn.
fn settle(state: &mut MatchState) {
    let mut bodies = state.bodies();
    fix_collisions(&mut bodies, &ResolveOptions::settle());
    state.apply_bodies(&bodies);
}

// =============================================================================
// END OF MATCH
// =============================================================================

/// Phase 13.
fn check_end_conditions(state: &mut MatchState, result: &mut TickResult) {
    for seat in PlayerIndex::BOTH {
        if state.player(seat).queen.is_dead() {
            state.deactivate(seat, "queen destroyed");
        }
    }

    if state.active_count() < 2 {
        let winner = PlayerIndex::BOTH.into_iter().find(|&seat| state.player(seat).active);
        end_match(state, result, winner);
        return;
    }

    if state.turn >= state.max_turns {
        let [first, second] = &state.players;
        let winner = match first.queen.health.cmp(&second.queen.health) {
            Ordering::Greater => Some(PlayerIndex::FIRST),
            Ordering::Less => Some(PlayerIndex::SECOND),
            Ordering::Equal => None,
        };
        end_match(state, result, winner);
    }
}

/// End the match with the given winner (`None` is a draw).
fn end_match(state: &mut MatchState, result: &mut TickResult, winner: Option<PlayerIndex>) {
    state.phase = MatchPhase::Ended;
    state.winner = winner;
    result.match_ended = true;
    result.winner = winner;

    match winner {
        Some(player) => info!(turn = state.turn, %player, "match ended"),
        None => info!(turn = state.turn, "match ended in a draw"),
    }
    let event = GameEvent::match_ended(state.turn, winner);
    state.pending_events.push(event);
}

/// Replay a match from recorded responses.
///
/// Stops early if the match ends. Returns the final state and every event.
pub fn replay_match(
    initial_state: MatchState,
    responses: &[[PlayerResponse; 2]],
) -> (MatchState, Vec<GameEvent>) {
    let mut state = initial_state;
    let mut all_events = Vec::new();

    for turn in responses {
        let result = tick(&mut state, turn);
        all_events.extend(result.events);

        if result.match_ended {
            break;
        }
    }

    (state, all_events)
}

// =============================================================================
// TESTS
// =============================================================================
