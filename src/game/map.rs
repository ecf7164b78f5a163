//! Map Generation
//!
//! Places mirrored obstacle pairs by relaxation: each pass snaps every pair
//! onto a point reflection through the map centre, then runs one collision
//! pass. A layout that has not settled after the pass limit is thrown away
//! whole and a fresh one is drawn, up to the configured attempt ceiling.

use tracing::{debug, info};

use crate::config::MatchConfig;
use crate::core::constants::{
    OBSTACLE_GAP, OBSTACLE_MINERAL_BASERATE_MAX, OBSTACLE_MINERAL_BASERATE_MIN,
    OBSTACLE_MINERAL_INCREASE, OBSTACLE_MINERAL_INCREASE_DISTANCE_1,
    OBSTACLE_MINERAL_INCREASE_DISTANCE_2, OBSTACLE_MINERAL_MAX, OBSTACLE_MINERAL_MIN,
    OBSTACLE_RADIUS_MAX, OBSTACLE_RADIUS_MIN, QUEEN_MASS, QUEEN_RADIUS, QUEEN_SPAWN_DISTANCE,
    WORLD_HEIGHT, WORLD_WIDTH,
};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::error::SimError;
use crate::game::collision::{fix_collisions, ResolveOptions};
use crate::game::entity::{Body, Obstacle, PlayerIndex};

/// Centre of the playfield.
pub const MAP_CENTER: Vec2 = Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0);

/// Output of map generation.
#[derive(Clone, Debug)]
pub struct MapLayout {
    /// Obstacles; ids `2k` and `2k+1` are mirror partners
    pub obstacles: Vec<Obstacle>,
    /// Starting queen positions, by seat
    pub queen_locations: [Vec2; 2],
}

/// Generate a legal, point-symmetric layout.
///
/// Returns [`SimError::MapGeneration`] once `config.map_attempts` layouts
/// have failed to settle.
pub fn generate_map(rng: &mut DeterministicRng, config: &MatchConfig) -> Result<MapLayout, SimError> {
    for attempt in 1..=config.map_attempts {
        let Some(mut obstacles) = try_layout(rng, config) else {
            debug!(attempt, "abandoning obstacle layout");
            continue;
        };

        apply_mineral_bonuses(&mut obstacles);
        let queen_locations = place_queens(&obstacles);

        info!(attempt, obstacles = obstacles.len(), "map generated");
        return Ok(MapLayout { obstacles, queen_locations });
    }

    Err(SimError::MapGeneration { attempts: config.map_attempts })
}

/// Draw one layout and relax it. `None` if it never settled.
fn try_layout(rng: &mut DeterministicRng, config: &MatchConfig) -> Option<Vec<Obstacle>> {
    let mut obstacles = Vec::new();
    for pair in 0..config.obstacle_pairs.saturating_sub(1) {
        let rate = rng.next_int_range(OBSTACLE_MINERAL_BASERATE_MIN, OBSTACLE_MINERAL_BASERATE_MAX);
        let minerals = rng.next_int_range(OBSTACLE_MINERAL_MIN, OBSTACLE_MINERAL_MAX);
        let radius = rng.next_int_range(OBSTACLE_RADIUS_MIN, OBSTACLE_RADIUS_MAX) as f64;

        for member in 0..2 {
            let location = rng.random_position(WORLD_WIDTH, WORLD_HEIGHT);
            obstacles.push(Obstacle::new(pair * 2 + member, location, radius, rate, minerals));
        }
    }

    let options = ResolveOptions::relax_once(OBSTACLE_GAP);
    for _ in 0..config.relaxation_passes {
        mirror_pairs(&mut obstacles);

        let mut bodies: Vec<Body> = obstacles.iter().map(Obstacle::body).collect();
        let corrected = fix_collisions(&mut bodies, &options);
        for (obstacle, body) in obstacles.iter_mut().zip(&bodies) {
            obstacle.location = body.location;
        }

        if !corrected {
            return Some(obstacles);
        }
    }

    None
}

/// Snap each pair onto the midpoint of A and B's mirror image.
fn mirror_pairs(obstacles: &mut [Obstacle]) {
    for pair in obstacles.chunks_exact_mut(2) {
        let mid = (pair[0].location + pair[1].location.reflect_through(MAP_CENTER)) / 2.0;
        pair[0].location = mid;
        pair[1].location = mid.reflect_through(MAP_CENTER);
        pair[1].radius = pair[0].radius;
    }
}

/// Central obstacles yield more; the two thresholds stack.
fn apply_mineral_bonuses(obstacles: &mut [Obstacle]) {
    for obstacle in obstacles {
        let distance = obstacle.location.distance(MAP_CENTER);
        for threshold in [OBSTACLE_MINERAL_INCREASE_DISTANCE_1, OBSTACLE_MINERAL_INCREASE_DISTANCE_2] {
            if distance < threshold {
                obstacle.max_mineral_rate += 1;
                obstacle.minerals += OBSTACLE_MINERAL_INCREASE;
            }
        }
    }
}

/// Queens start in opposite corners, then settle against the obstacles.
fn place_queens(obstacles: &[Obstacle]) -> [Vec2; 2] {
    let corners = [
        Vec2::new(QUEEN_SPAWN_DISTANCE, QUEEN_SPAWN_DISTANCE),
        Vec2::new(WORLD_WIDTH - QUEEN_SPAWN_DISTANCE, WORLD_HEIGHT - QUEEN_SPAWN_DISTANCE),
    ];

    let mut bodies: Vec<Body> = PlayerIndex::BOTH
        .iter()
        .map(|seat| Body::new(corners[seat.index()], QUEEN_RADIUS, QUEEN_MASS))
        .chain(obstacles.iter().map(Obstacle::body))
        .collect();
    fix_collisions(&mut bodies, &ResolveOptions::settle());

    [bodies[0].location, bodies[1].location]
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::COLLISION_EPSILON;
    use proptest::prelude::*;

    fn generate(seed: u64) -> MapLayout {
        let config = MatchConfig::with_seed(seed);
        let mut rng = DeterministicRng::new(seed);
        generate_map(&mut rng, &config).expect("default config should converge")
    }

    fn assert_symmetric(layout: &MapLayout) {
        for pair in layout.obstacles.chunks_exact(2) {
            let mirrored = pair[0].location.reflect_through(MAP_CENTER);
            assert!(mirrored.distance(pair[1].location) < 1e-6, "pair {} not mirrored", pair[0].id);
            assert_eq!(pair[0].radius, pair[1].radius);
            assert_eq!(pair[0].max_mineral_rate, pair[1].max_mineral_rate);
            assert_eq!(pair[0].minerals, pair[1].minerals);
        }
    }

    fn assert_separated(layout: &MapLayout) {
        let obstacles = &layout.obstacles;
        for i in 0..obstacles.len() {
            for j in (i + 1)..obstacles.len() {
                let a = &obstacles[i];
                let b = &obstacles[j];
                let distance = a.location.distance(b.location);
                assert!(
                    distance >= a.radius + b.radius + OBSTACLE_GAP - COLLISION_EPSILON,
                    "obstacles {} and {} too close: {}",
                    a.id,
                    b.id,
                    distance
                );
            }
        }
    }

    #[test]
    fn test_obstacle_count_and_ids() {
        let layout = generate(42);
        let expected = (MatchConfig::default().obstacle_pairs - 1) * 2;
        assert_eq!(layout.obstacles.len() as u32, expected);
        for (index, obstacle) in layout.obstacles.iter().enumerate() {
            assert_eq!(obstacle.id as usize, index);
            assert!(obstacle.structure.is_none());
        }
    }

    #[test]
    fn test_same_seed_same_map() {
        let a = generate(7);
        let b = generate(7);
        for (x, y) in a.obstacles.iter().zip(&b.obstacles) {
            assert_eq!(x.location, y.location);
            assert_eq!(x.radius, y.radius);
        }
        assert_eq!(a.queen_locations, b.queen_locations);
    }

    #[test]
    fn test_queens_clear_of_obstacles() {
        let layout = generate(1234);
        for location in layout.queen_locations {
            for obstacle in &layout.obstacles {
                assert!(obstacle.gap_to(location, 30.0) >= -COLLISION_EPSILON);
            }
        }
    }

    #[test]
    fn test_mineral_bonus_stacks_near_center() {
        let mut obstacles = vec![
            Obstacle::new(0, MAP_CENTER, 60.0, 1, 200),
            Obstacle::new(1, MAP_CENTER + Vec2::new(300.0, 0.0), 60.0, 1, 200),
            Obstacle::new(2, Vec2::new(150.0, 150.0), 60.0, 1, 200),
        ];
        apply_mineral_bonuses(&mut obstacles);

        assert_eq!((obstacles[0].max_mineral_rate, obstacles[0].minerals), (3, 300));
        assert_eq!((obstacles[1].max_mineral_rate, obstacles[1].minerals), (2, 250));
        assert_eq!((obstacles[2].max_mineral_rate, obstacles[2].minerals), (1, 200));
    }

    #[test]
    fn test_impossible_layout_hits_retry_ceiling() {
        // Far too many obstacles to fit with the required gap
        let config = MatchConfig {
            obstacle_pairs: 60,
            map_attempts: 2,
            relaxation_passes: 5,
            ..MatchConfig::default()
        };
        let mut rng = DeterministicRng::new(1);
        let err = generate_map(&mut rng, &config).unwrap_err();
        assert!(matches!(err, SimError::MapGeneration { attempts: 2 }));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_layout_symmetric_and_separated(seed in any::<u64>()) {
            let layout = generate(seed);
            assert_symmetric(&layout);
            assert_separated(&layout);
        }
    }
}
