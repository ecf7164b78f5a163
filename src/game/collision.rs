//! Collision Resolution
//!
//! Iterative pairwise overlap correction. Bodies are visited in slice order
//! and pairs `(i, j)` with `i < j`, so the outcome depends only on the order
//! the caller builds the slice in. Callers keep that order stable (queens,
//! creeps by id, then obstacles) for the match to stay reproducible.

use crate::core::constants::{
    COLLISION_EPSILON, IMMOVABLE_SEPARATION, MAX_COLLISION_PASSES, MOVABLE_SEPARATION,
    OBSTACLE_GAP, WORLD_HEIGHT, WORLD_WIDTH,
};
use crate::core::vec2::Vec2;
use crate::game::entity::Body;

/// How pairs of immovable bodies are treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionMode {
    /// Map generation: immovable pairs split the correction evenly and get an
    /// extra separation margin.
    Relaxation,
    /// Regular play: immovable pairs are left where they are.
    Settle,
}

/// Parameters for one call to [`fix_collisions`].
#[derive(Clone, Copy, Debug)]
pub struct ResolveOptions {
    /// Gap to keep between every pair, on top of their radii.
    pub gap: f64,
    /// Treatment of immovable pairs.
    pub mode: CollisionMode,
    /// Stop after one pass even if overlaps remain.
    pub single_pass: bool,
}

impl ResolveOptions {
    /// Loop until settled, no gap. Used for final placement and cleanup.
    pub const fn settle() -> Self {
        Self { gap: 0.0, mode: CollisionMode::Settle, single_pass: false }
    }

    /// One pass, no gap. Used between creep movement substeps.
    pub const fn settle_once() -> Self {
        Self { gap: 0.0, mode: CollisionMode::Settle, single_pass: true }
    }

    /// One relaxation pass with the given gap. The map generator loops it.
    pub const fn relax_once(gap: f64) -> Self {
        Self { gap, mode: CollisionMode::Relaxation, single_pass: true }
    }
}

/// Clamp a body inside the world. Immovable bodies keep an extra
/// [`OBSTACLE_GAP`] from the border.
#[inline]
pub fn clamp_to_world(body: &mut Body) {
    let margin = if body.is_immovable() {
        OBSTACLE_GAP + body.radius
    } else {
        body.radius
    };
    body.location = body.location.clamp_within(
        margin,
        WORLD_WIDTH - margin,
        margin,
        WORLD_HEIGHT - margin,
    );
}

/// Resolve overlaps between bodies.
///
/// Each pass first clamps every body into the world, then pushes apart every
/// pair whose overlap `r1 + r2 + gap - distance` exceeds the epsilon.
/// Displacement is split inversely to mass; an immovable body absorbs none.
///
/// Returns true if any pair needed correcting.
pub fn fix_collisions(bodies: &mut [Body], options: &ResolveOptions) -> bool {
    let mut found_any = false;

    for _ in 0..MAX_COLLISION_PASSES {
        let mut loop_again = false;

        for body in bodies.iter_mut() {
            clamp_to_world(body);
        }

        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                if separate_pair(bodies, i, j, options) {
                    loop_again = true;
                    found_any = true;
                }
            }
        }

        if options.single_pass || !loop_again {
            break;
        }
    }

    found_any
}

/// Push bodies `i` and `j` apart if they overlap. Returns true if moved.
fn separate_pair(bodies: &mut [Body], i: usize, j: usize, options: &ResolveOptions) -> bool {
    let a = bodies[i];
    let b = bodies[j];

    let overlap = a.radius + b.radius + options.gap - a.location.distance(b.location);
    if overlap <= COLLISION_EPSILON {
        return false;
    }

    // (share of overlap, extra margin) for a and b
    let ((share_a, extra_a), (share_b, extra_b)) = match (a.is_immovable(), b.is_immovable()) {
        (true, true) => match options.mode {
            CollisionMode::Settle => return false,
            CollisionMode::Relaxation => (
                (0.5, IMMOVABLE_SEPARATION),
                (0.5, IMMOVABLE_SEPARATION),
            ),
        },
        (true, false) => ((0.0, 0.0), (1.0, MOVABLE_SEPARATION)),
        (false, true) => ((1.0, MOVABLE_SEPARATION), (0.0, 0.0)),
        (false, false) => {
            let total = (a.mass + b.mass) as f64;
            (
                (b.mass as f64 / total, MOVABLE_SEPARATION),
                (a.mass as f64 / total, MOVABLE_SEPARATION),
            )
        }
    };

    // Coincident centres have no direction; separate along +x
    let mut a_to_b = b.location - a.location;
    if a_to_b == Vec2::ZERO {
        a_to_b = Vec2::RIGHT;
    }

    bodies[i].location -= a_to_b.resized_to(share_a * overlap + extra_a);
    bodies[j].location += a_to_b.resized_to(share_b * overlap + extra_b);
    true
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn min_gap(bodies: &[Body], gap: f64) -> f64 {
        let mut worst = f64::INFINITY;
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let d = bodies[i].location.distance(bodies[j].location)
                    - bodies[i].radius
                    - bodies[j].radius
                    - gap;
                worst = worst.min(d);
            }
        }
        worst
    }

    #[test]
    fn test_no_overlap_reports_no_correction() {
        let mut bodies = vec![
            Body::new(Vec2::new(300.0, 300.0), 20.0, 100),
            Body::new(Vec2::new(400.0, 300.0), 20.0, 100),
        ];
        assert!(!fix_collisions(&mut bodies, &ResolveOptions::settle()));
        assert_eq!(bodies[0].location, Vec2::new(300.0, 300.0));
    }

    #[test]
    fn test_immovable_unchanged_by_movable_partner() {
        let obstacle = Vec2::new(500.0, 500.0);
        let mut bodies = vec![
            Body::new(obstacle, 80.0, 0),
            Body::new(Vec2::new(550.0, 500.0), 30.0, 10_000),
        ];

        assert!(fix_collisions(&mut bodies, &ResolveOptions::settle()));
        assert_eq!(bodies[0].location, obstacle);
        assert!(bodies[1].location.distance(obstacle) >= 110.0 - COLLISION_EPSILON);
    }

    #[test]
    fn test_immovable_pair_left_alone_in_settle_mode() {
        let a = Vec2::new(500.0, 500.0);
        let b = Vec2::new(560.0, 500.0);
        let mut bodies = vec![Body::new(a, 80.0, 0), Body::new(b, 80.0, 0)];

        assert!(!fix_collisions(&mut bodies, &ResolveOptions::settle()));
        assert_eq!(bodies[0].location, a);
        assert_eq!(bodies[1].location, b);
    }

    #[test]
    fn test_immovable_pair_split_evenly_in_relaxation() {
        let mut bodies = vec![
            Body::new(Vec2::new(900.0, 500.0), 60.0, 0),
            Body::new(Vec2::new(1000.0, 500.0), 60.0, 0),
        ];

        assert!(fix_collisions(&mut bodies, &ResolveOptions::relax_once(0.0)));
        // overlap 20, each moves 10 + 20 margin
        assert!((bodies[0].location.x - 870.0).abs() < 1e-9);
        assert!((bodies[1].location.x - 1030.0).abs() < 1e-9);
    }

    #[test]
    fn test_heavier_body_moves_less() {
        let mut bodies = vec![
            Body::new(Vec2::new(900.0, 500.0), 20.0, 100),
            Body::new(Vec2::new(920.0, 500.0), 20.0, 900),
        ];

        fix_collisions(&mut bodies, &ResolveOptions::settle_once());
        let light_moved = (bodies[0].location.x - 900.0).abs();
        let heavy_moved = (bodies[1].location.x - 920.0).abs();
        assert!(heavy_moved < light_moved);
    }

    #[test]
    fn test_coincident_bodies_separate() {
        let mut bodies = vec![
            Body::new(Vec2::new(900.0, 500.0), 10.0, 400),
            Body::new(Vec2::new(900.0, 500.0), 10.0, 400),
        ];

        fix_collisions(&mut bodies, &ResolveOptions::settle());
        assert!(min_gap(&bodies, 0.0) >= -COLLISION_EPSILON);
        assert!(bodies[0].location.x < bodies[1].location.x);
    }

    #[test]
    fn test_bodies_clamped_into_world() {
        let mut bodies = vec![
            Body::new(Vec2::new(-50.0, 2000.0), 30.0, 10_000),
            Body::new(Vec2::new(5.0, 5.0), 60.0, 0),
        ];

        fix_collisions(&mut bodies, &ResolveOptions::settle());
        assert_eq!(bodies[0].location, Vec2::new(30.0, WORLD_HEIGHT - 30.0));
        assert_eq!(bodies[1].location, Vec2::new(150.0, 150.0));
    }

    #[test]
    fn test_single_pass_is_order_dependent_but_deterministic() {
        let make = || {
            vec![
                Body::new(Vec2::new(900.0, 500.0), 20.0, 400),
                Body::new(Vec2::new(910.0, 505.0), 20.0, 400),
                Body::new(Vec2::new(920.0, 495.0), 20.0, 400),
            ]
        };
        let mut first = make();
        let mut second = make();
        fix_collisions(&mut first, &ResolveOptions::settle_once());
        fix_collisions(&mut second, &ResolveOptions::settle_once());
        assert_eq!(first, second);
    }

    fn movable_body() -> impl Strategy<Value = Body> {
        (100.0..1800.0f64, 100.0..900.0f64, 5.0..30.0f64, 100..10_000i32)
            .prop_map(|(x, y, r, m)| Body::new(Vec2::new(x, y), r, m))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_full_resolution_leaves_no_overlap(
            mut bodies in prop::collection::vec(movable_body(), 2..10),
        ) {
            fix_collisions(&mut bodies, &ResolveOptions::settle());
            prop_assert!(min_gap(&bodies, 0.0) >= -COLLISION_EPSILON);
        }

        #[test]
        fn prop_immovable_never_pushed(
            mut movers in prop::collection::vec(movable_body(), 1..6),
            ox in 300.0..1600.0f64,
            oy in 300.0..700.0f64,
            radius in 60.0..90.0f64,
        ) {
            let anchor = Vec2::new(ox, oy);
            movers.push(Body::new(anchor, radius, 0));
            fix_collisions(&mut movers, &ResolveOptions::settle());
            prop_assert_eq!(movers.last().map(|b| b.location), Some(anchor));
        }

        #[test]
        fn prop_gap_kept_around_fixed_obstacles(
            mut bodies in prop::collection::vec(movable_body(), 2..8),
            gap in 1.0..20.0f64,
            r1 in 60.0..90.0f64,
            r2 in 60.0..90.0f64,
        ) {
            let anchors = [Vec2::new(500.0, 500.0), Vec2::new(1400.0, 500.0)];
            bodies.insert(0, Body::new(anchors[0], r1, 0));
            bodies.push(Body::new(anchors[1], r2, 0));

            let options = ResolveOptions { gap, ..ResolveOptions::settle() };
            fix_collisions(&mut bodies, &options);

            prop_assert!(min_gap(&bodies, gap) >= -COLLISION_EPSILON);
            prop_assert_eq!(bodies[0].location, anchors[0]);
            prop_assert_eq!(bodies[bodies.len() - 1].location, anchors[1]);
        }
    }
}
