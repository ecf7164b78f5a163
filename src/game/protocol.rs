//! Outbound Protocol
//!
//! Line-oriented view of the match sent to each player. Everything is from
//! the receiving player's perspective: owner 0 is "you", 1 is the enemy.
//! Coordinates and radii are truncated to integers.
//!
//! Init block, once:
//! ```text
//! <obstacle count>
//! <id> <x> <y> <radius>            (per obstacle)
//! ```
//!
//! Turn block:
//! ```text
//! <x> <y> <health> <resources>     (own queen)
//! <x> <y> <health>                 (enemy queen)
//! <id> <minerals> <maxMineralRate> <type> <owner> <param1> <param2>   (per obstacle)
//! <own creep count>
//! <x> <y> <health> <creepType>     (per creep)
//! <enemy creep count>
//! <x> <y> <health> <creepType>     (per creep)
//! ```

use crate::game::entity::{Creep, Obstacle, PlayerIndex};
use crate::game::state::MatchState;
use crate::game::structure::Structure;

/// Static obstacle description, sent before the first turn.
pub fn init_lines(state: &MatchState) -> Vec<String> {
    let mut lines = Vec::with_capacity(state.obstacles.len() + 1);
    lines.push(state.obstacles.len().to_string());
    for obstacle in &state.obstacles {
        let (x, y) = obstacle.location.to_ints();
        lines.push(format!("{} {} {} {}", obstacle.id, x, y, obstacle.radius as i32));
    }
    lines
}

/// Per-turn view for `viewer`.
pub fn turn_lines(state: &MatchState, viewer: PlayerIndex) -> Vec<String> {
    let me = state.player(viewer);
    let enemy = state.player(viewer.enemy());
    let mut lines = Vec::new();

    let (x, y) = me.queen.location.to_ints();
    lines.push(format!("{} {} {} {}", x, y, me.queen.health, me.resources));
    let (x, y) = enemy.queen.location.to_ints();
    lines.push(format!("{} {} {}", x, y, enemy.queen.health));

    lines.extend(state.obstacles.iter().map(|o| obstacle_line(o, viewer)));

    for creeps in [&me.creeps, &enemy.creeps] {
        lines.push(creeps.len().to_string());
        lines.extend(creeps.iter().map(creep_line));
    }
    lines
}

/// `id minerals maxMineralRate type owner param1 param2`
fn obstacle_line(obstacle: &Obstacle, viewer: PlayerIndex) -> String {
    let (code, owner, param1, param2) = match &obstacle.structure {
        None => (-1, -1, -1, -1),
        Some(structure) => {
            let owner = if structure.owner() == viewer { 0 } else { 1 };
            let (param1, param2) = match structure {
                Structure::Mine(mine) => (mine.income_rate, -1),
                Structure::Tower(tower) => (tower.health, tower.attack_radius as i32),
                Structure::Barracks(barracks) => (
                    barracks.ticks_remaining() as i32,
                    barracks.creep_type.wire_index() as i32,
                ),
            };
            (structure.wire_code(), owner, param1, param2)
        }
    };

    format!(
        "{} {} {} {} {} {} {}",
        obstacle.id, obstacle.minerals, obstacle.max_mineral_rate, code, owner, param1, param2
    )
}

fn creep_line(creep: &Creep) -> String {
    let (x, y) = creep.location.to_ints();
    format!("{} {} {} {}", x, y, creep.health, creep.creep_type.wire_index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::core::rng::DeterministicRng;
    use crate::core::vec2::Vec2;
    use crate::game::entity::CreepType;
    use crate::game::map::MapLayout;
    use crate::game::structure::{Barracks, Mine, Tower};

    fn state() -> MatchState {
        let layout = MapLayout {
            obstacles: vec![
                Obstacle::new(0, Vec2::new(600.7, 500.2), 60.0, 2, 220),
                Obstacle::new(1, Vec2::new(1319.3, 499.8), 60.0, 2, 220),
                Obstacle::new(2, Vec2::new(960.0, 200.0), 75.0, 3, 300),
            ],
            queen_locations: [Vec2::new(200.5, 200.9), Vec2::new(1719.5, 799.1)],
        };
        MatchState::from_layout(&MatchConfig::default(), layout, DeterministicRng::new(3))
    }

    #[test]
    fn test_init_lines() {
        let lines = init_lines(&state());
        assert_eq!(lines, vec!["3", "0 600 500 60", "1 1319 499 60", "2 960 200 75"]);
    }

    #[test]
    fn test_turn_lines_from_each_side() {
        let mut state = state();
        let area = state.obstacles[1].area();
        state.set_structure(0, Structure::Mine(Mine::new(PlayerIndex::FIRST)));
        state.set_structure(1, Structure::Tower(Tower::new(PlayerIndex::SECOND, 200, area)));
        let mut barracks = Barracks::new(PlayerIndex::FIRST, CreepType::Ranged);
        barracks.start_training();
        state.set_structure(2, Structure::Barracks(barracks));
        state.spawn_creeps(PlayerIndex::SECOND, 1, CreepType::Giant);

        let first = turn_lines(&state, PlayerIndex::FIRST);
        assert_eq!(first[0], "200 200 100 100");
        assert_eq!(first[1], "1719 799 100");
        assert_eq!(first[2], "0 220 2 0 0 1 -1");
        assert!(first[3].starts_with("1 220 2 1 1 200 "));
        assert_eq!(first[4], "2 300 3 2 0 8 1");
        assert_eq!(first[5], "0");
        assert_eq!(first[6], "1");
        assert!(first[7].ends_with(" 200 2"));
        assert_eq!(first.len(), 8);

        let second = turn_lines(&state, PlayerIndex::SECOND);
        assert_eq!(second[0], "1719 799 100 100");
        assert_eq!(second[2], "0 220 2 0 1 1 -1");
        assert_eq!(second[5], "1");
        assert_eq!(second[7], "0");
    }

    #[test]
    fn test_empty_obstacle_line() {
        let lines = turn_lines(&state(), PlayerIndex::FIRST);
        assert_eq!(lines[2], "0 220 2 -1 -1 -1 -1");
    }
}
