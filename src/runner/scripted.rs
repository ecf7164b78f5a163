//! Scripted Demo Strategy
//!
//! An in-process player that reads the same lines an external bot gets and
//! answers with a fixed build order: one melee barracks, three mines, then
//! towers. Good enough to drive a full demo match and exercise the protocol.

use crate::core::vec2::Vec2;
use crate::game::entity::CreepType;
use crate::game::tick::PlayerResponse;

const WANTED_MINES: usize = 3;

/// Static description of an obstacle from the init block.
#[derive(Clone, Copy, Debug)]
struct Site {
    id: u32,
    location: Vec2,
}

/// Dynamic obstacle state from a turn block.
#[derive(Clone, Copy, Debug)]
struct SiteState {
    id: u32,
    minerals: i32,
    structure: i32,
    owner: i32,
    param1: i32,
    param2: i32,
}

impl SiteState {
    fn is_free(&self) -> bool {
        self.structure == -1
    }

    fn is_mine(&self, structure: i32) -> bool {
        self.owner == 0 && self.structure == structure
    }
}

/// Next thing the build order asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Goal {
    Barracks,
    Mine,
    Tower,
}

impl Goal {
    fn token(self) -> &'static str {
        match self {
            Goal::Barracks => "BARRACKS-MELEE",
            Goal::Mine => "MINE",
            Goal::Tower => "TOWER",
        }
    }

    fn accepts(self, site: &SiteState) -> bool {
        match self {
            Goal::Barracks => site.is_free(),
            Goal::Mine => site.is_free() && site.minerals > 0,
            // Keep our own towers topped up as well
            Goal::Tower => site.is_free() || (site.is_mine(1) && site.param1 < 400),
        }
    }
}

/// Fixed build-order player.
#[derive(Clone, Debug, Default)]
pub struct ScriptedBot {
    sites: Vec<Site>,
}

impl ScriptedBot {
    /// Bot with no map knowledge yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the init block: count, then `id x y radius` lines.
    pub fn init(&mut self, lines: &[String]) {
        self.sites = lines
            .iter()
            .skip(1)
            .filter_map(|line| {
                let v = ints(line)?;
                let [id, x, y, _radius] = v[..] else { return None };
                Some(Site { id: u32::try_from(id).ok()?, location: Vec2::from_ints(x, y) })
            })
            .collect();
    }

    /// Answer one turn block. Unreadable input gets an idle answer.
    pub fn respond(&mut self, lines: &[String]) -> PlayerResponse {
        self.decide(lines).unwrap_or_else(PlayerResponse::idle)
    }

    fn decide(&self, lines: &[String]) -> Option<PlayerResponse> {
        let own = ints(lines.first()?)?;
        let [x, y, _health, resources] = own[..] else { return None };
        let queen = Vec2::from_ints(x, y);

        let states = lines
            .get(2..2 + self.sites.len())?
            .iter()
            .map(|line| {
                let v = ints(line)?;
                let [id, minerals, _max_rate, structure, owner, param1, param2] = v[..] else {
                    return None;
                };
                Some(SiteState { id: u32::try_from(id).ok()?, minerals, structure, owner, param1, param2 })
            })
            .collect::<Option<Vec<_>>>()?;

        let training = self.training_line(&states, resources);
        let queen_line = self.queen_line(&states, queen);
        Some(PlayerResponse::lines(training, queen_line))
    }

    /// Train from every idle barracks we can afford, in id order.
    fn training_line(&self, states: &[SiteState], mut resources: i32) -> String {
        let mut ids = Vec::new();
        for state in states.iter().filter(|s| s.is_mine(2) && s.param1 == 0) {
            let Some(creep_type) = CreepType::ALL.get(state.param2 as usize) else {
                continue;
            };
            let cost = creep_type.stats().cost;
            if cost <= resources {
                resources -= cost;
                ids.push(state.id.to_string());
            }
        }

        let mut line = ids.len().to_string();
        for id in ids {
            line.push(' ');
            line.push_str(&id);
        }
        line
    }

    fn queen_line(&self, states: &[SiteState], queen: Vec2) -> String {
        let barracks = states.iter().filter(|s| s.is_mine(2)).count();
        let mines = states.iter().filter(|s| s.is_mine(0)).count();
        let goal = if barracks == 0 {
            Goal::Barracks
        } else if mines < WANTED_MINES {
            Goal::Mine
        } else {
            Goal::Tower
        };

        let target = states
            .iter()
            .filter(|s| goal.accepts(s))
            .filter_map(|s| self.site(s.id).map(|site| (s.id, site.location.distance(queen))))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match target {
            Some((id, _)) => format!("BUILD {} {}", id, goal.token()),
            None => "WAIT".to_string(),
        }
    }

    fn site(&self, id: u32) -> Option<&Site> {
        self.sites.iter().find(|site| site.id == id)
    }
}

fn ints(line: &str) -> Option<Vec<i32>> {
    line.split_whitespace().map(|t| t.parse().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::game::entity::PlayerIndex;
    use crate::game::protocol::{init_lines, turn_lines};
    use crate::game::state::MatchState;
    use crate::game::structure::{Barracks, Structure};

    #[test]
    fn test_heads_for_nearest_free_site_first() {
        let state = MatchState::new(&MatchConfig::with_seed(17)).unwrap();
        let mut bot = ScriptedBot::new();
        bot.init(&init_lines(&state));

        let response = bot.respond(&turn_lines(&state, PlayerIndex::FIRST));
        let PlayerResponse::Lines { training, queen } = response else { panic!() };
        assert_eq!(training, "0");
        assert!(queen.starts_with("BUILD "), "{queen}");
        assert!(queen.ends_with(" BARRACKS-MELEE"), "{queen}");
    }

    #[test]
    fn test_trains_when_affordable() {
        let mut state = MatchState::new(&MatchConfig::with_seed(17)).unwrap();
        state.set_structure(3, Structure::Barracks(Barracks::new(PlayerIndex::SECOND, CreepType::Melee)));
        let mut bot = ScriptedBot::new();
        bot.init(&init_lines(&state));

        let PlayerResponse::Lines { training, queen } = bot.respond(&turn_lines(&state, PlayerIndex::SECOND)) else {
            panic!()
        };
        assert_eq!(training, "1 3");
        assert!(queen.ends_with(" MINE"), "{queen}");
    }

    #[test]
    fn test_garbage_gets_idle_answer() {
        let mut bot = ScriptedBot::new();
        assert_eq!(bot.respond(&["what".to_string()]), PlayerResponse::idle());
    }
}
