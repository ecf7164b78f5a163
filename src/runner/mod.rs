//! Match Runner
//!
//! Drives a whole match: init block, then broadcast, gather, [`tick`] until
//! the match ends. This layer is **non-deterministic** (process scheduling,
//! deadlines); everything it decides reaches the simulation only as a
//! [`PlayerResponse`], so a recorded match replays exactly.

pub mod process;
pub mod scripted;

use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::{MatchConfig, RunnerConfig};
use crate::core::hash::StateHash;
use crate::error::SimError;
use crate::game::entity::PlayerIndex;
use crate::game::protocol::init_lines;
use crate::game::state::MatchState;
use crate::game::tick::{broadcast, tick, PlayerResponse};

pub use process::BotProcess;
pub use scripted::ScriptedBot;

/// Runner errors.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The bot command could not be started.
    #[error("failed to start bot `{command}`: {source}")]
    Spawn {
        /// Command line
        command: String,
        /// Underlying failure
        source: std::io::Error,
    },

    /// A child pipe was not set up.
    #[error("bot has no {0} pipe")]
    MissingPipe(&'static str),

    /// Writing after an earlier write failed.
    #[error("bot input is closed")]
    Closed,

    /// Pipe I/O failed.
    #[error("bot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The match could not be set up.
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),
}

/// One side of a match.
pub enum Contestant {
    /// External program
    Process(BotProcess),
    /// In-process build order
    Scripted(ScriptedBot),
}

impl Contestant {
    /// Start an external bot.
    pub fn process(command: &str) -> Result<Self, RunnerError> {
        BotProcess::spawn(command).map(Contestant::Process)
    }

    /// In-process scripted bot.
    pub fn scripted() -> Self {
        Contestant::Scripted(ScriptedBot::new())
    }

    async fn init(&mut self, lines: &[String]) {
        match self {
            Contestant::Process(bot) => {
                // A bot that cannot take the init block fails its first turn
                if let Err(err) = bot.send(lines).await {
                    debug!(command = bot.command(), %err, "init block not delivered");
                }
            }
            Contestant::Scripted(bot) => bot.init(lines),
        }
    }

    async fn respond(&mut self, lines: &[String], deadline: Duration) -> PlayerResponse {
        match self {
            Contestant::Process(bot) => bot.respond(lines, deadline).await,
            Contestant::Scripted(bot) => bot.respond(lines),
        }
    }

    async fn shutdown(self) {
        if let Contestant::Process(bot) = self {
            bot.shutdown().await;
        }
    }
}

/// How a match went.
#[derive(Clone, Debug)]
pub struct MatchOutcome {
    /// Winner; `None` is a draw
    pub winner: Option<PlayerIndex>,
    /// Turns played
    pub turns: u32,
    /// Hash of the final state
    pub final_hash: StateHash,
    /// Warnings and deactivations
    pub summary: Vec<String>,
    /// Every turn's responses, for replay
    pub responses: Vec<[PlayerResponse; 2]>,
    /// State before the first turn, for replay
    pub initial_state: MatchState,
}

/// Play a full match between two contestants.
pub async fn run_match(
    config: &MatchConfig,
    runner: &RunnerConfig,
    contestants: [Contestant; 2],
) -> anyhow::Result<MatchOutcome> {
    let mut state = MatchState::new(config).context("setting up match")?;
    let initial_state = state.clone();
    let mut contestants = contestants;
    let mut responses = Vec::new();

    info!(seed = config.seed, obstacles = state.obstacles.len(), "match starting");

    let init = init_lines(&state);
    for contestant in &mut contestants {
        contestant.init(&init).await;
    }

    while !state.is_ended() {
        let views = broadcast(&state);
        let deadline = runner.timeout_for_turn(state.turn + 1);
        let active = PlayerIndex::BOTH.map(|seat| state.player(seat).active);

        let [first, second] = &mut contestants;
        let (a, b) = tokio::join!(
            gather(first, active[0], &views[0], deadline),
            gather(second, active[1], &views[1], deadline),
        );
        let turn = [a, b];

        let result = tick(&mut state, &turn);
        for event in &result.events {
            debug!(turn = event.turn, data = ?event.data, "event");
        }
        responses.push(turn);
    }

    for contestant in contestants {
        contestant.shutdown().await;
    }

    Ok(MatchOutcome {
        winner: state.winner,
        turns: state.turn,
        final_hash: state.compute_hash(),
        summary: state.summary.clone(),
        responses,
        initial_state,
    })
}

/// Ask one contestant for its turn. Deactivated players are not contacted.
async fn gather(
    contestant: &mut Contestant,
    active: bool,
    lines: &[String],
    deadline: Duration,
) -> PlayerResponse {
    if !active {
        return PlayerResponse::Timeout;
    }
    contestant.respond(lines, deadline).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tick::replay_match;

    fn short_match(max_turns: u32) -> MatchConfig {
        MatchConfig { max_turns, ..MatchConfig::with_seed(77) }
    }

    fn patient() -> RunnerConfig {
        RunnerConfig { first_turn_timeout_ms: 2000, turn_timeout_ms: 500 }
    }

    #[tokio::test]
    async fn test_two_idle_bots_draw_at_turn_limit() {
        let idle = "while true; do echo 0; echo WAIT; done";
        let contestants = [Contestant::process(idle).unwrap(), Contestant::process(idle).unwrap()];

        let outcome = run_match(&short_match(5), &patient(), contestants).await.unwrap();
        assert_eq!(outcome.turns, 5);
        assert_eq!(outcome.winner, None);
        assert!(outcome.summary.is_empty());
    }

    #[tokio::test]
    async fn test_silent_bot_loses_on_timeout() {
        let contestants = [
            Contestant::process("while true; do echo 0; echo WAIT; done").unwrap(),
            Contestant::process("sleep 5").unwrap(),
        ];
        let runner = RunnerConfig { first_turn_timeout_ms: 300, turn_timeout_ms: 100 };

        let outcome = run_match(&short_match(50), &runner, contestants).await.unwrap();
        assert_eq!(outcome.turns, 1);
        assert_eq!(outcome.winner, Some(PlayerIndex::FIRST));
        assert_eq!(outcome.summary, vec!["player 1 deactivated: timeout".to_string()]);
    }

    #[tokio::test]
    async fn test_garbage_command_deactivates() {
        let contestants = [
            Contestant::process("while true; do echo 0; echo JUMP; done").unwrap(),
            Contestant::scripted(),
        ];

        let outcome = run_match(&short_match(50), &patient(), contestants).await.unwrap();
        assert_eq!(outcome.winner, Some(PlayerIndex::SECOND));
        assert_eq!(
            outcome.summary,
            vec!["player 0 deactivated: Didn't understand command: JUMP".to_string()]
        );
    }

    #[tokio::test]
    async fn test_scripted_match_replays_to_same_hash() {
        let contestants = [Contestant::scripted(), Contestant::scripted()];
        let outcome = run_match(&short_match(120), &patient(), contestants).await.unwrap();

        let (replayed, _) = replay_match(outcome.initial_state.clone(), &outcome.responses);
        assert_eq!(replayed.compute_hash(), outcome.final_hash);
        assert_eq!(replayed.turn, outcome.turns);
    }
}
