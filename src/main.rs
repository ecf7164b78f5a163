//! Royale Referee
//!
//! Runs one match between two bot programs, or a built-in demo match.
//!
//! ```text
//! royale-referee [--seed N] [--max-turns N] [--config FILE] --demo
//! royale-referee [--seed N] [--max-turns N] [--config FILE] "<bot 0 cmd>" "<bot 1 cmd>"
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides the `info` default); the result
//! goes to stdout.

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use royale::{
    replay_match, run_match, Contestant, MatchConfig, MatchOutcome, RunnerConfig, VERSION,
};

/// Parsed command line.
struct Args {
    config: MatchConfig,
    demo: bool,
    bots: Vec<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config_path = None;
    let mut seed = None;
    let mut max_turns = None;
    let mut demo = false;
    let mut bots = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => demo = true,
            "--config" => config_path = Some(args.next().context("--config needs a path")?),
            "--seed" => {
                let value = args.next().context("--seed needs a value")?;
                seed = Some(value.parse::<u64>().with_context(|| format!("bad seed: {value}"))?);
            }
            "--max-turns" => {
                let value = args.next().context("--max-turns needs a value")?;
                max_turns = Some(value.parse::<u32>().with_context(|| format!("bad turn limit: {value}"))?);
            }
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            _ => bots.push(arg),
        }
    }

    let mut config = match config_path {
        Some(path) => MatchConfig::from_json_file(&path).with_context(|| format!("loading {path}"))?,
        None => MatchConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(max_turns) = max_turns {
        config.max_turns = max_turns;
    }

    if demo && !bots.is_empty() {
        bail!("--demo takes no bot commands");
    }
    if !demo && bots.len() != 2 {
        bail!("expected two bot commands or --demo");
    }
    Ok(Args { config, demo, bots })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let args = parse_args()?;
    info!("Royale Referee v{}", VERSION);
    info!("Seed: {}, turn limit: {}", args.config.seed, args.config.max_turns);

    let contestants = if args.demo {
        [Contestant::scripted(), Contestant::scripted()]
    } else {
        [Contestant::process(&args.bots[0])?, Contestant::process(&args.bots[1])?]
    };

    let outcome = run_match(&args.config, &RunnerConfig::default(), contestants).await?;
    info!("Final State Hash: {}", hex::encode(outcome.final_hash));

    verify_replay(&outcome);
    print_outcome(&outcome);
    Ok(())
}

/// Re-run the recorded responses and compare hashes.
fn verify_replay(outcome: &MatchOutcome) {
    let (replayed, _) = replay_match(outcome.initial_state.clone(), &outcome.responses);
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if replay_hash == outcome.final_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }
}

fn print_outcome(outcome: &MatchOutcome) {
    for line in &outcome.summary {
        println!("{line}");
    }
    match outcome.winner {
        Some(winner) => println!("{winner} wins after {} turns", outcome.turns),
        None => println!("draw after {} turns", outcome.turns),
    }
}
