//! Bot Process Transport
//!
//! A player program runs as a child process under `sh -c`. Each turn the
//! referee writes the player's view to its stdin and reads two lines back.
//! Anything that stops the two lines arriving in time (deadline, EOF, broken
//! pipe) is reported as [`PlayerResponse::Timeout`].

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::game::tick::PlayerResponse;
use crate::runner::RunnerError;

/// A running player program.
pub struct BotProcess {
    command: String,
    child: Child,
    /// `None` once a write has failed
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl BotProcess {
    /// Start `command` through the shell.
    pub fn spawn(command: &str) -> Result<Self, RunnerError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn { command: command.to_string(), source })?;

        let stdin = child.stdin.take().ok_or(RunnerError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(RunnerError::MissingPipe("stdout"))?;
        debug!(command, "bot started");

        Ok(Self {
            command: command.to_string(),
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
        })
    }

    /// Command line the bot was started with.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Write lines to the bot. A failed write closes the pipe for good.
    pub async fn send(&mut self, lines: &[String]) -> Result<(), RunnerError> {
        let stdin = self.stdin.as_mut().ok_or(RunnerError::Closed)?;

        let mut payload = lines.join("\n");
        payload.push('\n');
        if let Err(err) = write_all(stdin, payload.as_bytes()).await {
            self.stdin = None;
            return Err(err.into());
        }
        Ok(())
    }

    /// Send a turn view and wait up to `deadline` for both answer lines.
    pub async fn respond(&mut self, lines: &[String], deadline: Duration) -> PlayerResponse {
        let exchange = async {
            self.send(lines).await?;
            let training = self.stdout.next_line().await?;
            let queen = self.stdout.next_line().await?;
            Ok::<_, RunnerError>(training.zip(queen))
        };

        match timeout(deadline, exchange).await {
            Ok(Ok(Some((training, queen)))) => PlayerResponse::Lines { training, queen },
            Ok(Ok(None)) => {
                warn!(command = %self.command, "bot closed its output");
                PlayerResponse::Timeout
            }
            Ok(Err(err)) => {
                warn!(command = %self.command, %err, "bot pipe failed");
                PlayerResponse::Timeout
            }
            Err(_) => {
                warn!(command = %self.command, ?deadline, "bot missed its deadline");
                PlayerResponse::Timeout
            }
        }
    }

    /// Stop the bot.
    pub async fn shutdown(mut self) {
        self.stdin = None;
        if let Err(err) = self.child.kill().await {
            debug!(command = %self.command, %err, "bot already gone");
        }
    }
}

async fn write_all(stdin: &mut ChildStdin, payload: &[u8]) -> io::Result<()> {
    stdin.write_all(payload).await?;
    stdin.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEADLINE: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_reads_two_lines() {
        let mut bot = BotProcess::spawn("read first; echo 0; echo \"MOVE 10 20\"; sleep 1").unwrap();
        let response = bot.respond(&["hello".to_string()], DEADLINE).await;
        assert_eq!(response, PlayerResponse::lines("0", "MOVE 10 20"));
        bot.shutdown().await;
    }

    #[tokio::test]
    async fn test_silent_bot_times_out() {
        let mut bot = BotProcess::spawn("sleep 5").unwrap();
        let response = bot.respond(&["1".to_string()], Duration::from_millis(100)).await;
        assert_eq!(response, PlayerResponse::Timeout);
        bot.shutdown().await;
    }

    #[tokio::test]
    async fn test_one_line_then_eof_is_timeout() {
        let mut bot = BotProcess::spawn("echo 0").unwrap();
        let response = bot.respond(&["1".to_string()], DEADLINE).await;
        assert_eq!(response, PlayerResponse::Timeout);
        bot.shutdown().await;
    }
}
