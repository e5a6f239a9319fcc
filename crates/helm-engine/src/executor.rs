//! Command pipeline shared by the REPL and script runner:
//! latency → plan → word-by-word reveal → commit.
//!
//! Cancelling the token at any point before the commit leaves every store
//! exactly as it was. Words already revealed stay revealed.

use crate::engine::Engine;
use crate::intent::Intent;
use helm_common::protocol::CommandOutcome;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Command cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Simulated processing time before anything happens.
    pub latency: Duration,
    /// Pause between revealed words.
    pub reveal_delay: Duration,
}

impl ExecutorOptions {
    pub fn instant() -> Self {
        Self {
            latency: Duration::ZERO,
            reveal_delay: Duration::ZERO,
        }
    }
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(2000),
            reveal_delay: Duration::from_millis(30),
        }
    }
}

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub outcome: CommandOutcome,
    pub intent: Intent,
}

#[derive(Debug, Default)]
pub struct CommandExecutor {
    options: ExecutorOptions,
}

impl CommandExecutor {
    pub fn new(options: ExecutorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    /// Execute a line of input, streaming the response through `reveal`.
    pub async fn execute_line(
        &self,
        engine: &mut Engine,
        line: &str,
        cancel: &CancellationToken,
        mut reveal: impl FnMut(&str),
    ) -> Result<ExecutionResult, ExecutorError> {
        pause(self.options.latency, cancel).await?;

        let resolution = engine.plan(line);
        debug!(intent = %resolution.intent, "Revealing response");

        for (i, word) in resolution.outcome.response.split_whitespace().enumerate() {
            if cancel.is_cancelled() {
                return Err(ExecutorError::Cancelled);
            }
            if i > 0 {
                reveal(" ");
            }
            reveal(word);
            pause(self.options.reveal_delay, cancel).await?;
        }

        if cancel.is_cancelled() {
            return Err(ExecutorError::Cancelled);
        }
        engine.commit(line, &resolution);

        Ok(ExecutionResult {
            intent: resolution.intent,
            outcome: resolution.outcome,
        })
    }
}

async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), ExecutorError> {
    if duration.is_zero() {
        return if cancel.is_cancelled() {
            Err(ExecutorError::Cancelled)
        } else {
            Ok(())
        };
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExecutorError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
