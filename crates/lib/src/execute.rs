//! Sequential command execution.
//!
//! The merged command sequence encodes real OS-level ordering dependencies,
//! so the executor runs one command at a time and waits for it to finish
//! before issuing the next. Strict mode stops at the first failure and
//! reports which section's command broke the pass; best-effort mode (used
//! for undo passes) logs failures and keeps going.

use thiserror::Error;
use tokio::process;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandAction};
use crate::section::SectionId;

/// A command that could not be executed, attributed to the section that
/// emitted it.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// A subprocess ran but exited non-zero.
  #[error("{owner}: command exited with status {code:?}: {argv}")]
  CommandFailed {
    owner: SectionId,
    argv: String,
    code: Option<i32>,
  },

  /// A subprocess could not be started at all.
  #[error("{owner}: failed to spawn '{argv}': {source}")]
  SpawnFailed {
    owner: SectionId,
    argv: String,
    #[source]
    source: std::io::Error,
  },

  /// A generated artifact could not be written.
  #[error("{owner}: failed to write {path}: {source}")]
  WriteFailed {
    owner: SectionId,
    path: String,
    #[source]
    source: std::io::Error,
  },
}

impl ExecuteError {
  /// Section whose command failed.
  pub fn owner(&self) -> &SectionId {
    match self {
      Self::CommandFailed { owner, .. }
      | Self::SpawnFailed { owner, .. }
      | Self::WriteFailed { owner, .. } => owner,
    }
  }
}

/// Run `commands` strictly in order, stopping at the first failure.
///
/// Returns the number of commands that completed. There is no retry; the
/// caller decides whether to roll the pass back.
pub async fn run(commands: &[Command]) -> Result<usize, ExecuteError> {
  for command in commands {
    run_one(command).await?;
  }
  Ok(commands.len())
}

/// Run `commands` in order, downgrading every failure to a warning.
///
/// Used for undo passes, which must make maximal forward progress even when
/// the system is partially broken. Returns the failures for reporting; they
/// never escalate.
pub async fn run_best_effort(commands: &[Command]) -> Vec<ExecuteError> {
  let mut failures = Vec::new();
  for command in commands {
    if let Err(err) = run_one(command).await {
      warn!(owner = %err.owner(), error = %err, "undo command failed, continuing");
      failures.push(err);
    }
  }
  failures
}

async fn run_one(command: &Command) -> Result<(), ExecuteError> {
  info!(priority = command.priority, owner = %command.owner, action = %command.action, "executing");

  match &command.action {
    CommandAction::Write { path, contents } => {
      let write_failed = |source| ExecuteError::WriteFailed {
        owner: command.owner.clone(),
        path: path.display().to_string(),
        source,
      };
      if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
      }
      tokio::fs::write(path, contents).await.map_err(write_failed)
    }
    CommandAction::Run { argv } => {
      let Some((bin, args)) = argv.split_first() else {
        return Err(ExecuteError::SpawnFailed {
          owner: command.owner.clone(),
          argv: String::new(),
          source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
        });
      };

      let output = process::Command::new(bin)
        .args(args)
        .output()
        .await
        .map_err(|source| ExecuteError::SpawnFailed {
          owner: command.owner.clone(),
          argv: argv.join(" "),
          source,
        })?;

      if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
          debug!(stderr = %stderr, "command stderr");
        }
        return Err(ExecuteError::CommandFailed {
          owner: command.owner.clone(),
          argv: argv.join(" "),
          code: output.status.code(),
        });
      }

      Ok(())
    }
  }
}
