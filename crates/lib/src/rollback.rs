//! Best-effort reversal of a configuration pass.

use tracing::{info, warn};

use crate::command::{Command, merge};
use crate::config::ConfigObject;
use crate::execute::{ExecuteError, run_best_effort};

/// Outcome of an undo pass.
#[derive(Debug, Default)]
pub struct RollbackReport {
  /// Commands that were attempted.
  pub commands: usize,
  /// Undo commands that failed. Reported, never escalated.
  pub failures: Vec<ExecuteError>,
}

/// Collect undo commands from every object of a pass, ordered for execution.
///
/// Undo commands are tagged on the apply priority scale, so within the
/// merged sequence daemons are stopped before their interfaces are deleted.
pub fn gather_undo(objects: &[ConfigObject]) -> Vec<Command> {
  let mut commands = Vec::new();
  for object in objects {
    commands.extend(object.undo_commands(objects));
  }
  merge(commands)
}

/// Undo everything the given objects did (or would have done).
///
/// Invoked after an apply failure and for explicit teardown. Always makes
/// maximal forward progress: a failing undo command is logged and skipped.
pub async fn rollback(objects: &[ConfigObject]) -> RollbackReport {
  let commands = gather_undo(objects);
  info!(commands = commands.len(), "rolling back");

  let failures = run_best_effort(&commands).await;
  if !failures.is_empty() {
    warn!(failed = failures.len(), "rollback finished with failures");
  }

  RollbackReport {
    commands: commands.len(),
    failures,
  }
}
