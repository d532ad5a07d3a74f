//! Pass orchestration.
//!
//! A reconfiguration pass:
//!
//! 1. Builds one config object per known section (schema validation)
//! 2. Asks every object for its commands
//! 3. Merges them into one priority-ordered sequence
//! 4. Executes the sequence strictly in order
//! 5. On a command failure, rolls the whole pass back best-effort
//!
//! Section-local failures (validation, missing dependencies, unsupported
//! modes) only drop the offending section from the pass; siblings that
//! already contributed commands are unaffected. There is no cross-section
//! transaction.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::command::{Command, merge};
use crate::config::ConfigObject;
use crate::error::ConfigError;
use crate::execute::{self, ExecuteError};
use crate::paths::RunPaths;
use crate::rollback::{RollbackReport, rollback};
use crate::section::{ConfigSection, SectionId};

/// A section that was dropped from the pass, and why.
#[derive(Debug)]
pub struct SectionError {
  pub section: SectionId,
  pub error: ConfigError,
}

/// A compiled command plan. No system state has been touched yet.
#[derive(Debug)]
pub struct CompiledPass {
  /// Config objects of this pass, in declaration order.
  pub objects: Vec<ConfigObject>,
  /// Merged, priority-ordered command sequence.
  pub commands: Vec<Command>,
  /// Sections dropped from the pass.
  pub errors: Vec<SectionError>,
}

/// Errors that abort an apply pass as a whole.
#[derive(Debug, Error)]
pub enum ApplyError {
  /// A command failed; the pass was rolled back best-effort.
  #[error("apply halted: {source}")]
  Execute {
    #[source]
    source: ExecuteError,
    rollback: RollbackReport,
  },
}

/// Result of a successful apply pass.
#[derive(Debug)]
pub struct ApplyReport {
  /// The pass's objects, kept for a later explicit teardown.
  pub objects: Vec<ConfigObject>,
  pub commands_run: usize,
  /// Sections that were dropped before execution.
  pub errors: Vec<SectionError>,
}

/// Compile a declarative snapshot into a command plan.
///
/// Every section that fails validation, dependency resolution, or command
/// generation is reported in [`CompiledPass::errors`] and contributes no
/// commands; the remaining sections proceed.
pub fn compile(sections: &[ConfigSection], paths: &Arc<RunPaths>) -> CompiledPass {
  let mut objects = Vec::new();
  let mut errors = Vec::new();

  for section in sections {
    match ConfigObject::from_section(section, paths) {
      Ok(Some(object)) => objects.push(object),
      Ok(None) => {}
      Err(error) => {
        warn!(section = %section.id(), error = %error, "section rejected");
        errors.push(SectionError {
          section: section.id(),
          error,
        });
      }
    }
  }

  let mut commands = Vec::new();
  for object in &objects {
    match object.commands(&objects) {
      Ok(object_commands) => commands.extend(object_commands),
      Err(error) => {
        warn!(section = %object.id(), error = %error, "section produced no commands");
        errors.push(SectionError {
          section: object.id().clone(),
          error,
        });
      }
    }
  }

  CompiledPass {
    commands: merge(commands),
    objects,
    errors,
  }
}

/// Apply a declarative snapshot to the host.
///
/// On a command failure the remaining commands are abandoned and the whole
/// pass (everything that was part of it, not just the sections that already
/// ran) is rolled back best-effort.
pub async fn apply(sections: &[ConfigSection], paths: &Arc<RunPaths>) -> Result<ApplyReport, ApplyError> {
  let pass = compile(sections, paths);
  info!(
    objects = pass.objects.len(),
    commands = pass.commands.len(),
    rejected = pass.errors.len(),
    "pass compiled"
  );

  match execute::run(&pass.commands).await {
    Ok(commands_run) => {
      info!(commands_run, "apply complete");
      Ok(ApplyReport {
        objects: pass.objects,
        commands_run,
        errors: pass.errors,
      })
    }
    Err(source) => {
      error!(owner = %source.owner(), error = %source, "command failed, rolling back pass");
      let report = rollback(&pass.objects).await;
      Err(ApplyError::Execute {
        source,
        rollback: report,
      })
    }
  }
}

/// Tear down everything a previously applied snapshot set up.
///
/// Rebuilds the pass's objects from the same declarative snapshot and runs
/// the undo pass over them.
pub async fn teardown(sections: &[ConfigSection], paths: &Arc<RunPaths>) -> RollbackReport {
  let pass = compile(sections, paths);
  info!(objects = pass.objects.len(), "tearing down");
  rollback(&pass.objects).await
}
