//! Implementation of the `gwconfd teardown` command.
//!
//! Reverses a previously applied snapshot: stops daemons, removes rules,
//! deletes virtual interfaces. Always best-effort.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use gwconf_lib::apply::teardown;
use gwconf_lib::paths::RunPaths;

use super::load_sections;

pub async fn cmd_teardown(sections_file: &Path, paths: &Arc<RunPaths>) -> Result<()> {
  let sections = load_sections(sections_file)?;

  let report = teardown(&sections, paths).await;

  for failure in &report.failures {
    eprintln!("warning: {failure}");
  }
  println!(
    "ran {} undo command(s), {} failure(s)",
    report.commands,
    report.failures.len()
  );

  Ok(())
}
