//! Implementation of the `gwconfd apply` command.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use gwconf_lib::apply::apply;
use gwconf_lib::paths::RunPaths;

use super::load_sections;

pub async fn cmd_apply(sections_file: &Path, paths: &Arc<RunPaths>) -> Result<()> {
  let sections = load_sections(sections_file)?;

  let report = apply(&sections, paths)
    .await
    .context("Apply failed and was rolled back")?;

  for error in &report.errors {
    eprintln!("rejected: {}", error.error);
  }
  println!(
    "applied {} command(s) across {} object(s)",
    report.commands_run,
    report.objects.len()
  );

  Ok(())
}
