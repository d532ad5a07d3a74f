//! Implementation of the `gwconfd plan` command.
//!
//! Compiles a section snapshot into the merged command sequence and prints
//! it without executing anything.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use gwconf_lib::apply::compile;
use gwconf_lib::paths::RunPaths;

use super::load_sections;

pub fn cmd_plan(sections_file: &Path, paths: &Arc<RunPaths>) -> Result<()> {
  let sections = load_sections(sections_file)?;
  let pass = compile(&sections, paths);

  for error in &pass.errors {
    eprintln!("rejected: {}", error.error);
  }

  for command in &pass.commands {
    println!("[{:>2}] {} ({})", command.priority, command.action, command.owner);
  }

  println!(
    "{} command(s) from {} object(s), {} section(s) rejected",
    pass.commands.len(),
    pass.objects.len(),
    pass.errors.len()
  );

  Ok(())
}
