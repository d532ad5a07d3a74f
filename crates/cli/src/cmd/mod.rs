mod apply;
mod plan;
mod teardown;

pub use apply::cmd_apply;
pub use plan::cmd_plan;
pub use teardown::cmd_teardown;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gwconf_lib::section::ConfigSection;

/// Load the JSON section snapshot handed over by the configuration
/// front-end.
fn load_sections(path: &Path) -> Result<Vec<ConfigSection>> {
  let raw = fs::read_to_string(path).with_context(|| format!("Failed to read sections: {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("Failed to parse sections: {}", path.display()))
}
