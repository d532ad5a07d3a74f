use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gwconf_lib::paths::{DEFAULT_HOSTAPD_BIN, RunPaths};
use tracing_subscriber::EnvFilter;

mod cmd;

/// gwconfd - declarative gateway configuration daemon
#[derive(Parser)]
#[command(name = "gwconfd")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Directory for generated daemon config and pid files
  #[arg(long, global = true, default_value = "/var/run/gwconfd")]
  write_dir: PathBuf,

  /// Path of the hostapd binary
  #[arg(long, global = true, default_value = DEFAULT_HOSTAPD_BIN)]
  hostapd: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the command sequence a snapshot would execute
  Plan {
    /// Path to the JSON section snapshot
    sections: PathBuf,
  },

  /// Apply a snapshot to the host, rolling back on failure
  Apply {
    /// Path to the JSON section snapshot
    sections: PathBuf,
  },

  /// Reverse a previously applied snapshot (best-effort)
  Teardown {
    /// Path to the JSON section snapshot
    sections: PathBuf,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();
  let paths = Arc::new(RunPaths::new(cli.write_dir).with_hostapd_bin(cli.hostapd));

  match cli.command {
    Commands::Plan { sections } => cmd::cmd_plan(&sections, &paths),
    Commands::Apply { sections } => cmd::cmd_apply(&sections, &paths).await,
    Commands::Teardown { sections } => cmd::cmd_teardown(&sections, &paths).await,
  }
}
