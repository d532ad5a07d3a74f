//! Process-wide filesystem locations.

use std::path::{Path, PathBuf};

/// Default location of the access-point daemon binary.
pub const DEFAULT_HOSTAPD_BIN: &str = "/usr/sbin/hostapd";

/// Locations the engine writes generated artifacts to and the daemon binary
/// it launches.
///
/// Lives for the lifetime of the daemon process and is shared (via `Arc`)
/// with every config object of a pass; objects use it, they do not own it.
#[derive(Debug, Clone)]
pub struct RunPaths {
  /// Directory for generated daemon config and pid files.
  pub write_dir: PathBuf,
  /// Binary used to run access points.
  pub hostapd_bin: PathBuf,
}

impl RunPaths {
  pub fn new(write_dir: impl Into<PathBuf>) -> Self {
    Self {
      write_dir: write_dir.into(),
      hostapd_bin: PathBuf::from(DEFAULT_HOSTAPD_BIN),
    }
  }

  pub fn with_hostapd_bin(mut self, hostapd_bin: impl Into<PathBuf>) -> Self {
    self.hostapd_bin = hostapd_bin.into();
    self
  }

  /// Path of the generated hostapd config for the named wireless section.
  pub fn hostapd_conf(&self, section_name: &str) -> PathBuf {
    self.write_dir.join(format!("hostapd-{section_name}.conf"))
  }

  /// Path of the pid file the daemon writes for the named wireless section.
  pub fn hostapd_pid(&self, section_name: &str) -> PathBuf {
    self.write_dir.join(format!("hostapd-{section_name}.pid"))
  }
}

impl AsRef<Path> for RunPaths {
  fn as_ref(&self) -> &Path {
    &self.write_dir
  }
}
