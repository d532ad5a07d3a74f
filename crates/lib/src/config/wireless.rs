//! Wireless section handlers: radios and access points.
//!
//! `wifi-device` describes a physical radio. It contributes no commands of
//! its own; it exists as a lookup target carrying the radio's identity and
//! channel.
//!
//! `wifi-iface` compiles one access point. Command generation decides
//! whether the access point can bind the radio directly or needs a virtual
//! interface, renders the hostapd configuration, and schedules the daemon
//! start. The rendered file is scheduled as a write command between
//! interface creation and daemon start, so hostapd never starts against a
//! missing or partial file.

use std::fs;
use std::sync::Arc;

use tracing::warn;

use crate::command::{Command, priority};
use crate::config::{ConfigObject, lookup_interface, lookup_wifi_device};
use crate::error::ConfigError;
use crate::paths::RunPaths;
use crate::schema::{self, OptionKind, OptionSpec};
use crate::section::{ConfigSection, SectionId, SectionSource};

const WIFI_DEVICE_OPTIONS: &[OptionSpec] = &[
  OptionSpec::required("type", OptionKind::String),
  OptionSpec::required("channel", OptionKind::Integer),
  OptionSpec::optional("ifname", OptionKind::String, None),
];

/// A physical radio. Passive: resolved by access points, never acts itself.
#[derive(Debug)]
pub struct WifiDevice {
  pub id: SectionId,
  pub source: SectionSource,
  pub device_type: String,
  pub channel: i64,
  ifname: Option<String>,
}

impl WifiDevice {
  pub fn from_section(section: &ConfigSection) -> Result<Self, ConfigError> {
    let opts = schema::validate(section, WIFI_DEVICE_OPTIONS)?;
    Ok(Self {
      id: section.id(),
      source: section.source.clone(),
      device_type: opts.string("type")?.to_string(),
      channel: opts.integer("channel")?,
      ifname: opts.opt_string("ifname").map(str::to_string),
    })
  }

  /// OS device name of the radio. Falls back to the section name when no
  /// `ifname` option is declared.
  pub fn device_name(&self) -> &str {
    self.ifname.as_deref().unwrap_or(&self.id.name)
  }

  pub(crate) fn commands(&self) -> Result<Vec<Command>, ConfigError> {
    Ok(Vec::new())
  }

  pub(crate) fn undo_commands(&self) -> Vec<Command> {
    Vec::new()
  }
}

const WIFI_IFACE_OPTIONS: &[OptionSpec] = &[
  OptionSpec::required("device", OptionKind::String),
  OptionSpec::required("mode", OptionKind::String),
  OptionSpec::required("ssid", OptionKind::String),
  OptionSpec::required("network", OptionKind::String),
  OptionSpec::optional("encryption", OptionKind::String, None),
  OptionSpec::optional("key", OptionKind::String, None),
];

/// One access point bound to a radio and a network.
#[derive(Debug)]
pub struct WifiIface {
  pub id: SectionId,
  pub source: SectionSource,
  pub device: String,
  pub mode: String,
  pub ssid: String,
  pub network: String,
  pub encryption: Option<String>,
  pub key: Option<String>,
  paths: Arc<RunPaths>,
}

/// How an access point attaches to its radio, resolved per pass.
struct ApBinding<'a> {
  /// Interface hostapd binds: the virtual interface name when one is
  /// created, the radio's own device name otherwise.
  ifname: &'a str,
  /// Set when a virtual interface has to be created (and later deleted).
  vif: Option<&'a str>,
  device_name: &'a str,
  channel: i64,
}

impl WifiIface {
  pub fn from_section(section: &ConfigSection, paths: Arc<RunPaths>) -> Result<Self, ConfigError> {
    let opts = schema::validate(section, WIFI_IFACE_OPTIONS)?;
    Ok(Self {
      id: section.id(),
      source: section.source.clone(),
      device: opts.string("device")?.to_string(),
      mode: opts.string("mode")?.to_string(),
      ssid: opts.string("ssid")?.to_string(),
      network: opts.string("network")?.to_string(),
      encryption: opts.opt_string("encryption").map(str::to_string),
      key: opts.opt_string("key").map(str::to_string),
      paths,
    })
  }

  /// Resolve the owning radio and network, and decide whether the access
  /// point needs a virtual interface.
  ///
  /// When the network's configured interface name equals the radio's device
  /// name, the access point binds the physical device directly. Anything
  /// else is a virtual interface multiplexed over the radio.
  fn resolve_binding<'a>(&'a self, all: &'a [ConfigObject]) -> Result<ApBinding<'a>, ConfigError> {
    let device = lookup_wifi_device(all, &self.device, &self.id)?;
    let interface = lookup_interface(all, &self.network, &self.id)?;

    let device_name = device.device_name();
    if interface.ifname == device_name {
      Ok(ApBinding {
        ifname: device_name,
        vif: None,
        device_name,
        channel: device.channel,
      })
    } else {
      Ok(ApBinding {
        ifname: &interface.ifname,
        vif: Some(&interface.ifname),
        device_name,
        channel: device.channel,
      })
    }
  }

  pub(crate) fn commands(&self, all: &[ConfigObject]) -> Result<Vec<Command>, ConfigError> {
    match self.mode.as_str() {
      "ap" => {}
      // "sta" is declared in the schema but not implemented; it fails here
      // like any other unknown mode, before any command is emitted.
      mode => {
        return Err(ConfigError::UnsupportedMode {
          section: self.id.clone(),
          mode: mode.to_string(),
        });
      }
    }

    let binding = self.resolve_binding(all)?;
    let mut commands = Vec::new();

    if let Some(vif) = binding.vif {
      commands.push(Command::run(
        priority::CREATE_IFACE,
        ["iw", "dev", binding.device_name, "interface", "add", vif, "type", "ap"],
        self.id.clone(),
      ));
    }

    let contents = self.render_hostapd_conf(&binding)?;
    let conf_path = self.paths.hostapd_conf(&self.id.name);
    commands.push(Command::write(
      priority::CONFIG_IFACE,
      conf_path.clone(),
      contents,
      self.id.clone(),
    ));

    let pid_path = self.paths.hostapd_pid(&self.id.name);
    commands.push(Command::run(
      priority::START_DAEMON,
      [
        self.paths.hostapd_bin.to_string_lossy().as_ref(),
        "-P",
        pid_path.to_string_lossy().as_ref(),
        "-B",
        conf_path.to_string_lossy().as_ref(),
      ],
      self.id.clone(),
    ));

    Ok(commands)
  }

  pub(crate) fn undo_commands(&self, all: &[ConfigObject]) -> Vec<Command> {
    let mut commands = Vec::new();

    // The pid file is the only handle to the daemon we started earlier. An
    // unreadable pid file usually means the daemon never ran; teardown
    // keeps going either way.
    let pid_path = self.paths.hostapd_pid(&self.id.name);
    match fs::read_to_string(&pid_path) {
      Ok(pid) => {
        commands.push(Command::run(
          priority::START_DAEMON,
          ["kill", pid.trim()],
          self.id.clone(),
        ));
      }
      Err(err) => {
        warn!(pid_file = %pid_path.display(), error = %err, "pid file not readable, skipping daemon stop");
      }
    }

    match self.resolve_binding(all) {
      Ok(binding) => {
        if let Some(vif) = binding.vif {
          commands.push(Command::run(
            priority::DELETE_IFACE,
            ["iw", "dev", vif, "del"],
            self.id.clone(),
          ));
        }
      }
      Err(err) => {
        warn!(section = %self.id, error = %err, "cannot resolve radio binding, skipping interface cleanup");
      }
    }

    commands
  }

  /// Render the hostapd configuration for this access point.
  ///
  /// Pure: the caller schedules the write as a command, so a rejected
  /// encryption scheme never leaves a partial file behind.
  fn render_hostapd_conf(&self, binding: &ApBinding<'_>) -> Result<String, ConfigError> {
    let rule = "#".repeat(80);
    let mut conf = format!(
      "{rule}\n# hostapd configuration generated by gwconfd\n# Source: {}\n# Section: {}\n{rule}\n",
      self.source, self.id
    );

    conf.push_str(&format!("interface={}\n", binding.ifname));
    conf.push_str(&format!("ssid={}\n", self.ssid));
    conf.push_str(&format!("channel={}\n", binding.channel));

    match self.encryption.as_deref() {
      None | Some("none") => {}
      Some("psk2") => {
        conf.push_str("wpa=1\n");
        let key = self.key.as_deref().ok_or_else(|| ConfigError::MissingOption {
          section: self.id.clone(),
          option: "key".to_string(),
        })?;
        // A 64 character hex string is the raw PSK; anything else is a
        // human passphrase.
        if key.len() == 64 && is_hex_string(key) {
          conf.push_str(&format!("wpa_psk={key}\n"));
        } else {
          conf.push_str(&format!("wpa_passphrase={key}\n"));
        }
      }
      Some(other) => {
        return Err(ConfigError::UnsupportedEncryption {
          section: self.id.clone(),
          encryption: other.to_string(),
        });
      }
    }

    Ok(conf)
  }
}

/// True when every character is a hex digit.
fn is_hex_string(value: &str) -> bool {
  !value.is_empty() && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::command::CommandAction;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn section(typename: &str, name: &str, options: &[(&str, &str)]) -> ConfigSection {
    ConfigSection {
      typename: typename.to_string(),
      name: name.to_string(),
      source: SectionSource {
        file: "/etc/config/wireless".to_string(),
        line: None,
      },
      options: options
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    }
  }

  fn pass(paths: &Arc<RunPaths>, iface_options: &[(&str, &str)], lan_ifname: &str) -> Vec<ConfigObject> {
    [
      section(
        "wifi-device",
        "wifi0",
        &[("type", "auto"), ("channel", "6"), ("ifname", "wlan0")],
      ),
      section("interface", "lan", &[("ifname", lan_ifname)]),
      section("wifi-iface", "ap0", iface_options),
    ]
    .iter()
    .map(|s| ConfigObject::from_section(s, paths).unwrap().unwrap())
    .collect()
  }

  fn ap_options<'a>(extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut options = vec![
      ("device", "wifi0"),
      ("mode", "ap"),
      ("ssid", "TestNet"),
      ("network", "lan"),
    ];
    options.extend_from_slice(extra);
    options
  }

  fn iface_commands(all: &[ConfigObject]) -> Result<Vec<Command>, ConfigError> {
    for object in all {
      if let ConfigObject::WifiIface(iface) = object {
        return iface.commands(all);
      }
    }
    panic!("no wifi-iface in pass");
  }

  fn conf_contents(commands: &[Command]) -> &str {
    commands
      .iter()
      .find_map(|c| match &c.action {
        CommandAction::Write { contents, .. } => Some(contents.as_str()),
        _ => None,
      })
      .expect("no config write command")
  }

  #[test]
  fn virtual_interface_created_when_names_differ() {
    let paths = Arc::new(RunPaths::new("/run/test"));
    let all = pass(&paths, &ap_options(&[]), "wlan0.1");
    let commands = iface_commands(&all).unwrap();

    assert_eq!(commands.len(), 3);
    assert_eq!(commands[0].priority, priority::CREATE_IFACE);
    assert_eq!(
      commands[0].action,
      CommandAction::Run {
        argv: ["iw", "dev", "wlan0", "interface", "add", "wlan0.1", "type", "ap"]
          .iter()
          .map(ToString::to_string)
          .collect(),
      }
    );
    assert!(conf_contents(&commands).contains("interface=wlan0.1\n"));
  }

  #[test]
  fn direct_binding_when_names_match() {
    let paths = Arc::new(RunPaths::new("/run/test"));
    let all = pass(&paths, &ap_options(&[]), "wlan0");
    let commands = iface_commands(&all).unwrap();

    // No interface creation, just the config write and the daemon start.
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].priority, priority::CONFIG_IFACE);
    assert_eq!(commands[1].priority, priority::START_DAEMON);
    assert!(conf_contents(&commands).contains("interface=wlan0\n"));
  }

  #[test]
  fn daemon_start_references_conf_and_pid_files() {
    let paths = Arc::new(RunPaths::new("/run/test"));
    let all = pass(&paths, &ap_options(&[]), "wlan0.1");
    let commands = iface_commands(&all).unwrap();

    let CommandAction::Run { argv } = &commands[2].action else {
      panic!("daemon start is not a subprocess command");
    };
    assert_eq!(argv[0], crate::paths::DEFAULT_HOSTAPD_BIN);
    assert_eq!(argv[1], "-P");
    assert!(argv[2].ends_with("hostapd-ap0.pid"));
    assert_eq!(argv[3], "-B");
    assert!(argv[4].ends_with("hostapd-ap0.conf"));
  }

  #[test]
  fn open_network_has_no_wpa_lines() {
    let paths = Arc::new(RunPaths::new("/run/test"));

    for extra in [&[][..], &[("encryption", "none")][..]] {
      let all = pass(&paths, &ap_options(extra), "wlan0.1");
      let commands = iface_commands(&all).unwrap();
      let conf = conf_contents(&commands);
      assert!(!conf.contains("wpa=1"));
      assert!(!conf.contains("wpa_psk"));
      assert!(!conf.contains("wpa_passphrase"));
    }
  }

  #[test]
  fn psk2_passphrase_key() {
    let paths = Arc::new(RunPaths::new("/run/test"));
    let all = pass(
      &paths,
      &ap_options(&[("encryption", "psk2"), ("key", "password123")]),
      "wlan0.1",
    );
    let commands = iface_commands(&all).unwrap();
    let conf = conf_contents(&commands);
    assert!(conf.contains("wpa=1\n"));
    assert!(conf.contains("wpa_passphrase=password123\n"));
    assert!(!conf.contains("wpa_psk="));
  }

  #[test]
  fn psk2_raw_psk_key() {
    let key = "a".repeat(32) + "0123456789abcdef0123456789ABCDEF";
    assert_eq!(key.len(), 64);

    let paths = Arc::new(RunPaths::new("/run/test"));
    let all = pass(
      &paths,
      &ap_options(&[("encryption", "psk2"), ("key", key.as_str())]),
      "wlan0.1",
    );
    let commands = iface_commands(&all).unwrap();
    let conf = conf_contents(&commands);
    assert!(conf.contains(&format!("wpa_psk={key}\n")));
    assert!(!conf.contains("wpa_passphrase="));
  }

  #[test]
  fn sixty_four_char_non_hex_key_is_a_passphrase() {
    let key = "z".repeat(64);
    let paths = Arc::new(RunPaths::new("/run/test"));
    let all = pass(
      &paths,
      &ap_options(&[("encryption", "psk2"), ("key", key.as_str())]),
      "wlan0.1",
    );
    let commands = iface_commands(&all).unwrap();
    assert!(conf_contents(&commands).contains(&format!("wpa_passphrase={key}\n")));
  }

  #[test]
  fn unsupported_encryption_fails_without_commands() {
    let paths = Arc::new(RunPaths::new("/run/test"));
    let all = pass(&paths, &ap_options(&[("encryption", "wep")]), "wlan0.1");
    let result = iface_commands(&all);
    assert!(matches!(
      result,
      Err(ConfigError::UnsupportedEncryption { encryption, .. }) if encryption == "wep"
    ));
  }

  #[test]
  fn sta_mode_fails_without_commands() {
    let paths = Arc::new(RunPaths::new("/run/test"));
    let mut options = ap_options(&[]);
    for option in &mut options {
      if option.0 == "mode" {
        option.1 = "sta";
      }
    }
    let all = pass(&paths, &options, "wlan0.1");
    let result = iface_commands(&all);
    assert!(matches!(
      result,
      Err(ConfigError::UnsupportedMode { mode, .. }) if mode == "sta"
    ));
  }

  #[test]
  fn conf_header_carries_provenance() {
    let paths = Arc::new(RunPaths::new("/run/test"));
    let all = pass(&paths, &ap_options(&[]), "wlan0.1");
    let commands = iface_commands(&all).unwrap();
    let conf = conf_contents(&commands);

    assert!(conf.starts_with(&"#".repeat(80)));
    assert!(conf.contains("# Source: /etc/config/wireless\n"));
    assert!(conf.contains("# Section: config wifi-iface ap0\n"));
    assert!(conf.contains("ssid=TestNet\n"));
    assert!(conf.contains("channel=6\n"));
  }

  #[test]
  fn undo_kills_recorded_pid_and_deletes_vif() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("hostapd-ap0.pid"), "12345\n").unwrap();

    let paths = Arc::new(RunPaths::new(dir.path()));
    let all = pass(&paths, &ap_options(&[]), "wlan0.1");
    let commands = all
      .iter()
      .find_map(|o| match o {
        ConfigObject::WifiIface(iface) => Some(iface.undo_commands(&all)),
        _ => None,
      })
      .unwrap();

    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].priority, priority::START_DAEMON);
    assert_eq!(
      commands[0].action,
      CommandAction::Run {
        argv: vec!["kill".to_string(), "12345".to_string()],
      }
    );
    assert_eq!(commands[1].priority, priority::DELETE_IFACE);
    assert_eq!(
      commands[1].action,
      CommandAction::Run {
        argv: vec!["iw".to_string(), "dev".to_string(), "wlan0.1".to_string(), "del".to_string()],
      }
    );
  }

  #[traced_test]
  #[test]
  fn undo_without_pid_file_warns_and_still_deletes_vif() {
    let dir = TempDir::new().unwrap();
    let paths = Arc::new(RunPaths::new(dir.path()));
    let all = pass(&paths, &ap_options(&[]), "wlan0.1");
    let commands = all
      .iter()
      .find_map(|o| match o {
        ConfigObject::WifiIface(iface) => Some(iface.undo_commands(&all)),
        _ => None,
      })
      .unwrap();

    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].priority, priority::DELETE_IFACE);
    assert!(logs_contain("pid file not readable"));
  }

  #[test]
  fn undo_on_direct_binding_leaves_no_interface_commands() {
    let dir = TempDir::new().unwrap();
    let paths = Arc::new(RunPaths::new(dir.path()));
    let all = pass(&paths, &ap_options(&[]), "wlan0");
    let commands = all
      .iter()
      .find_map(|o| match o {
        ConfigObject::WifiIface(iface) => Some(iface.undo_commands(&all)),
        _ => None,
      })
      .unwrap();

    assert!(commands.iter().all(|c| c.priority != priority::DELETE_IFACE));
  }

  #[test]
  fn is_hex_string_cases() {
    assert!(is_hex_string("0123456789abcdefABCDEF"));
    assert!(!is_hex_string("wxyz"));
    assert!(!is_hex_string(""));
  }
}
