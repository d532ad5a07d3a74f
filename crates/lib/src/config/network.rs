//! Plain network interface sections.
//!
//! An `interface` section names the OS interface it configures and,
//! optionally, a static address. Wireless sections resolve against it: its
//! `ifname` decides whether an access point binds a radio directly or
//! through a virtual interface.

use crate::command::{Command, priority};
use crate::error::ConfigError;
use crate::schema::{self, OptionKind, OptionSpec};
use crate::section::{ConfigSection, SectionId, SectionSource};

const INTERFACE_OPTIONS: &[OptionSpec] = &[
  OptionSpec::required("ifname", OptionKind::String),
  OptionSpec::optional("proto", OptionKind::String, Some("static")),
  OptionSpec::optional("ipaddr", OptionKind::String, None),
  OptionSpec::optional("netmask", OptionKind::String, None),
];

#[derive(Debug)]
pub struct Interface {
  pub id: SectionId,
  pub source: SectionSource,
  /// OS interface name this section configures.
  pub ifname: String,
  pub proto: String,
  pub ipaddr: Option<String>,
  pub netmask: Option<String>,
}

impl Interface {
  pub fn from_section(section: &ConfigSection) -> Result<Self, ConfigError> {
    let opts = schema::validate(section, INTERFACE_OPTIONS)?;
    Ok(Self {
      id: section.id(),
      source: section.source.clone(),
      ifname: opts.string("ifname")?.to_string(),
      proto: opts.string("proto")?.to_string(),
      ipaddr: opts.opt_string("ipaddr").map(str::to_string),
      netmask: opts.opt_string("netmask").map(str::to_string),
    })
  }

  pub(crate) fn commands(&self) -> Result<Vec<Command>, ConfigError> {
    let mut commands = Vec::new();

    if self.proto == "static" {
      if let (Some(ipaddr), Some(netmask)) = (&self.ipaddr, &self.netmask) {
        let prefix = prefix_len(netmask).ok_or_else(|| ConfigError::InvalidOptionType {
          section: self.id.clone(),
          option: "netmask".to_string(),
          expected: "dotted netmask",
          value: netmask.clone(),
        })?;
        commands.push(Command::run(
          priority::CONFIG_IFACE,
          ["ip", "addr", "add", &format!("{ipaddr}/{prefix}"), "dev", &self.ifname],
          self.id.clone(),
        ));
      }
    }

    commands.push(Command::run(
      priority::CONFIG_IFACE,
      ["ip", "link", "set", &self.ifname, "up"],
      self.id.clone(),
    ));

    Ok(commands)
  }

  pub(crate) fn undo_commands(&self) -> Vec<Command> {
    vec![
      Command::run(
        priority::CONFIG_IFACE,
        ["ip", "addr", "flush", "dev", &self.ifname],
        self.id.clone(),
      ),
      Command::run(
        priority::CONFIG_IFACE,
        ["ip", "link", "set", &self.ifname, "down"],
        self.id.clone(),
      ),
    ]
  }
}

/// Prefix length of a dotted-quad netmask, when its bits are contiguous.
fn prefix_len(netmask: &str) -> Option<u8> {
  let addr: std::net::Ipv4Addr = netmask.parse().ok()?;
  let bits = u32::from(addr);
  if bits.leading_ones() + bits.trailing_zeros() == 32 {
    Some(bits.count_ones() as u8)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::command::CommandAction;

  fn section(options: &[(&str, &str)]) -> ConfigSection {
    ConfigSection {
      typename: "interface".to_string(),
      name: "lan".to_string(),
      source: SectionSource::default(),
      options: options
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    }
  }

  fn argvs(commands: &[Command]) -> Vec<String> {
    commands
      .iter()
      .filter_map(|c| match &c.action {
        CommandAction::Run { argv } => Some(argv.join(" ")),
        CommandAction::Write { .. } => None,
      })
      .collect()
  }

  #[test]
  fn static_interface_gets_address_then_link_up() {
    let interface = Interface::from_section(&section(&[
      ("ifname", "eth0"),
      ("ipaddr", "192.168.1.1"),
      ("netmask", "255.255.255.0"),
    ]))
    .unwrap();

    let commands = interface.commands().unwrap();
    assert_eq!(
      argvs(&commands),
      vec!["ip addr add 192.168.1.1/24 dev eth0", "ip link set eth0 up"]
    );
    assert!(commands.iter().all(|c| c.priority == priority::CONFIG_IFACE));
  }

  #[test]
  fn interface_without_address_only_brings_link_up() {
    let interface = Interface::from_section(&section(&[("ifname", "wlan0.1")])).unwrap();
    let commands = interface.commands().unwrap();
    assert_eq!(argvs(&commands), vec!["ip link set wlan0.1 up"]);
  }

  #[test]
  fn bad_netmask_is_invalid_option_type() {
    let interface = Interface::from_section(&section(&[
      ("ifname", "eth0"),
      ("ipaddr", "192.168.1.1"),
      ("netmask", "255.0.255.0"),
    ]))
    .unwrap();

    let result = interface.commands();
    assert!(matches!(
      result,
      Err(ConfigError::InvalidOptionType { option, .. }) if option == "netmask"
    ));
  }

  #[test]
  fn undo_flushes_addresses_and_downs_link() {
    let interface = Interface::from_section(&section(&[("ifname", "eth0")])).unwrap();
    assert_eq!(
      argvs(&interface.undo_commands()),
      vec!["ip addr flush dev eth0", "ip link set eth0 down"]
    );
  }

  #[test]
  fn prefix_len_cases() {
    assert_eq!(prefix_len("255.255.255.0"), Some(24));
    assert_eq!(prefix_len("255.255.255.255"), Some(32));
    assert_eq!(prefix_len("0.0.0.0"), Some(0));
    assert_eq!(prefix_len("255.0.255.0"), None);
    assert_eq!(prefix_len("not-a-mask"), None);
  }
}
