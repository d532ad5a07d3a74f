//! Firewall zone sections.
//!
//! A `firewall` section attaches NAT behavior to a network. Only masquerade
//! is compiled here; rule installation runs late (ADD_IPTABLES) so the
//! interfaces it references exist by then.

use tracing::warn;

use crate::command::{Command, priority};
use crate::config::{ConfigObject, lookup_interface};
use crate::error::ConfigError;
use crate::schema::{self, OptionKind, OptionSpec};
use crate::section::{ConfigSection, SectionId, SectionSource};

const FIREWALL_OPTIONS: &[OptionSpec] = &[
  OptionSpec::required("network", OptionKind::String),
  OptionSpec::optional("masq", OptionKind::Bool, Some("0")),
];

#[derive(Debug)]
pub struct FirewallZone {
  pub id: SectionId,
  pub source: SectionSource,
  /// Name of the `interface` section this zone covers.
  pub network: String,
  pub masq: bool,
}

impl FirewallZone {
  pub fn from_section(section: &ConfigSection) -> Result<Self, ConfigError> {
    let opts = schema::validate(section, FIREWALL_OPTIONS)?;
    Ok(Self {
      id: section.id(),
      source: section.source.clone(),
      network: opts.string("network")?.to_string(),
      masq: opts.boolean("masq")?,
    })
  }

  fn masquerade_rule(&self, ifname: &str, flag: &str) -> Command {
    Command::run(
      priority::ADD_IPTABLES,
      ["iptables", "-t", "nat", flag, "POSTROUTING", "-o", ifname, "-j", "MASQUERADE"],
      self.id.clone(),
    )
  }

  pub(crate) fn commands(&self, all: &[ConfigObject]) -> Result<Vec<Command>, ConfigError> {
    if !self.masq {
      return Ok(Vec::new());
    }
    let interface = lookup_interface(all, &self.network, &self.id)?;
    Ok(vec![self.masquerade_rule(&interface.ifname, "-A")])
  }

  pub(crate) fn undo_commands(&self, all: &[ConfigObject]) -> Vec<Command> {
    if !self.masq {
      return Vec::new();
    }
    match lookup_interface(all, &self.network, &self.id) {
      Ok(interface) => vec![self.masquerade_rule(&interface.ifname, "-D")],
      Err(err) => {
        warn!(section = %self.id, error = %err, "cannot resolve network, skipping rule removal");
        Vec::new()
      }
    }
  }
}
