//! Config objects: the validated, behavior-bearing counterparts of sections.
//!
//! One concrete type exists per `typename`, collected in the [`ConfigObject`]
//! tagged union. Objects are built fresh from the declarative snapshot on
//! every reconfiguration pass, are never mutated afterwards, and are
//! superseded (not edited) by the next pass's objects.
//!
//! Every behavior takes the full set of the pass's objects as an explicit
//! argument; cross-references between independently declared sections are
//! resolved with [`lookup`] at command-generation time.

pub mod firewall;
pub mod network;
pub mod wireless;

use std::sync::Arc;

use tracing::debug;

use crate::command::Command;
use crate::error::ConfigError;
use crate::paths::RunPaths;
use crate::section::{ConfigSection, SectionId};

use self::firewall::FirewallZone;
use self::network::Interface;
use self::wireless::{WifiDevice, WifiIface};

/// One validated config object, dispatched by section `typename`.
#[derive(Debug)]
pub enum ConfigObject {
  WifiDevice(WifiDevice),
  WifiIface(WifiIface),
  Interface(Interface),
  FirewallZone(FirewallZone),
}

impl ConfigObject {
  /// Validate a section and build its typed object.
  ///
  /// Returns `Ok(None)` for typenames outside this engine's scope; the
  /// surrounding daemon handles (or ignores) those elsewhere.
  pub fn from_section(section: &ConfigSection, paths: &Arc<RunPaths>) -> Result<Option<Self>, ConfigError> {
    let object = match section.typename.as_str() {
      "wifi-device" => Self::WifiDevice(WifiDevice::from_section(section)?),
      "wifi-iface" => Self::WifiIface(WifiIface::from_section(section, Arc::clone(paths))?),
      "interface" => Self::Interface(Interface::from_section(section)?),
      "firewall" => Self::FirewallZone(FirewallZone::from_section(section)?),
      other => {
        debug!(typename = other, name = %section.name, "ignoring section with unhandled type");
        return Ok(None);
      }
    };
    Ok(Some(object))
  }

  pub fn id(&self) -> &SectionId {
    match self {
      Self::WifiDevice(device) => &device.id,
      Self::WifiIface(iface) => &iface.id,
      Self::Interface(interface) => &interface.id,
      Self::FirewallZone(zone) => &zone.id,
    }
  }

  /// Ordered commands that bring this object's slice of the system into the
  /// declared state.
  pub fn commands(&self, all: &[ConfigObject]) -> Result<Vec<Command>, ConfigError> {
    match self {
      Self::WifiDevice(device) => device.commands(),
      Self::WifiIface(iface) => iface.commands(all),
      Self::Interface(interface) => interface.commands(),
      Self::FirewallZone(zone) => zone.commands(all),
    }
  }

  /// Ordered commands that reverse this object's effects.
  ///
  /// Safe to call even when [`Self::commands`] never ran or failed partway;
  /// anything that cannot be reversed is logged as a warning and skipped.
  pub fn undo_commands(&self, all: &[ConfigObject]) -> Vec<Command> {
    match self {
      Self::WifiDevice(device) => device.undo_commands(),
      Self::WifiIface(iface) => iface.undo_commands(all),
      Self::Interface(interface) => interface.undo_commands(),
      Self::FirewallZone(zone) => zone.undo_commands(all),
    }
  }
}

/// Resolve a named cross-reference among the pass's objects.
///
/// Scans for an exact `(typename, name)` match. First match wins when
/// duplicate names exist; that is inherited behavior, not a contract to
/// rely on.
pub fn lookup<'a>(
  all: &'a [ConfigObject],
  typename: &str,
  name: &str,
  referrer: &SectionId,
) -> Result<&'a ConfigObject, ConfigError> {
  all
    .iter()
    .find(|object| {
      let id = object.id();
      id.typename == typename && id.name == name
    })
    .ok_or_else(|| ConfigError::DependencyNotFound {
      section: referrer.clone(),
      typename: typename.to_string(),
      name: name.to_string(),
    })
}

/// [`lookup`] narrowed to `wifi-device` sections.
pub(crate) fn lookup_wifi_device<'a>(
  all: &'a [ConfigObject],
  name: &str,
  referrer: &SectionId,
) -> Result<&'a WifiDevice, ConfigError> {
  match lookup(all, "wifi-device", name, referrer)? {
    ConfigObject::WifiDevice(device) => Ok(device),
    _ => Err(ConfigError::DependencyNotFound {
      section: referrer.clone(),
      typename: "wifi-device".to_string(),
      name: name.to_string(),
    }),
  }
}

/// [`lookup`] narrowed to `interface` sections.
pub(crate) fn lookup_interface<'a>(
  all: &'a [ConfigObject],
  name: &str,
  referrer: &SectionId,
) -> Result<&'a Interface, ConfigError> {
  match lookup(all, "interface", name, referrer)? {
    ConfigObject::Interface(interface) => Ok(interface),
    _ => Err(ConfigError::DependencyNotFound {
      section: referrer.clone(),
      typename: "interface".to_string(),
      name: name.to_string(),
    }),
  }
}
