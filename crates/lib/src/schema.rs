//! Option schema validation.
//!
//! Each section type declares an ordered list of [`OptionSpec`] entries.
//! Validation walks that schema against a section's raw option map:
//! required options must be present, optional options fall back to their
//! default (or stay absent), and every present value is coerced to its
//! declared kind. The result is a [`TypedOptions`] set from which the
//! per-variant option structs are populated exactly once.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::section::{ConfigSection, SectionId};

/// Expected type of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
  String,
  Integer,
  Bool,
}

impl OptionKind {
  fn describe(self) -> &'static str {
    match self {
      OptionKind::String => "string",
      OptionKind::Integer => "integer",
      OptionKind::Bool => "boolean",
    }
  }
}

/// Schema entry for a single option.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
  pub name: &'static str,
  pub kind: OptionKind,
  pub required: bool,
  pub default: Option<&'static str>,
}

impl OptionSpec {
  pub const fn required(name: &'static str, kind: OptionKind) -> Self {
    Self {
      name,
      kind,
      required: true,
      default: None,
    }
  }

  pub const fn optional(name: &'static str, kind: OptionKind, default: Option<&'static str>) -> Self {
    Self {
      name,
      kind,
      required: false,
      default,
    }
  }
}

/// A coerced option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
  String(String),
  Integer(i64),
  Bool(bool),
}

/// The validated, typed attribute set of one section.
///
/// Accessors fail with [`ConfigError::MissingOption`] when an option the
/// variant expects was neither declared nor defaulted, so variant
/// constructors never have to panic.
#[derive(Debug)]
pub struct TypedOptions {
  section: SectionId,
  values: BTreeMap<&'static str, OptionValue>,
}

impl TypedOptions {
  pub fn string(&self, name: &'static str) -> Result<&str, ConfigError> {
    match self.values.get(name) {
      Some(OptionValue::String(value)) => Ok(value),
      _ => Err(self.missing(name)),
    }
  }

  pub fn opt_string(&self, name: &'static str) -> Option<&str> {
    match self.values.get(name) {
      Some(OptionValue::String(value)) => Some(value),
      _ => None,
    }
  }

  pub fn integer(&self, name: &'static str) -> Result<i64, ConfigError> {
    match self.values.get(name) {
      Some(OptionValue::Integer(value)) => Ok(*value),
      _ => Err(self.missing(name)),
    }
  }

  pub fn boolean(&self, name: &'static str) -> Result<bool, ConfigError> {
    match self.values.get(name) {
      Some(OptionValue::Bool(value)) => Ok(*value),
      _ => Err(self.missing(name)),
    }
  }

  fn missing(&self, name: &str) -> ConfigError {
    ConfigError::MissingOption {
      section: self.section.clone(),
      option: name.to_string(),
    }
  }
}

/// Validate a section's raw options against `schema`.
pub fn validate(section: &ConfigSection, schema: &[OptionSpec]) -> Result<TypedOptions, ConfigError> {
  let mut values = BTreeMap::new();

  for spec in schema {
    let raw = match section.options.get(spec.name) {
      Some(value) => value.as_str(),
      None if spec.required => {
        return Err(ConfigError::MissingOption {
          section: section.id(),
          option: spec.name.to_string(),
        });
      }
      None => match spec.default {
        Some(default) => default,
        None => continue,
      },
    };
    values.insert(spec.name, coerce(section, spec, raw)?);
  }

  Ok(TypedOptions {
    section: section.id(),
    values,
  })
}

fn coerce(section: &ConfigSection, spec: &OptionSpec, raw: &str) -> Result<OptionValue, ConfigError> {
  let mismatch = || ConfigError::InvalidOptionType {
    section: section.id(),
    option: spec.name.to_string(),
    expected: spec.kind.describe(),
    value: raw.to_string(),
  };

  match spec.kind {
    OptionKind::String => Ok(OptionValue::String(raw.to_string())),
    OptionKind::Integer => raw
      .trim()
      .parse::<i64>()
      .map(OptionValue::Integer)
      .map_err(|_| mismatch()),
    OptionKind::Bool => match raw {
      "1" | "true" | "on" | "yes" => Ok(OptionValue::Bool(true)),
      "0" | "false" | "off" | "no" => Ok(OptionValue::Bool(false)),
      _ => Err(mismatch()),
    },
  }
}
