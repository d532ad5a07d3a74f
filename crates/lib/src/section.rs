//! Declarative configuration sections.
//!
//! Sections are produced by the external configuration front-end and are the
//! immutable input of a reconfiguration pass. Option values arrive as raw
//! strings; the schema validator turns them into typed attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a section: its `typename` and declared name.
///
/// Used for cross-references between sections and for attributing commands
/// and errors to the declaration that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionId {
  pub typename: String,
  pub name: String,
}

impl fmt::Display for SectionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "config {} {}", self.typename, self.name)
  }
}

/// Where a section was declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSource {
  /// Path of the file the section came from.
  pub file: String,
  /// Line the section starts on, when the front-end reports one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub line: Option<u32>,
}

impl fmt::Display for SectionSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.line {
      Some(line) => write!(f, "{}:{}", self.file, line),
      None => write!(f, "{}", self.file),
    }
  }
}

/// A raw declarative section, as handed over by the front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSection {
  pub typename: String,
  pub name: String,
  #[serde(default)]
  pub source: SectionSource,
  #[serde(default)]
  pub options: BTreeMap<String, String>,
}

impl ConfigSection {
  pub fn id(&self) -> SectionId {
    SectionId {
      typename: self.typename.clone(),
      name: self.name.clone(),
    }
  }
}
