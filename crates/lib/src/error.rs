//! Section-local failure taxonomy.

use thiserror::Error;

use crate::section::SectionId;

/// Fatal, section-local failures.
///
/// Any of these aborts processing of the offending section before it
/// contributes commands to the pass. Sibling sections are unaffected; there
/// is no cross-section transaction.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// A required option was not declared.
  #[error("{section}: missing required option '{option}'")]
  MissingOption { section: SectionId, option: String },

  /// An option value could not be coerced to its declared type.
  #[error("{section}: option '{option}' is not a valid {expected}: '{value}'")]
  InvalidOptionType {
    section: SectionId,
    option: String,
    expected: &'static str,
    value: String,
  },

  /// A named cross-reference did not resolve to any known section.
  #[error("{section}: no section 'config {typename} {name}' found")]
  DependencyNotFound {
    section: SectionId,
    typename: String,
    name: String,
  },

  /// The declared wireless mode is not implemented.
  #[error("{section}: unsupported mode '{mode}' (supported: ap)")]
  UnsupportedMode { section: SectionId, mode: String },

  /// The declared encryption scheme is not implemented.
  #[error("{section}: unsupported encryption '{encryption}' (supported: none, psk2)")]
  UnsupportedEncryption { section: SectionId, encryption: String },
}

impl ConfigError {
  /// Section the failure is attributed to.
  pub fn section(&self) -> &SectionId {
    match self {
      Self::MissingOption { section, .. }
      | Self::InvalidOptionType { section, .. }
      | Self::DependencyNotFound { section, .. }
      | Self::UnsupportedMode { section, .. }
      | Self::UnsupportedEncryption { section, .. } => section,
    }
  }
}
