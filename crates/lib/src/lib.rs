//! gwconf-lib: declarative-to-imperative compiler for gateway configuration.
//!
//! Takes typed configuration sections (wifi radios, access points, network
//! interfaces, firewall zones), validates them against per-type schemas,
//! resolves cross-references between independently declared sections, and
//! compiles them into one priority-ordered sequence of system commands:
//!
//! - `section`: raw sections and their provenance
//! - `schema`: per-type option validation
//! - `config`: typed config objects, one variant per section type
//! - `command`: priority-tagged commands and the scheduler
//! - `execute`: strict and best-effort sequential execution
//! - `rollback`: best-effort reversal of a pass
//! - `apply`: pass orchestration (compile, apply, teardown)

pub mod apply;
pub mod command;
pub mod config;
pub mod error;
pub mod execute;
pub mod paths;
pub mod rollback;
pub mod schema;
pub mod section;
