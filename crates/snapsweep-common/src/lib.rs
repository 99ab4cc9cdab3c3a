//! snapsweep-common - Shared types and rule evaluation
//!
//! This crate holds everything the nuke pipeline needs to decide *what* to
//! delete, without any AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Default polling, paging and region values
//! - [`error`]: Rules configuration errors
//! - [`resource`]: Enumerated resource snapshot and provenance flag
//! - [`resource_kind`]: Registry of supported resource kinds
//! - [`rules`]: Name/tag/age rule engine
//! - [`rules_config`]: JSON rules file and its compilation into a [`RuleSet`]

pub mod defaults;
pub mod error;
pub mod resource;
pub mod resource_kind;
pub mod rules;
pub mod rules_config;

// Re-export commonly used types
pub use error::ConfigError;
pub use resource::{Provenance, Resource};
pub use resource_kind::ResourceKind;
pub use rules::{Exclusion, RuleGroup, RuleSet, TagMatch};
pub use rules_config::RulesConfig;
