//! Run configuration for the `nuke` command

use crate::nuke::NukeOptions;
use crate::wait::PollConfig;
use chrono::{DateTime, TimeDelta, Utc};
use snapsweep_common::{ConfigError, ResourceKind, RulesConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Where to sweep
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// AWS regions, processed concurrently
    pub regions: Vec<String>,
    /// Resource kinds, processed in order within each region
    pub kinds: Vec<ResourceKind>,
}

/// AWS credentials configuration
#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    /// AWS profile name (overrides default credential resolution)
    pub aws_profile: Option<String>,
}

/// What to select
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Only resources created strictly before this instant are eligible
    pub cutoff: DateTime<Utc>,
    /// JSON rules file; no file means no name or tag rules
    pub rules_path: Option<PathBuf>,
}

/// Runtime behavior flags
#[derive(Debug, Clone, Default)]
pub struct RuntimeFlags {
    /// Report what would be deleted without deleting
    pub dry_run: bool,
    /// Confirmation polling budget per resource
    pub poll: PollConfig,
    /// Cancel everything still running after this long
    pub deadline: Option<Duration>,
}

/// Configuration for a `nuke` invocation
#[derive(Debug, Clone)]
pub struct NukeConfig {
    pub targets: TargetConfig,
    pub aws: AwsConfig,
    pub selection: SelectionConfig,
    pub flags: RuntimeFlags,
}

impl NukeConfig {
    /// Regions with duplicates removed, first occurrence wins
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = Vec::with_capacity(self.targets.regions.len());
        for region in &self.targets.regions {
            if !regions.contains(&region.as_str()) {
                regions.push(region);
            }
        }
        regions
    }

    /// Kinds to process; every registered kind when none were requested
    pub fn kinds(&self) -> Vec<ResourceKind> {
        if self.targets.kinds.is_empty() {
            return ResourceKind::ALL.to_vec();
        }
        let mut kinds = Vec::with_capacity(self.targets.kinds.len());
        for kind in &self.targets.kinds {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }

    pub fn aws_profile(&self) -> Option<&str> {
        self.aws.aws_profile.as_deref()
    }

    /// Load the rules file, or return empty rules when none is configured
    pub fn load_rules(&self) -> Result<RulesConfig, ConfigError> {
        match &self.selection.rules_path {
            Some(path) => RulesConfig::load(path),
            None => Ok(RulesConfig::default()),
        }
    }

    /// Pipeline options for one region
    pub fn options_for(&self, region: &str) -> NukeOptions {
        NukeOptions {
            region: region.to_string(),
            dry_run: self.flags.dry_run,
            poll: self.flags.poll,
            batch_size: None,
        }
    }
}

/// Compute the age cutoff.
///
/// An explicit instant wins over a relative age; with neither, the cutoff is
/// `now`. Returns `None` when the age reaches outside the representable range.
pub fn resolve_cutoff(
    now: DateTime<Utc>,
    older_than_hours: Option<u64>,
    exclude_after: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match (exclude_after, older_than_hours) {
        (Some(instant), _) => Some(instant),
        (None, Some(hours)) => {
            let age = TimeDelta::try_hours(i64::try_from(hours).ok()?)?;
            now.checked_sub_signed(age)
        }
        (None, None) => Some(now),
    }
}
