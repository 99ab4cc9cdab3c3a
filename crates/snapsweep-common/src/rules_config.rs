//! Rules file loading from JSON
//!
//! The file holds one section per resource kind; each section has an
//! `include` and an `exclude` block with name and tag-key patterns.
//! Sections may be omitted, in which case no name or tag rules apply to that
//! kind. The age cutoff is not part of the file: it is supplied by the
//! caller when the rules are compiled.

use crate::error::ConfigError;
use crate::resource_kind::ResourceKind;
use crate::rules::{RuleGroup, RuleSet, TagMatch};
use chrono::{DateTime, Utc};
use garde::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name and tag-key patterns for one side (include or exclude) of a rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PatternLists {
    #[serde(default)]
    #[garde(inner(length(min = 1)))]
    pub names_regex: Vec<String>,

    #[serde(default)]
    #[garde(inner(length(min = 1)))]
    pub tags_regex: Vec<String>,
}

/// Include/exclude rules for a single resource kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct KindRules {
    #[serde(default)]
    #[garde(dive)]
    pub include: PatternLists,

    #[serde(default)]
    #[garde(dive)]
    pub exclude: PatternLists,
}

/// Top-level rules file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Tag evaluation policy shared by every kind
    #[serde(default)]
    #[garde(skip)]
    pub tag_match: TagMatch,

    #[serde(default)]
    #[garde(dive)]
    pub rds_cluster_snapshots: KindRules,

    #[serde(default)]
    #[garde(dive)]
    pub rds_snapshots: KindRules,
}

/// Key of a kind's section in the rules file
fn section_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::RdsClusterSnapshot => "rds_cluster_snapshots",
        ResourceKind::RdsSnapshot => "rds_snapshots",
    }
}

impl RulesConfig {
    /// Load and validate a rules file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        Self::from_json(&content)
    }

    /// Parse and validate rules from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn rules_for(&self, kind: ResourceKind) -> &KindRules {
        match kind {
            ResourceKind::RdsClusterSnapshot => &self.rds_cluster_snapshots,
            ResourceKind::RdsSnapshot => &self.rds_snapshots,
        }
    }

    /// Compile the patterns for `kind` into a [`RuleSet`] with the given cutoff
    pub fn compile(
        &self,
        kind: ResourceKind,
        cutoff: DateTime<Utc>,
    ) -> Result<RuleSet, ConfigError> {
        let rules = self.rules_for(kind);
        let section = section_name(kind);

        let names = RuleGroup::new(
            compile_patterns(section, "include.names_regex", &rules.include.names_regex)?,
            compile_patterns(section, "exclude.names_regex", &rules.exclude.names_regex)?,
        );
        let tags = RuleGroup::new(
            compile_patterns(section, "include.tags_regex", &rules.include.tags_regex)?,
            compile_patterns(section, "exclude.tags_regex", &rules.exclude.tags_regex)?,
        );

        Ok(RuleSet::new(cutoff)
            .with_names(names)
            .with_tags(tags)
            .with_tag_match(self.tag_match))
    }
}

fn compile_patterns(
    section: &str,
    field: &str,
    patterns: &[String],
) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                field: format!("{section}.{field}"),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}
