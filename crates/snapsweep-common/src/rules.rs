//! Rule engine: decides whether a resource may be deleted
//!
//! A resource is eligible when all of the following hold:
//!
//! 1. it is not [`Provenance::Automated`](crate::Provenance::Automated),
//! 2. it was created strictly before the cutoff,
//! 3. its identifier passes the name [`RuleGroup`],
//! 4. it has no tags, or its tag keys pass the tag [`RuleGroup`]
//!    according to the configured [`TagMatch`] policy.
//!
//! This module performs no I/O.

use crate::resource::Resource;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a tag set is checked against the tag rule group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatch {
    /// Included if any single tag key passes the tag rules
    #[default]
    Any,
    /// Only the first tag key (in sorted key order) is checked
    First,
}

/// Include/exclude regex pair applied to a single string
#[derive(Debug, Clone, Default)]
pub struct RuleGroup {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl RuleGroup {
    pub fn new(include: Vec<Regex>, exclude: Vec<Regex>) -> Self {
        Self { include, exclude }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Decide whether `value` passes this group.
    ///
    /// With include patterns present, the value must match one of them and
    /// none of the exclude patterns. Without include patterns, any exclude
    /// match rejects. With no patterns at all everything passes.
    pub fn allows(&self, value: &str) -> bool {
        if !self.include.is_empty() {
            matches_any(value, &self.include) && !matches_any(value, &self.exclude)
        } else if !self.exclude.is_empty() {
            !matches_any(value, &self.exclude)
        } else {
            true
        }
    }
}

fn matches_any(value: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|re| re.is_match(value))
}

/// Reason a resource was left out of the deletion set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Exclusion {
    #[error("automated snapshots can only be removed with their parent resource")]
    Automated,

    #[error("no creation time reported")]
    MissingCreateTime,

    #[error("created at {created_at}, not before cutoff {cutoff}")]
    TooRecent {
        created_at: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    },

    #[error("identifier rejected by name rules")]
    NameRule,

    #[error("tags rejected by tag rules")]
    TagRule,
}

/// Compiled rules for one resource kind
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub names: RuleGroup,
    pub tags: RuleGroup,
    /// Resources must be created strictly before this instant
    pub cutoff: DateTime<Utc>,
    pub tag_match: TagMatch,
}

impl RuleSet {
    /// A rule set with no name or tag rules; only age and provenance apply
    pub fn new(cutoff: DateTime<Utc>) -> Self {
        Self {
            names: RuleGroup::default(),
            tags: RuleGroup::default(),
            cutoff,
            tag_match: TagMatch::default(),
        }
    }

    pub fn with_names(mut self, names: RuleGroup) -> Self {
        self.names = names;
        self
    }

    pub fn with_tags(mut self, tags: RuleGroup) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_tag_match(mut self, tag_match: TagMatch) -> Self {
        self.tag_match = tag_match;
        self
    }

    /// Strict comparison: a resource created exactly at the cutoff is too new
    pub fn is_before_cutoff(&self, created_at: DateTime<Utc>) -> bool {
        created_at < self.cutoff
    }

    /// Check a tag set against the tag rules. An empty tag set always passes.
    pub fn allows_tags(&self, tags: &HashMap<String, String>) -> bool {
        if tags.is_empty() {
            return true;
        }

        match self.tag_match {
            TagMatch::Any => tags.keys().any(|key| self.tags.allows(key)),
            TagMatch::First => tags
                .keys()
                .min()
                .is_some_and(|first| self.tags.allows(first)),
        }
    }

    /// Evaluate every rule, returning the first reason for exclusion
    pub fn evaluate(&self, resource: &Resource) -> Result<(), Exclusion> {
        if resource.provenance.is_automated() {
            return Err(Exclusion::Automated);
        }

        let created_at = resource.created_at.ok_or(Exclusion::MissingCreateTime)?;
        if !self.is_before_cutoff(created_at) {
            return Err(Exclusion::TooRecent {
                created_at,
                cutoff: self.cutoff,
            });
        }

        if !self.names.allows(&resource.identifier) {
            return Err(Exclusion::NameRule);
        }

        if !self.allows_tags(&resource.tags) {
            return Err(Exclusion::TagRule);
        }

        Ok(())
    }

    pub fn includes(&self, resource: &Resource) -> bool {
        self.evaluate(resource).is_ok()
    }
}
