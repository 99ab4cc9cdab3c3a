//! Enumerated resource snapshot
//!
//! A [`Resource`] is a read-only copy of remote state taken during one
//! pipeline run. Nothing downstream mutates it; each stage derives a new
//! collection from the previous one.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Snapshot type reported by RDS for system-managed backups
const AUTOMATED: &str = "automated";

/// Who owns the lifecycle of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Created and removed by the platform together with a parent resource.
    /// Cannot be deleted on its own.
    Automated,
    /// Created by a user
    Manual,
    /// Any other provenance the platform reports (shared, public, awsbackup, ...)
    Other(String),
}

impl Provenance {
    /// Map an RDS `SnapshotType` value onto a provenance flag
    pub fn from_snapshot_type(snapshot_type: Option<&str>) -> Self {
        match snapshot_type {
            Some(AUTOMATED) => Provenance::Automated,
            Some("manual") | None => Provenance::Manual,
            Some(other) => Provenance::Other(other.to_string()),
        }
    }

    pub fn is_automated(&self) -> bool {
        matches!(self, Provenance::Automated)
    }
}

/// A resource discovered by the enumerator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Identifier used for delete and describe calls
    pub identifier: String,
    /// Creation time, if the service reported one
    pub created_at: Option<DateTime<Utc>>,
    /// Lifecycle ownership
    pub provenance: Provenance,
    /// Tag key -> tag value
    pub tags: HashMap<String, String>,
}

impl Resource {
    /// Create an untagged manual resource
    pub fn new(identifier: impl Into<String>, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            identifier: identifier.into(),
            created_at,
            provenance: Provenance::Manual,
            tags: HashMap::new(),
        }
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}
