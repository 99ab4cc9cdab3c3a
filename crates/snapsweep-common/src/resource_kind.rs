//! Supported resource kinds
//!
//! Every kind the pipeline can nuke is a variant here. The CLI, the rules
//! file and the AWS service layer all dispatch on this enum, so adding a kind
//! means adding a variant and letting the compiler point at every match.

use std::fmt;
use std::str::FromStr;

/// Types of cloud resources snapsweep knows how to clean up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// RDS DB cluster snapshot (Aurora)
    RdsClusterSnapshot,
    /// RDS DB instance snapshot
    RdsSnapshot,
}

impl ResourceKind {
    /// All registered kinds, in the order they are processed by default
    pub const ALL: [ResourceKind; 2] = [ResourceKind::RdsClusterSnapshot, ResourceKind::RdsSnapshot];

    /// Name used on the command line and in logs
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::RdsClusterSnapshot => "rds-cluster-snapshots",
            ResourceKind::RdsSnapshot => "snapshots",
        }
    }

    /// Human-readable description for reports
    pub fn description(self) -> &'static str {
        match self {
            ResourceKind::RdsClusterSnapshot => "RDS DB Cluster Snapshot",
            ResourceKind::RdsSnapshot => "RDS DB Snapshot",
        }
    }

    /// How many identifiers to hand to the deleter per call.
    ///
    /// Advisory only: the deleter still processes its input one at a time.
    pub fn max_batch_size(self) -> usize {
        match self {
            ResourceKind::RdsClusterSnapshot => 200,
            ResourceKind::RdsSnapshot => 200,
        }
    }

    /// AWS error code returned when describing a snapshot that no longer exists
    pub fn not_found_code(self) -> &'static str {
        match self {
            ResourceKind::RdsClusterSnapshot => "DBClusterSnapshotNotFoundFault",
            ResourceKind::RdsSnapshot => "DBSnapshotNotFound",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown resource kind name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource type '{0}'")]
pub struct UnknownResourceKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownResourceKind(s.to_string()))
    }
}
