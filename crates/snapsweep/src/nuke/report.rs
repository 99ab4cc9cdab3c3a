//! Reporter: per-resource outcomes and run summary

use super::error::ServiceError;
use snapsweep_common::ResourceKind;
use std::fmt;
use tracing::{error, info};

/// Terminal state of one selected resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Deletion requested and confirmed
    Deleted,
    /// Delete request rejected
    DeleteFailed(ServiceError),
    /// Still present after the polling budget
    ConfirmTimeout,
    /// Existence check failed
    ConfirmFailed(ServiceError),
    /// Delete acknowledged but never confirmed (run halted or cancelled first)
    Unconfirmed,
}

impl DeletionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DeletionOutcome::Deleted => "deleted",
            DeletionOutcome::DeleteFailed(_) => "delete-failed",
            DeletionOutcome::ConfirmTimeout => "confirm-timeout",
            DeletionOutcome::ConfirmFailed(_) => "confirm-failed",
            DeletionOutcome::Unconfirmed => "unconfirmed",
        }
    }
}

impl fmt::Display for DeletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionOutcome::DeleteFailed(cause) | DeletionOutcome::ConfirmFailed(cause) => {
                write!(f, "{}: {cause}", self.label())
            }
            _ => f.write_str(self.label()),
        }
    }
}

/// Counts and outcomes for one (kind, region) run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NukeReport {
    pub kind: ResourceKind,
    pub region: String,
    pub dry_run: bool,
    /// Resources returned by the enumerator
    pub enumerated: usize,
    /// Identifiers chosen by the selector
    pub selected: Vec<String>,
    /// Identifiers handed to the deleter
    pub attempted: usize,
    /// Delete requests acknowledged
    pub delete_succeeded: usize,
    /// Deletions confirmed by the completion waiter
    pub confirmed: usize,
    /// Terminal state per attempted identifier, in attempt order
    pub outcomes: Vec<(String, DeletionOutcome)>,
}

impl NukeReport {
    pub fn new(kind: ResourceKind, region: impl Into<String>, dry_run: bool) -> Self {
        Self {
            kind,
            region: region.into(),
            dry_run,
            enumerated: 0,
            selected: Vec::new(),
            attempted: 0,
            delete_succeeded: 0,
            confirmed: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, identifier: impl Into<String>, outcome: DeletionOutcome) {
        if outcome == DeletionOutcome::Deleted {
            self.confirmed += 1;
        }
        self.outcomes.push((identifier.into(), outcome));
    }

    /// Fewer deletions confirmed than attempted
    pub fn is_partial_failure(&self) -> bool {
        self.confirmed < self.attempted
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.confirmed
    }

    /// Log the summary line(s) for this run
    pub fn emit(&self) {
        let what = self.kind.description();

        if self.dry_run {
            info!(
                selected = self.selected.len(),
                enumerated = self.enumerated,
                region = %self.region,
                "[DRY RUN] {} {what}(s) would be deleted",
                self.selected.len()
            );
            return;
        }

        if self.is_partial_failure() {
            error!(
                failed = self.failed(),
                attempted = self.attempted,
                region = %self.region,
                "[Failed] - {}/{} - {what}(s) failed deletion",
                self.failed(),
                self.attempted
            );
        }

        info!(
            selected = self.selected.len(),
            attempted = self.attempted,
            delete_succeeded = self.delete_succeeded,
            confirmed = self.confirmed,
            region = %self.region,
            "[OK] {} {what}(s) deleted",
            self.confirmed
        );
    }
}
