//! Nuke pipeline: enumerate → select → delete → confirm → report
//!
//! One run handles one resource kind in one region. Stages execute strictly
//! one after another, each consuming the full output of the previous one:
//!
//! - [`enumerate`]: paginated listing plus tags, fail-fast
//! - [`select`]: rule engine applied per resource
//! - [`delete`]: one delete request per identifier, failures tolerated
//! - [`confirm`]: poll until each deletion is visible, first error halts
//! - [`report`]: counts and per-resource outcomes
//!
//! Selected identifiers are handed to the deleter in batches of the kind's
//! maximum batch size. Each batch is confirmed before the next one is
//! deleted, so a confirmation failure leaves later batches untouched.

pub mod confirm;
pub mod delete;
pub mod enumerate;
pub mod error;
pub mod report;
pub mod select;
pub mod service;

pub use confirm::{Confirmation, confirm_all, confirm_deleted};
pub use delete::{DeleteBatch, delete_all};
pub use enumerate::enumerate;
pub use error::{NukeError, ServiceError};
pub use report::{DeletionOutcome, NukeReport};
pub use select::select;
pub use service::{ListedResource, Page, ResourceService};

use crate::wait::PollConfig;
use snapsweep_common::RuleSet;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span};

/// Per-run settings
#[derive(Debug, Clone)]
pub struct NukeOptions {
    pub region: String,
    /// Select and report only; never delete
    pub dry_run: bool,
    pub poll: PollConfig,
    /// Overrides the kind's max batch size
    pub batch_size: Option<usize>,
}

impl NukeOptions {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            dry_run: false,
            poll: PollConfig::default(),
            batch_size: None,
        }
    }
}

/// A run that stopped on a fatal error. The report holds whatever was
/// counted before the failure.
#[derive(Debug, Error)]
#[error("{} run in {} failed", report.kind, report.region)]
pub struct RunFailure {
    pub report: Box<NukeReport>,
    #[source]
    pub error: NukeError,
}

impl RunFailure {
    fn new(report: NukeReport, error: NukeError) -> Self {
        Self {
            report: Box::new(report),
            error,
        }
    }
}

/// Run the full pipeline for `service`'s kind in `options.region`.
///
/// Enumeration and confirmation errors end the run with [`RunFailure`].
/// Rejected delete requests do not: they are recorded in the report, which
/// then reports a partial failure.
pub async fn run<S: ResourceService>(
    service: &S,
    rules: &RuleSet,
    options: &NukeOptions,
    cancel: &CancellationToken,
) -> Result<NukeReport, RunFailure> {
    let span = info_span!("nuke", kind = %service.kind(), region = %options.region);
    run_stages(service, rules, options, cancel)
        .instrument(span)
        .await
}

async fn run_stages<S: ResourceService>(
    service: &S,
    rules: &RuleSet,
    options: &NukeOptions,
    cancel: &CancellationToken,
) -> Result<NukeReport, RunFailure> {
    let kind = service.kind();
    let mut report = NukeReport::new(kind, &options.region, options.dry_run);

    let resources = match enumerate(service).await {
        Ok(resources) => resources,
        Err(e) => {
            error!(error = %e, "[Failed] Enumeration aborted");
            report.emit();
            return Err(RunFailure::new(report, e));
        }
    };
    report.enumerated = resources.len();
    report.selected = select(&resources, rules);

    if report.selected.is_empty() {
        info!("No {} to nuke in region {}", kind.description(), options.region);
        return Ok(report);
    }

    if options.dry_run {
        for identifier in &report.selected {
            info!(identifier = %identifier, "[DRY RUN] Would delete");
        }
        report.emit();
        return Ok(report);
    }

    info!(
        "Deleting all {}s in region {}",
        kind.description(),
        options.region
    );

    let batch_size = options.batch_size.unwrap_or(kind.max_batch_size()).max(1);
    let selected = report.selected.clone();

    for chunk in selected.chunks(batch_size) {
        if cancel.is_cancelled() {
            let e = NukeError::Cancelled {
                identifier: chunk[0].clone(),
            };
            error!("[Failed] {e}");
            report.emit();
            return Err(RunFailure::new(report, e));
        }

        report.attempted += chunk.len();
        let batch = delete_all(service, chunk).await;
        report.delete_succeeded += batch.deleted.len();

        let confirmation = confirm_all(service, &batch.deleted, options.poll, cancel).await;
        record_batch(&mut report, chunk, batch, &confirmation);

        if let Some(e) = confirmation.halted {
            report.emit();
            return Err(RunFailure::new(report, e));
        }
    }

    report.emit();
    Ok(report)
}

/// Record one outcome per identifier of `chunk`, in chunk order
fn record_batch(
    report: &mut NukeReport,
    chunk: &[String],
    batch: DeleteBatch,
    confirmation: &Confirmation,
) {
    let mut failed: HashMap<String, ServiceError> = batch.failed.into_iter().collect();
    let confirmed: HashSet<&str> = confirmation.confirmed.iter().map(String::as_str).collect();

    for identifier in chunk {
        let outcome = if let Some(cause) = failed.remove(identifier) {
            DeletionOutcome::DeleteFailed(cause)
        } else if confirmed.contains(identifier.as_str()) {
            DeletionOutcome::Deleted
        } else {
            match &confirmation.halted {
                Some(NukeError::ConfirmTimeout { identifier: id, .. }) if id == identifier => {
                    DeletionOutcome::ConfirmTimeout
                }
                Some(NukeError::ConfirmFailure {
                    identifier: id,
                    source,
                }) if id == identifier => DeletionOutcome::ConfirmFailed(source.clone()),
                _ => DeletionOutcome::Unconfirmed,
            }
        };
        report.record(identifier.clone(), outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeService, capture_logs, listed, listed_at};
    use chrono::{TimeZone, Utc};
    use regex::Regex;
    use snapsweep_common::{Provenance, ResourceKind, RuleGroup};

    fn cutoff() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap()
    }

    fn options() -> NukeOptions {
        NukeOptions::new("us-east-1")
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn outcome_labels(report: &NukeReport) -> Vec<(&str, &str)> {
        report
            .outcomes
            .iter()
            .map(|(id, o)| (id.as_str(), o.label()))
            .collect()
    }

    #[tokio::test]
    async fn test_full_run_confirms_selected() {
        let mut automated = listed("prod-auto");
        automated.provenance = Provenance::Automated;

        let service = FakeService::new()
            .with_page(vec![listed("prod-a"), listed("prod-a-tmp")])
            .with_page(vec![
                listed("dev-a"),
                automated,
                listed_at("prod-new", cutoff()),
                listed("prod-b"),
            ]);
        let rules = RuleSet::new(cutoff()).with_names(RuleGroup::new(
            vec![Regex::new("^prod-.*").unwrap()],
            vec![Regex::new(".*-tmp$").unwrap()],
        ));
        let cancel = CancellationToken::new();

        let report = run(&service, &rules, &options(), &cancel).await.unwrap();

        assert_eq!(report.enumerated, 6);
        assert_eq!(report.selected, ids(&["prod-a", "prod-b"]));
        assert_eq!(report.attempted, 2);
        assert_eq!(report.delete_succeeded, 2);
        assert_eq!(report.confirmed, 2);
        assert!(!report.is_partial_failure());
        assert_eq!(service.delete_calls(), ids(&["prod-a", "prod-b"]));
        assert_eq!(service.describe_calls(), ids(&["prod-a", "prod-b"]));
    }

    #[tokio::test]
    async fn test_delete_failure_is_partial_not_fatal() {
        let service = FakeService::new()
            .with_page(["a", "b", "c", "d", "e"].into_iter().map(listed).collect())
            .with_delete_error("c", ServiceError::api("InvalidDBSnapshotState", "busy"));
        let cancel = CancellationToken::new();

        let report = run(&service, &RuleSet::new(cutoff()), &options(), &cancel)
            .await
            .unwrap();

        assert_eq!(report.attempted, 5);
        assert_eq!(report.delete_succeeded, 4);
        assert_eq!(report.confirmed, 4);
        assert!(report.is_partial_failure());
        assert_eq!(
            outcome_labels(&report),
            vec![
                ("a", "deleted"),
                ("b", "deleted"),
                ("c", "delete-failed"),
                ("d", "deleted"),
                ("e", "deleted"),
            ]
        );
        // The failed identifier is never polled
        assert_eq!(service.describe_calls(), ids(&["a", "b", "d", "e"]));
    }

    #[tokio::test]
    async fn test_confirm_failure_halts_and_keeps_counts() {
        let service = FakeService::new()
            .with_page(["a", "b", "c", "d"].into_iter().map(listed).collect())
            .with_describe_error("b", ServiceError::api("InternalFailure", "boom"));
        let cancel = CancellationToken::new();

        let failure = run(&service, &RuleSet::new(cutoff()), &options(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            failure.error,
            NukeError::ConfirmFailure { ref identifier, .. } if identifier == "b"
        ));
        let report = failure.report;
        assert_eq!(report.attempted, 4);
        assert_eq!(report.delete_succeeded, 4);
        assert_eq!(report.confirmed, 1);
        assert_eq!(
            outcome_labels(&report),
            vec![
                ("a", "deleted"),
                ("b", "confirm-failed"),
                ("c", "unconfirmed"),
                ("d", "unconfirmed"),
            ]
        );
        assert_eq!(service.describe_calls(), ids(&["a", "b"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_timeout_named() {
        let service = FakeService::new()
            .with_page(vec![listed("stuck")])
            .with_always_present("stuck");
        let cancel = CancellationToken::new();

        let failure = run(&service, &RuleSet::new(cutoff()), &options(), &cancel)
            .await
            .unwrap_err();

        assert_eq!(
            failure.error,
            NukeError::ConfirmTimeout {
                identifier: "stuck".to_string(),
                attempts: 90,
            }
        );
        assert_eq!(service.describe_calls().len(), 90);
        assert_eq!(outcome_labels(&failure.report), vec![("stuck", "confirm-timeout")]);
    }

    #[tokio::test]
    async fn test_enumeration_failure_deletes_nothing() {
        let service = FakeService::new()
            .with_page(vec![listed("a")])
            .with_tag_error("arn:a", ServiceError::api("AccessDenied", "no"));
        let cancel = CancellationToken::new();

        let failure = run(&service, &RuleSet::new(cutoff()), &options(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, NukeError::Enumeration { .. }));
        assert_eq!(failure.report.enumerated, 0);
        assert!(failure.report.selected.is_empty());
        assert!(service.delete_calls().is_empty());
    }

    #[tokio::test]
    async fn test_enumeration_failure_still_prints_summary() {
        let service = FakeService::new().with_page_error(0, ServiceError::api("Throttling", "slow down"));
        let cancel = CancellationToken::new();

        let (result, logs) = capture_logs(run(&service, &RuleSet::new(cutoff()), &options(), &cancel)).await;

        assert!(result.is_err());
        assert!(logs.contains("[Failed] Enumeration aborted"), "{logs}");
        assert!(logs.contains("[OK] 0 RDS DB Snapshot(s) deleted"), "{logs}");
    }

    #[tokio::test]
    async fn test_dry_run_never_deletes() {
        let service = FakeService::new().with_page(vec![listed("a"), listed("b")]);
        let cancel = CancellationToken::new();
        let options = NukeOptions {
            dry_run: true,
            ..options()
        };

        let report = run(&service, &RuleSet::new(cutoff()), &options, &cancel)
            .await
            .unwrap();

        assert_eq!(report.selected, ids(&["a", "b"]));
        assert_eq!(report.attempted, 0);
        assert!(report.dry_run);
        assert!(service.delete_calls().is_empty());
        assert!(service.describe_calls().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_selected() {
        let service = FakeService::new().with_page(vec![listed_at("new", cutoff())]);
        let cancel = CancellationToken::new();

        let report = run(&service, &RuleSet::new(cutoff()), &options(), &cancel)
            .await
            .unwrap();

        assert_eq!(report.enumerated, 1);
        assert!(report.selected.is_empty());
        assert!(service.delete_calls().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_failure_skips_later_batches() {
        let service = FakeService::new()
            .with_kind(ResourceKind::RdsClusterSnapshot)
            .with_page(["a", "b", "c", "d", "e"].into_iter().map(listed).collect())
            .with_describe_error("b", ServiceError::api("InternalFailure", "boom"));
        let cancel = CancellationToken::new();
        let options = NukeOptions {
            batch_size: Some(2),
            ..options()
        };

        let failure = run(&service, &RuleSet::new(cutoff()), &options, &cancel)
            .await
            .unwrap_err();

        assert_eq!(service.delete_calls(), ids(&["a", "b"]));
        assert_eq!(failure.report.kind, ResourceKind::RdsClusterSnapshot);
        assert_eq!(failure.report.selected.len(), 5);
        assert_eq!(failure.report.attempted, 2);
    }

    #[tokio::test]
    async fn test_batches_run_in_order() {
        let service = FakeService::new()
            .with_page(["a", "b", "c", "d", "e"].into_iter().map(listed).collect());
        let cancel = CancellationToken::new();
        let options = NukeOptions {
            batch_size: Some(2),
            ..options()
        };

        let report = run(&service, &RuleSet::new(cutoff()), &options, &cancel)
            .await
            .unwrap();

        assert_eq!(report.confirmed, 5);
        // Each batch is confirmed before the next is deleted
        assert_eq!(
            service.deletion_calls(),
            vec![
                "delete:a", "delete:b", "describe:a", "describe:b", "delete:c", "delete:d",
                "describe:c", "describe:d", "delete:e", "describe:e",
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_run_issues_no_deletes() {
        let service = FakeService::new().with_page(vec![listed("a")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let failure = run(&service, &RuleSet::new(cutoff()), &options(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, NukeError::Cancelled { .. }));
        assert!(service.delete_calls().is_empty());
        assert_eq!(failure.report.selected, ids(&["a"]));
    }

    #[tokio::test]
    async fn test_stage_sets_are_nested() {
        let service = FakeService::new()
            .with_page(["a", "b", "c", "d", "e", "f"].into_iter().map(listed).collect())
            .with_delete_error("b", ServiceError::api("X", "x"))
            .with_describe_error("e", ServiceError::api("Y", "y"));
        let rules = RuleSet::new(cutoff())
            .with_names(RuleGroup::new(vec![], vec![Regex::new("^f$").unwrap()]));
        let cancel = CancellationToken::new();

        let failure = run(&service, &rules, &options(), &cancel).await.unwrap_err();
        let report = failure.report;

        assert!(report.confirmed <= report.delete_succeeded);
        assert!(report.delete_succeeded <= report.attempted);
        assert!(report.attempted <= report.selected.len());
        assert!(report.selected.len() <= report.enumerated);
        assert_eq!(
            (report.enumerated, report.selected.len(), report.attempted),
            (6, 5, 5)
        );
        assert_eq!((report.delete_succeeded, report.confirmed), (4, 3));
    }
}
