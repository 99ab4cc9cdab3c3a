//! snapsweep: delete stale RDS snapshots across regions
//!
//! Runs one nuke pipeline per (region, resource type) pair. Regions run
//! concurrently; resource types within a region run one after another.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use futures::future::join_all;
use snapsweep::aws::{AwsContext, RdsClusterSnapshots, RdsSnapshots};
use snapsweep::config::{self, NukeConfig};
use snapsweep::nuke::{self, NukeReport, RunFailure};
use snapsweep::wait::PollConfig;
use snapsweep_common::defaults::{DEFAULT_CONFIRM_ATTEMPTS, DEFAULT_CONFIRM_INTERVAL, DEFAULT_REGION};
use snapsweep_common::{ResourceKind, RuleSet};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "snapsweep")]
#[command(about = "Delete stale RDS snapshots")]
#[command(version)]
struct Args {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Arguments for the nuke command
#[derive(clap::Args, Debug)]
struct NukeArgs {
    /// AWS region to sweep (repeatable)
    #[arg(long = "region", default_value = DEFAULT_REGION)]
    regions: Vec<String>,

    /// Resource type to nuke (repeatable, default: all)
    #[arg(long = "resource-type")]
    resource_types: Vec<ResourceKind>,

    /// Only delete resources older than N hours
    #[arg(long, conflicts_with = "exclude_after")]
    older_than_hours: Option<u64>,

    /// Only delete resources created before this RFC 3339 instant
    #[arg(long)]
    exclude_after: Option<DateTime<Utc>>,

    /// JSON rules file with include/exclude patterns
    #[arg(long, env = "SNAPSWEEP_CONFIG")]
    config: Option<PathBuf>,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long)]
    aws_profile: Option<String>,

    /// List what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Cancel all remaining work after N minutes
    #[arg(long)]
    deadline_minutes: Option<u64>,

    /// Existence checks per deleted resource before giving up
    #[arg(long, default_value_t = DEFAULT_CONFIRM_ATTEMPTS)]
    confirm_attempts: u32,

    /// Seconds between existence checks
    #[arg(long, default_value_t = DEFAULT_CONFIRM_INTERVAL.as_secs())]
    confirm_interval_secs: u64,
}

impl NukeArgs {
    fn into_config(self, now: DateTime<Utc>) -> Result<NukeConfig> {
        let cutoff = config::resolve_cutoff(now, self.older_than_hours, self.exclude_after)
            .context("--older-than-hours is out of range")?;

        Ok(NukeConfig {
            targets: config::TargetConfig {
                regions: self.regions,
                kinds: self.resource_types,
            },
            aws: config::AwsConfig {
                aws_profile: self.aws_profile,
            },
            selection: config::SelectionConfig {
                cutoff,
                rules_path: self.config,
            },
            flags: config::RuntimeFlags {
                dry_run: self.dry_run,
                poll: PollConfig {
                    interval: Duration::from_secs(self.confirm_interval_secs),
                    max_attempts: self.confirm_attempts,
                },
                deadline: self
                    .deadline_minutes
                    .map(|m| Duration::from_secs(m.saturating_mul(60))),
            },
        })
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Delete stale snapshots matching the configured rules
    Nuke(Box<NukeArgs>),

    /// List the resource types snapsweep can nuke
    ListResourceTypes,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

fn init_tracing(format: LogFormat) {
    // Keep the AWS SDK quiet unless RUST_LOG says otherwise
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,aws_config=warn,aws_sdk_rds=warn,aws_smithy_runtime=warn",
        )
    });

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    match args.command {
        Command::Nuke(nuke_args) => {
            let config = nuke_args.into_config(Utc::now())?;
            handle_nuke(config).await
        }
        Command::ListResourceTypes => {
            handle_list_resource_types();
            Ok(())
        }
    }
}

/// Handle the list-resource-types command
fn handle_list_resource_types() {
    println!("{:<24} {:<26} {:>10}", "TYPE", "DESCRIPTION", "BATCH SIZE");
    println!("{}", "-".repeat(62));
    for kind in ResourceKind::ALL {
        println!(
            "{:<24} {:<26} {:>10}",
            kind.as_str(),
            kind.description(),
            kind.max_batch_size()
        );
    }
}

/// Handle the nuke command
async fn handle_nuke(config: NukeConfig) -> Result<()> {
    if let Some(profile) = config.aws_profile() {
        info!(profile = %profile, "Using AWS profile");
    }

    let rules = config.load_rules().context("Failed to load rules file")?;
    let cutoff = config.selection.cutoff;
    let rule_sets = config
        .kinds()
        .into_iter()
        .map(|kind| rules.compile(kind, cutoff).map(|set| (kind, set)))
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid rules file")?;

    let regions = config.regions();
    info!(
        regions = ?regions,
        kinds = ?rule_sets.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
        cutoff = %cutoff,
        dry_run = config.flags.dry_run,
        "Starting sweep"
    );

    let cancel = CancellationToken::new();
    cancel_on_shutdown(cancel.clone(), config.flags.deadline);

    let results: Vec<Result<NukeReport, RunFailure>> = join_all(
        regions
            .iter()
            .map(|region| sweep_region(region, &rule_sets, &config, &cancel)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();
    cancel.cancel();

    print_summary(&results, config.flags.dry_run);

    let failed = results
        .iter()
        .filter(|r| match r {
            Ok(report) => report.is_partial_failure(),
            Err(_) => true,
        })
        .count();
    if failed > 0 {
        anyhow::bail!(
            "{failed} of {} run(s) failed or were only partially confirmed",
            results.len()
        );
    }

    Ok(())
}

/// Run every kind for one region, one after another
async fn sweep_region(
    region: &str,
    rule_sets: &[(ResourceKind, RuleSet)],
    config: &NukeConfig,
    cancel: &CancellationToken,
) -> Vec<Result<NukeReport, RunFailure>> {
    let aws = AwsContext::with_profile(region, config.aws_profile()).await;
    let options = config.options_for(region);
    let mut results = Vec::with_capacity(rule_sets.len());

    for (kind, rules) in rule_sets {
        if cancel.is_cancelled() {
            warn!(region, kind = %kind, "Cancelled, skipping remaining resource types");
            break;
        }

        let result = match kind {
            ResourceKind::RdsClusterSnapshot => {
                nuke::run(&RdsClusterSnapshots::from_context(&aws), rules, &options, cancel).await
            }
            ResourceKind::RdsSnapshot => {
                nuke::run(&RdsSnapshots::from_context(&aws), rules, &options, cancel).await
            }
        };

        if let Err(failure) = &result {
            error!(
                region,
                kind = %kind,
                identifier = ?failure.error.identifier(),
                error = %failure.error,
                "Run failed"
            );
        }
        results.push(result);
    }

    results
}

/// Cancel `cancel` on Ctrl-C or when the deadline passes
fn cancel_on_shutdown(cancel: CancellationToken, deadline: Option<Duration>) {
    tokio::spawn(async move {
        let deadline_passed = async {
            match deadline {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => warn!("Interrupt received, cancelling"),
            _ = deadline_passed => warn!(?deadline, "Deadline reached, cancelling"),
            _ = cancel.cancelled() => return,
        }
        cancel.cancel();
    });
}

fn print_summary(results: &[Result<NukeReport, RunFailure>], dry_run: bool) {
    println!("\n=== Nuke Report ===");
    println!("Mode: {}", if dry_run { "DRY-RUN" } else { "EXECUTE" });
    println!();
    println!(
        "{:<15} {:<24} {:>10} {:>9} {:>10} {:>10}  {}",
        "REGION", "TYPE", "ENUMERATED", "SELECTED", "ATTEMPTED", "CONFIRMED", "STATUS"
    );
    println!("{}", "-".repeat(92));

    for result in results {
        let (report, status) = match result {
            Ok(report) if report.is_partial_failure() => (report, "PARTIAL".to_string()),
            Ok(report) => (report, "OK".to_string()),
            Err(failure) => (failure.report.as_ref(), format!("FAILED: {}", failure.error)),
        };
        println!(
            "{:<15} {:<24} {:>10} {:>9} {:>10} {:>10}  {}",
            report.region,
            report.kind.as_str(),
            report.enumerated,
            report.selected.len(),
            report.attempted,
            report.confirmed,
            status
        );
    }

    if dry_run {
        println!("\nRun without --dry-run to actually delete resources.");
    }
}
