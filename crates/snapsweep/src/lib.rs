//! snapsweep - Delete stale RDS snapshots
//!
//! The [`nuke`] pipeline enumerates every snapshot of one kind in one region,
//! applies name, tag and age rules, deletes what was selected and waits until
//! each deletion is visible.
//!
//! ## Modules
//!
//! - [`aws`]: AWS context, error classification and RDS services
//! - [`config`]: Run configuration for the CLI
//! - [`nuke`]: The pipeline stages and the `ResourceService` seam
//! - [`wait`]: Cancellable fixed-interval polling

pub mod aws;
pub mod config;
pub mod nuke;
pub mod wait;

#[cfg(test)]
mod testing;
