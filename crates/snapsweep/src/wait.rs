//! Fixed-interval polling with cancellation support.
//!
//! Provides a generic abstraction for waiting on an AWS resource (or any async
//! condition) to reach a terminal state, with a bounded number of attempts and
//! a cancellable delay between them.

use backon::{BackoffBuilder, ConstantBuilder};
use snapsweep_common::defaults::{DEFAULT_CONFIRM_ATTEMPTS, DEFAULT_CONFIRM_INTERVAL};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Polling budget: how many checks, and how long to sleep between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two checks
    pub interval: Duration,
    /// Total number of checks (at least one check always runs)
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CONFIRM_INTERVAL,
            max_attempts: DEFAULT_CONFIRM_ATTEMPTS,
        }
    }
}

impl PollConfig {
    /// Upper bound on time spent sleeping for a single resource.
    ///
    /// The first check runs immediately, so 90 checks 10 s apart sleep
    /// 89 times (890 s, just under 15 minutes).
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Why a poll loop ended without reaching its terminal condition
#[derive(Debug, Error)]
pub enum WaitError<E> {
    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error(transparent)]
    Check(E),
}

/// Poll `check` until it returns `Ok(true)`.
///
/// Uses `backon::ConstantBuilder` for the delay schedule and `tokio::select!`
/// for cancellation support.
///
/// # Arguments
/// * `config` - Poll budget
/// * `cancel` - Cancellation token; cancelling it interrupts the current delay
/// * `check` - Async function that returns `Ok(true)` when done, `Ok(false)` to retry
/// * `resource_name` - Name for logging
///
/// # Returns
/// * `Ok(attempts)` - The condition held on the given attempt
/// * `Err(WaitError::Check)` - `check` failed; returned immediately without retry
/// * `Err(WaitError::Exhausted)` - `max_attempts` checks all returned `Ok(false)`
/// * `Err(WaitError::Cancelled)` - The token was cancelled
pub async fn poll_until<F, Fut, E>(
    config: PollConfig,
    cancel: &CancellationToken,
    mut check: F,
    resource_name: &str,
) -> Result<u32, WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut delays = ConstantBuilder::default()
        .with_delay(config.interval)
        .with_max_times(config.max_attempts.saturating_sub(1) as usize)
        .build();
    let mut attempts = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled { attempts });
        }

        attempts += 1;
        if check().await.map_err(WaitError::Check)? {
            debug!(resource = %resource_name, attempts, "Terminal state reached");
            return Ok(attempts);
        }

        let Some(delay) = delays.next() else {
            return Err(WaitError::Exhausted { attempts });
        };

        debug!(
            resource = %resource_name,
            attempt = attempts,
            delay_ms = delay.as_millis(),
            "Not there yet, retrying"
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => {
                return Err(WaitError::Cancelled { attempts });
            }
        }
    }
}
