//! Completion waiter: confirms that acknowledged deletions took effect
//!
//! Deletion is eventually consistent, so every acknowledged identifier is
//! polled until the service reports it as not found. Confirmation runs one
//! identifier at a time, and the first error stops the whole sequence.

use super::error::NukeError;
use super::service::ResourceService;
use crate::wait::{PollConfig, WaitError, poll_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Poll `identifier` until it is gone.
///
/// A not-found answer ends the wait successfully. Any other describe error is
/// returned at once as [`NukeError::ConfirmFailure`]. Running out of attempts
/// yields [`NukeError::ConfirmTimeout`] naming the resource.
pub async fn confirm_deleted<S: ResourceService>(
    service: &S,
    identifier: &str,
    poll: PollConfig,
    cancel: &CancellationToken,
) -> Result<(), NukeError> {
    let result = poll_until(
        poll,
        cancel,
        || async move {
            match service.describe(identifier).await {
                Ok(()) => Ok(false),
                Err(e) if e.is_not_found() => Ok(true),
                Err(e) => Err(e),
            }
        },
        identifier,
    )
    .await;

    match result {
        Ok(attempts) => {
            debug!(identifier = %identifier, attempts, "Deletion confirmed");
            Ok(())
        }
        Err(WaitError::Exhausted { attempts }) => Err(NukeError::ConfirmTimeout {
            identifier: identifier.to_string(),
            attempts,
        }),
        Err(WaitError::Cancelled { .. }) => Err(NukeError::Cancelled {
            identifier: identifier.to_string(),
        }),
        Err(WaitError::Check(source)) => Err(NukeError::ConfirmFailure {
            identifier: identifier.to_string(),
            source,
        }),
    }
}

/// Outcome of confirming a sequence of deletions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Identifiers confirmed gone, in order
    pub confirmed: Vec<String>,
    /// The error that stopped the sequence, if any
    pub halted: Option<NukeError>,
}

/// Confirm each identifier in order, stopping at the first error.
///
/// Identifiers after the failing one are not polled at all.
pub async fn confirm_all<S: ResourceService>(
    service: &S,
    identifiers: &[String],
    poll: PollConfig,
    cancel: &CancellationToken,
) -> Confirmation {
    let mut confirmation = Confirmation::default();

    for identifier in identifiers {
        match confirm_deleted(service, identifier, poll, cancel).await {
            Ok(()) => confirmation.confirmed.push(identifier.clone()),
            Err(e) => {
                error!(identifier = %identifier, "[Failed] {e}");
                confirmation.halted = Some(e);
                break;
            }
        }
    }

    confirmation
}
