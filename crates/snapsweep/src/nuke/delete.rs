//! Deleter: one delete request per identifier, tolerant of individual failures

use super::error::{NukeError, ServiceError};
use super::service::ResourceService;
use tracing::{error, info};

/// Result of submitting a batch of identifiers for deletion
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteBatch {
    /// Identifiers whose delete request was acknowledged, in input order
    pub deleted: Vec<String>,
    /// Identifiers whose delete request failed, with the cause
    pub failed: Vec<(String, ServiceError)>,
}

impl DeleteBatch {
    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }
}

/// Issue a delete request for every identifier, sequentially and in order.
///
/// A failing request is logged and recorded; the loop carries on with the
/// remaining identifiers. Nothing is retried.
pub async fn delete_all<S: ResourceService>(service: &S, identifiers: &[String]) -> DeleteBatch {
    let mut batch = DeleteBatch::default();
    if identifiers.is_empty() {
        return batch;
    }

    let kind = service.kind();
    info!(count = identifiers.len(), kind = %kind, "Deleting {}s", kind.description());

    for identifier in identifiers {
        match service.delete(identifier).await {
            Ok(()) => {
                info!(identifier = %identifier, "Deleted {}", kind.description());
                batch.deleted.push(identifier.clone());
            }
            Err(source) => {
                let failure = NukeError::DeleteFailure {
                    identifier: identifier.clone(),
                    source: source.clone(),
                };
                error!(identifier = %identifier, "[Failed] {failure}");
                batch.failed.push((identifier.clone(), source));
            }
        }
    }

    batch
}
