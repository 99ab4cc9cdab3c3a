//! Typed errors for the nuke pipeline
//!
//! [`ServiceError`] is what a [`ResourceService`](super::ResourceService)
//! reports for a single call. [`NukeError`] is what a pipeline stage reports,
//! carrying the identifier it was working on.

use thiserror::Error;

/// Failure of a single call to the remote resource service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The resource does not exist (terminal success for confirmation)
    #[error("Resource not found: '{identifier}'")]
    NotFound { identifier: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {message}")]
    Throttled { message: String },

    /// Any other API error, with the service's error code when it sent one
    #[error("AWS error{}: {message}", code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Api {
        code: Option<String>,
        message: String,
    },
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }

    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Api {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Pipeline-level error kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NukeError {
    /// Listing or tag lookup failed; no partial results are used
    #[error("Failed to enumerate resources: {source}")]
    Enumeration {
        #[source]
        source: ServiceError,
    },

    /// Delete request for one resource failed (recovered locally)
    #[error("Failed to delete '{identifier}': {source}")]
    DeleteFailure {
        identifier: String,
        #[source]
        source: ServiceError,
    },

    /// Resource still present after the whole polling budget
    #[error("Timed out waiting for '{identifier}' to be deleted after {attempts} checks")]
    ConfirmTimeout { identifier: String, attempts: u32 },

    /// Existence check failed with something other than not-found
    #[error("Failed to confirm deletion of '{identifier}': {source}")]
    ConfirmFailure {
        identifier: String,
        #[source]
        source: ServiceError,
    },

    /// Run interrupted by shutdown or deadline while handling `identifier`
    #[error("Run cancelled at '{identifier}'")]
    Cancelled { identifier: String },
}

impl NukeError {
    /// Identifier of the resource the error is about, if any
    pub fn identifier(&self) -> Option<&str> {
        match self {
            NukeError::Enumeration { .. } => None,
            NukeError::DeleteFailure { identifier, .. }
            | NukeError::ConfirmTimeout { identifier, .. }
            | NukeError::ConfirmFailure { identifier, .. }
            | NukeError::Cancelled { identifier } => Some(identifier),
        }
    }
}
