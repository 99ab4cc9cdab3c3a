//! AWS error classification
//!
//! Maps SDK errors onto [`ServiceError`] using the `.code()` metadata instead
//! of matching on Debug output.

use crate::nuke::ServiceError;
use aws_sdk_rds::error::{DisplayErrorContext, ProvideErrorMetadata};
use snapsweep_common::ResourceKind;

/// Codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

fn is_not_found_code(code: &str) -> bool {
    ResourceKind::ALL
        .iter()
        .any(|kind| kind.not_found_code() == code)
}

/// Classify an AWS error by its code.
///
/// `identifier` is the resource the call was about, reported back in
/// [`ServiceError::NotFound`].
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>, identifier: &str) -> ServiceError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if is_not_found_code(c) => ServiceError::NotFound {
            identifier: identifier.to_string(),
        },
        Some(c) if THROTTLING_CODES.contains(&c) => ServiceError::Throttled { message },
        _ => ServiceError::Api {
            code: code.map(str::to_string),
            message,
        },
    }
}

/// Classify an SDK operation error.
///
/// Errors without a service message (timeouts, dispatch failures) keep the
/// full source chain as their message.
pub fn from_sdk<E>(error: &E, identifier: &str) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let meta = error.meta();
    match meta.message() {
        Some(message) => classify_aws_error(meta.code(), Some(message), identifier),
        None => {
            let message = DisplayErrorContext(error).to_string();
            classify_aws_error(meta.code(), Some(&message), identifier)
        }
    }
}
