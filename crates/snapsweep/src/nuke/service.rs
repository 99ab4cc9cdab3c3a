//! Remote resource service trait
//!
//! One implementation per resource kind. The pipeline only talks to a kind
//! through this trait, which keeps it independent of request/response field
//! mapping and lets tests substitute a mock.

use super::error::ServiceError;
use chrono::{DateTime, Utc};
use snapsweep_common::{Provenance, ResourceKind};
use std::collections::HashMap;

/// One entry of a listing page, before tags are fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedResource {
    /// Identifier used for delete and describe calls
    pub identifier: String,
    /// Handle used for tag lookups (the ARN for AWS kinds)
    pub tag_handle: String,
    pub created_at: Option<DateTime<Utc>>,
    pub provenance: Provenance,
}

/// A single page of a paginated listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<ListedResource>,
    /// Token for the next page; `None` on the last page
    pub next_token: Option<String>,
}

/// Operations the pipeline needs from a resource kind.
///
/// Calls are awaited one at a time by the pipeline.
#[allow(async_fn_in_trait)] // Used through generics only, never spawned
#[cfg_attr(test, mockall::automock)]
pub trait ResourceService {
    /// Which kind this service manages
    fn kind(&self) -> ResourceKind;

    /// Fetch one page of the listing, starting at `token` (`None` = first page)
    async fn list_page(&self, token: Option<String>) -> Result<Page, ServiceError>;

    /// Fetch the tag set of one resource
    async fn get_tags(&self, tag_handle: &str) -> Result<HashMap<String, String>, ServiceError>;

    /// Request deletion of one resource
    async fn delete(&self, identifier: &str) -> Result<(), ServiceError>;

    /// Check whether a resource still exists.
    ///
    /// `Ok(())` means it exists; `Err(ServiceError::NotFound)` means it is gone.
    async fn describe(&self, identifier: &str) -> Result<(), ServiceError>;
}
