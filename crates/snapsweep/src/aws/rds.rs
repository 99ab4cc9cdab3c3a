//! RDS snapshot services
//!
//! [`RdsClusterSnapshots`] and [`RdsSnapshots`] implement
//! [`ResourceService`] on top of the RDS API. Listing uses `Marker`
//! pagination, tags come from `ListTagsForResource` on the snapshot ARN, and
//! existence checks describe a single identifier.

use super::context::AwsContext;
use super::error::from_sdk;
use crate::nuke::{ListedResource, Page, ResourceService, ServiceError};
use aws_sdk_rds::Client;
use aws_sdk_rds::types::Tag;
use chrono::{DateTime, Utc};
use snapsweep_common::defaults::DEFAULT_PAGE_SIZE;
use snapsweep_common::{Provenance, ResourceKind};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Aurora DB cluster snapshots
#[derive(Debug, Clone)]
pub struct RdsClusterSnapshots {
    client: Client,
}

impl RdsClusterSnapshots {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.rds_client(),
        }
    }
}

impl ResourceService for RdsClusterSnapshots {
    fn kind(&self) -> ResourceKind {
        ResourceKind::RdsClusterSnapshot
    }

    async fn list_page(&self, token: Option<String>) -> Result<Page, ServiceError> {
        let response = self
            .client
            .describe_db_cluster_snapshots()
            .set_marker(token)
            .max_records(DEFAULT_PAGE_SIZE)
            .send()
            .await
            .map_err(|e| from_sdk(&e, self.kind().as_str()))?;

        let mut items = Vec::with_capacity(response.db_cluster_snapshots().len());
        for snapshot in response.db_cluster_snapshots() {
            let (Some(identifier), Some(arn)) = (
                snapshot.db_cluster_snapshot_identifier(),
                snapshot.db_cluster_snapshot_arn(),
            ) else {
                warn!(?snapshot, "Skipping cluster snapshot without identifier or ARN");
                continue;
            };

            items.push(ListedResource {
                identifier: identifier.to_string(),
                tag_handle: arn.to_string(),
                created_at: snapshot.snapshot_create_time().and_then(to_utc),
                provenance: Provenance::from_snapshot_type(snapshot.snapshot_type()),
            });
        }

        debug!(count = items.len(), "Listed DB cluster snapshots page");
        Ok(Page {
            items,
            next_token: response.marker().map(str::to_string),
        })
    }

    async fn get_tags(&self, tag_handle: &str) -> Result<HashMap<String, String>, ServiceError> {
        list_tags(&self.client, tag_handle).await
    }

    async fn delete(&self, identifier: &str) -> Result<(), ServiceError> {
        self.client
            .delete_db_cluster_snapshot()
            .db_cluster_snapshot_identifier(identifier)
            .send()
            .await
            .map_err(|e| from_sdk(&e, identifier))?;
        Ok(())
    }

    async fn describe(&self, identifier: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .describe_db_cluster_snapshots()
            .db_cluster_snapshot_identifier(identifier)
            .send()
            .await
            .map_err(|e| from_sdk(&e, identifier))?;

        exists(response.db_cluster_snapshots().is_empty(), identifier)
    }
}

/// DB instance snapshots
#[derive(Debug, Clone)]
pub struct RdsSnapshots {
    client: Client,
}

impl RdsSnapshots {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.rds_client(),
        }
    }
}

impl ResourceService for RdsSnapshots {
    fn kind(&self) -> ResourceKind {
        ResourceKind::RdsSnapshot
    }

    async fn list_page(&self, token: Option<String>) -> Result<Page, ServiceError> {
        let response = self
            .client
            .describe_db_snapshots()
            .set_marker(token)
            .max_records(DEFAULT_PAGE_SIZE)
            .send()
            .await
            .map_err(|e| from_sdk(&e, self.kind().as_str()))?;

        let mut items = Vec::with_capacity(response.db_snapshots().len());
        for snapshot in response.db_snapshots() {
            let (Some(identifier), Some(arn)) =
                (snapshot.db_snapshot_identifier(), snapshot.db_snapshot_arn())
            else {
                warn!(?snapshot, "Skipping DB snapshot without identifier or ARN");
                continue;
            };

            items.push(ListedResource {
                identifier: identifier.to_string(),
                tag_handle: arn.to_string(),
                created_at: snapshot.snapshot_create_time().and_then(to_utc),
                provenance: Provenance::from_snapshot_type(snapshot.snapshot_type()),
            });
        }

        debug!(count = items.len(), "Listed DB snapshots page");
        Ok(Page {
            items,
            next_token: response.marker().map(str::to_string),
        })
    }

    async fn get_tags(&self, tag_handle: &str) -> Result<HashMap<String, String>, ServiceError> {
        list_tags(&self.client, tag_handle).await
    }

    async fn delete(&self, identifier: &str) -> Result<(), ServiceError> {
        self.client
            .delete_db_snapshot()
            .db_snapshot_identifier(identifier)
            .send()
            .await
            .map_err(|e| from_sdk(&e, identifier))?;
        Ok(())
    }

    async fn describe(&self, identifier: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .describe_db_snapshots()
            .db_snapshot_identifier(identifier)
            .send()
            .await
            .map_err(|e| from_sdk(&e, identifier))?;

        exists(response.db_snapshots().is_empty(), identifier)
    }
}

async fn list_tags(client: &Client, arn: &str) -> Result<HashMap<String, String>, ServiceError> {
    let response = client
        .list_tags_for_resource()
        .resource_name(arn)
        .send()
        .await
        .map_err(|e| from_sdk(&e, arn))?;

    Ok(extract_tags(response.tag_list()))
}

/// Extract key/value pairs from RDS tags, skipping tags without a key
fn extract_tags(tags: &[Tag]) -> HashMap<String, String> {
    tags.iter()
        .filter_map(|t| {
            let key = t.key()?;
            Some((key.to_string(), t.value().unwrap_or_default().to_string()))
        })
        .collect()
}

fn to_utc(dt: &aws_sdk_rds::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

/// An empty describe result counts as not found
fn exists(empty: bool, identifier: &str) -> Result<(), ServiceError> {
    if empty {
        Err(ServiceError::NotFound {
            identifier: identifier.to_string(),
        })
    } else {
        Ok(())
    }
}
