//! Enumerator: full paginated listing plus per-resource tags

use super::error::NukeError;
use super::service::{ListedResource, ResourceService};
use snapsweep_common::Resource;
use tracing::debug;

/// List every resource of the service's kind and fetch each one's tags.
///
/// Fail-fast: the first listing or tag error aborts enumeration and nothing
/// collected so far is returned.
pub async fn enumerate<S: ResourceService>(service: &S) -> Result<Vec<Resource>, NukeError> {
    let listed = list_all(service).await?;

    let mut resources = Vec::with_capacity(listed.len());
    for item in listed {
        let tags = service
            .get_tags(&item.tag_handle)
            .await
            .map_err(|source| NukeError::Enumeration { source })?;

        resources.push(Resource {
            identifier: item.identifier,
            created_at: item.created_at,
            provenance: item.provenance,
            tags,
        });
    }

    debug!(count = resources.len(), kind = %service.kind(), "Enumerated resources");
    Ok(resources)
}

async fn list_all<S: ResourceService>(service: &S) -> Result<Vec<ListedResource>, NukeError> {
    let mut items = Vec::new();
    let mut token = None;
    let mut pages = 0usize;

    loop {
        let page = service
            .list_page(token.take())
            .await
            .map_err(|source| NukeError::Enumeration { source })?;
        pages += 1;
        items.extend(page.items);

        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    debug!(pages, count = items.len(), "Listing complete");
    Ok(items)
}
