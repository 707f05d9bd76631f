use std::collections::BTreeSet;

use catalog_core::{CatalogItem, IndexRequest};
use catalog_logging::{catalog_debug, catalog_warn};
use tokio_util::sync::CancellationToken;

use crate::{CatalogClient, FetchError, IndexOutcome, RemoteQuery};

/// Discovers the distinct primary classes by scanning the collection from
/// its start.
///
/// The scan stops at `request.scan_cap` pages. A capped build therefore
/// returns a lower bound of the real set of classes, which is accepted as the
/// price of bounded cost. `IndexOutcome::complete` tells the two cases apart.
pub struct FilterValueIndex<'a> {
    client: &'a dyn CatalogClient,
}

impl<'a> FilterValueIndex<'a> {
    pub fn new(client: &'a dyn CatalogClient) -> Self {
        Self { client }
    }

    /// Runs one build. A cancelled build yields `FailureKind::Cancelled` and
    /// never a partial set.
    pub async fn build(
        &self,
        request: &IndexRequest,
        token: &CancellationToken,
    ) -> Result<IndexOutcome, FetchError> {
        if token.is_cancelled() {
            return Err(FetchError::cancelled());
        }
        let first = self
            .client
            .fetch_initial(&RemoteQuery::for_index(request))
            .await?;
        let mut seen = BTreeSet::new();
        collect_classes(&first.items, &mut seen);
        let mut next = first.continuation;
        let mut pages_scanned: u32 = 1;
        let mut failed = false;

        while let Some(cursor) = next.as_ref() {
            if token.is_cancelled() || pages_scanned >= request.scan_cap {
                break;
            }
            match self.client.fetch_next(cursor).await {
                Ok(page) => {
                    collect_classes(&page.items, &mut seen);
                    next = page.continuation;
                    pages_scanned += 1;
                }
                Err(err) => {
                    catalog_warn!(
                        "index build stopped after {} page(s): {}",
                        pages_scanned,
                        err
                    );
                    failed = true;
                    break;
                }
            }
        }

        if token.is_cancelled() {
            return Err(FetchError::cancelled());
        }

        let complete = next.is_none() && !failed;
        catalog_debug!(
            "index build found {} class(es) in {} page(s), complete={}",
            seen.len(),
            pages_scanned,
            complete
        );
        Ok(IndexOutcome {
            values: seen.into_iter().collect(),
            pages_scanned,
            complete,
        })
    }
}

fn collect_classes(items: &[CatalogItem], seen: &mut BTreeSet<String>) {
    for item in items {
        if let Some(class) = item.primary_class_key() {
            if !seen.contains(class) {
                seen.insert(class.to_string());
            }
        }
    }
}
