use catalog_core::{
    matches_primary_class, CatalogItem, Continuation, ScanBatch, ScanMode, ScanRequest, ScanStop,
};
use catalog_logging::{catalog_debug, catalog_warn};
use tokio_util::sync::CancellationToken;

use crate::{CatalogClient, FailureKind, FetchError, RemotePage, RemoteQuery};

/// Walks remote pages until enough items match, the collection runs out, or
/// the page cap is hit.
///
/// Pages are fetched strictly one after another; every fetch needs the cursor
/// of the page before it. Only the first fetch of a reset scan can fail a
/// filtered call. A failure on any later page, or on the first page of a
/// filtered extend, ends the scan early with what was gathered so far,
/// reported as [`ScanStop::Interrupted`].
pub struct FilteredPageScanner<'a> {
    client: &'a dyn CatalogClient,
}

impl<'a> FilteredPageScanner<'a> {
    pub fn new(client: &'a dyn CatalogClient) -> Self {
        Self { client }
    }

    pub async fn scan(
        &self,
        request: &ScanRequest,
        token: &CancellationToken,
    ) -> Result<ScanBatch, FetchError> {
        match request.filter.as_deref() {
            None => self.single_page(request, token).await,
            Some(filter) => {
                self.scan_until(request, |item| matches_primary_class(item, filter), token)
                    .await
            }
        }
    }

    /// Unfiltered browsing: one page, returned as the remote sent it.
    async fn single_page(
        &self,
        request: &ScanRequest,
        token: &CancellationToken,
    ) -> Result<ScanBatch, FetchError> {
        let page = self.first_page(request, token).await?;
        let stop = if page.continuation.is_some() {
            ScanStop::TargetReached
        } else {
            ScanStop::Exhausted
        };
        Ok(ScanBatch {
            items: page.items,
            continuation: page.continuation,
            stop,
            pages_fetched: 1,
        })
    }

    /// Filtered scan with an arbitrary predicate.
    ///
    /// The match count may overshoot `request.target` by up to one page of
    /// matches; nothing is trimmed.
    pub async fn scan_until<P>(
        &self,
        request: &ScanRequest,
        predicate: P,
        token: &CancellationToken,
    ) -> Result<ScanBatch, FetchError>
    where
        P: Fn(&CatalogItem) -> bool + Send + Sync,
    {
        let first = match self.first_page(request, token).await {
            Ok(page) => page,
            Err(err) => return resume_failure(request, err),
        };
        let mut pages_fetched: u32 = 1;
        let mut matches: Vec<CatalogItem> =
            first.items.into_iter().filter(|item| predicate(item)).collect();
        let mut continuation: Option<Continuation> = first.continuation;

        let stop = loop {
            if matches.len() >= request.target {
                break ScanStop::TargetReached;
            }
            let Some(next) = continuation.as_ref() else {
                break ScanStop::Exhausted;
            };
            if pages_fetched >= request.scan_cap {
                break ScanStop::CapReached;
            }
            if token.is_cancelled() {
                return Err(FetchError::cancelled());
            }
            match self.client.fetch_next(next).await {
                Ok(page) => {
                    pages_fetched += 1;
                    matches.extend(page.items.into_iter().filter(|item| predicate(item)));
                    continuation = page.continuation;
                }
                Err(err) => {
                    catalog_warn!(
                        "scan stopped after {} page(s), next page failed: {}",
                        pages_fetched,
                        err
                    );
                    break ScanStop::Interrupted;
                }
            }
        };

        catalog_debug!(
            "scan finished: {:?} matches={} pages={}",
            stop,
            matches.len(),
            pages_fetched
        );
        Ok(ScanBatch {
            items: matches,
            continuation,
            stop,
            pages_fetched,
        })
    }

    async fn first_page(
        &self,
        request: &ScanRequest,
        token: &CancellationToken,
    ) -> Result<RemotePage, FetchError> {
        if token.is_cancelled() {
            return Err(FetchError::cancelled());
        }
        match &request.mode {
            ScanMode::Reset => {
                self.client
                    .fetch_initial(&RemoteQuery::for_scan(request))
                    .await
            }
            ScanMode::Extend(continuation) => self.client.fetch_next(continuation).await,
        }
    }
}

/// A filtered extend that cannot fetch its first page yields an empty batch
/// that keeps the saved cursor, so a later "load more" retries it.
fn resume_failure(request: &ScanRequest, err: FetchError) -> Result<ScanBatch, FetchError> {
    match &request.mode {
        ScanMode::Extend(saved) if err.kind != FailureKind::Cancelled => {
            catalog_warn!("scan could not resume from {}: {}", saved, err);
            Ok(ScanBatch {
                items: Vec::new(),
                continuation: Some(saved.clone()),
                stop: ScanStop::Interrupted,
                pages_fetched: 0,
            })
        }
        _ => Err(err),
    }
}
