#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use catalog_core::{CatalogItem, Continuation};
use catalog_engine::{
    CancellationToken, CatalogClient, FailureKind, FetchError, RemotePage, RemoteQuery,
};

pub fn init_logging() {
    catalog_logging::initialize_for_tests();
}

pub fn item(uid: impl Into<String>, class: Option<&str>) -> CatalogItem {
    CatalogItem {
        uid: uid.into(),
        primary_class: class.map(str::to_string),
        module: Some("math".to_string()),
        difficulty: Some("M".to_string()),
        stem: String::new(),
    }
}

/// `count` pages of `per_page` items, all in class `class`.
pub fn uniform_pages(count: usize, per_page: usize, class: &str) -> Vec<Vec<CatalogItem>> {
    (0..count)
        .map(|p| {
            (0..per_page)
                .map(|i| item(format!("p{p}-{i}"), Some(class)))
                .collect()
        })
        .collect()
}

/// In-memory paginated collection. Cursors look like `page:N`.
#[derive(Default)]
pub struct FakeCatalog {
    pages: Vec<Vec<CatalogItem>>,
    failures: HashMap<usize, FailureKind>,
    cancel_on: Option<(usize, CancellationToken)>,
    delay: Option<Duration>,
    log: Arc<Mutex<Vec<String>>>,
}

impl FakeCatalog {
    pub fn new(pages: Vec<Vec<CatalogItem>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Fetching page `index` fails with `kind`.
    pub fn failing_at(mut self, index: usize, kind: FailureKind) -> Self {
        self.failures.insert(index, kind);
        self
    }

    /// Cancels `token` while page `index` is being fetched.
    pub fn cancelling_at(mut self, index: usize, token: CancellationToken) -> Self {
        self.cancel_on = Some((index, token));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    async fn serve(&self, index: usize) -> Result<RemotePage, FetchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((at, token)) = &self.cancel_on {
            if *at == index {
                token.cancel();
            }
        }
        if let Some(kind) = self.failures.get(&index) {
            return Err(FetchError {
                kind: kind.clone(),
                message: format!("page {index} failed"),
            });
        }
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let continuation = if index + 1 < self.pages.len() {
            Some(Continuation::new(format!("page:{}", index + 1)))
        } else {
            None
        };
        Ok(RemotePage {
            items,
            continuation,
        })
    }
}

#[async_trait::async_trait]
impl CatalogClient for FakeCatalog {
    async fn fetch_initial(&self, query: &RemoteQuery) -> Result<RemotePage, FetchError> {
        let params: Vec<String> = query
            .params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        self.log
            .lock()
            .unwrap()
            .push(format!("initial limit={} {}", query.limit, params.join("&")).trim_end().to_string());
        self.serve(0).await
    }

    async fn fetch_next(&self, continuation: &Continuation) -> Result<RemotePage, FetchError> {
        self.log
            .lock()
            .unwrap()
            .push(continuation.as_str().to_string());
        let index = continuation
            .as_str()
            .strip_prefix("page:")
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| FetchError {
                kind: FailureKind::InvalidUrl,
                message: continuation.as_str().to_string(),
            })?;
        self.serve(index).await
    }
}
