use std::collections::BTreeMap;
use std::time::Duration;

use catalog_core::{CatalogItem, Continuation, IndexRequest, ScanRequest};
use catalog_logging::catalog_trace;
use futures_util::StreamExt;
use serde::Deserialize;
use url::Url;

use crate::{FailureKind, FetchError, RemotePage};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Collection endpoint, e.g. `https://host/api/items/`.
    pub collection_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_page_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            collection_url: "http://localhost:8000/api/items/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_page_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Parameters of a first-page request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteQuery {
    pub limit: u32,
    pub params: BTreeMap<String, String>,
}

impl RemoteQuery {
    pub fn for_scan(request: &ScanRequest) -> Self {
        Self {
            limit: request.page_size,
            params: request.remote_params.clone(),
        }
    }

    pub fn for_index(request: &IndexRequest) -> Self {
        Self {
            limit: request.page_size,
            params: request.remote_params.clone(),
        }
    }
}

/// Access to the cursor-paginated remote collection.
///
/// Implementations report failures as-is: no retries, no interpretation of
/// error bodies.
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_initial(&self, query: &RemoteQuery) -> Result<RemotePage, FetchError>;

    async fn fetch_next(&self, continuation: &Continuation) -> Result<RemotePage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestCatalogClient {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestCatalogClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let base = Url::parse(&settings.collection_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn initial_url(&self, query: &RemoteQuery) -> Url {
        let mut url = self.base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            for (key, value) in &query.params {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// Cursors are normally absolute; relative ones resolve against the
    /// collection endpoint.
    fn continuation_url(&self, continuation: &Continuation) -> Result<Url, FetchError> {
        match Url::parse(continuation.as_str()) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base
                .join(continuation.as_str())
                .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string())),
            Err(err) => Err(FetchError::new(FailureKind::InvalidUrl, err.to_string())),
        }
    }

    async fn get_page(&self, url: Url) -> Result<RemotePage, FetchError> {
        catalog_trace!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_page_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "page too large",
                ));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "page too large",
                ));
            }
            body.extend_from_slice(&chunk);
        }

        decode_page(&body)
    }
}

#[async_trait::async_trait]
impl CatalogClient for ReqwestCatalogClient {
    async fn fetch_initial(&self, query: &RemoteQuery) -> Result<RemotePage, FetchError> {
        self.get_page(self.initial_url(query)).await
    }

    async fn fetch_next(&self, continuation: &Continuation) -> Result<RemotePage, FetchError> {
        let url = self.continuation_url(continuation)?;
        self.get_page(url).await
    }
}

#[derive(Debug, Deserialize)]
struct WirePage {
    #[serde(default)]
    results: Vec<WireItem>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    uid: String,
    #[serde(default)]
    primary_class_desc: Option<String>,
    #[serde(default)]
    module: Option<String>,
    #[serde(default, deserialize_with = "code_as_string")]
    difficulty: Option<String>,
    #[serde(default)]
    stem: Option<String>,
}

impl From<WireItem> for CatalogItem {
    fn from(wire: WireItem) -> Self {
        CatalogItem {
            uid: wire.uid,
            primary_class: wire.primary_class_desc,
            module: wire.module,
            difficulty: wire.difficulty,
            stem: wire.stem.unwrap_or_default(),
        }
    }
}

/// Difficulty arrives as a string code on most rows and as a bare number on
/// some older ones.
fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        Some(serde_json::Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

fn decode_page(body: &[u8]) -> Result<RemotePage, FetchError> {
    let wire: WirePage = serde_json::from_slice(body)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    Ok(RemotePage {
        items: wire.results.into_iter().map(CatalogItem::from).collect(),
        continuation: wire
            .next
            .filter(|next| !next.trim().is_empty())
            .map(Continuation::new),
    })
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
