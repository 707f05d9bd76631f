//! Catalog engine: remote page fetching, filtered scans and index builds.
mod client;
mod engine;
mod index;
mod scanner;
mod stem;
mod types;

pub use client::{CatalogClient, ClientSettings, RemoteQuery, ReqwestCatalogClient};
pub use engine::EngineHandle;
pub use index::FilterValueIndex;
pub use scanner::FilteredPageScanner;
pub use stem::{stem_preview, MAX_STEM_PREVIEW};
pub use tokio_util::sync::CancellationToken;
pub use types::{EngineEvent, FailureKind, FetchError, IndexOutcome, RemotePage};
