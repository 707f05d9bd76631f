use std::fmt;

use catalog_core::{CatalogItem, Continuation, OpId, ScanBatch};
use thiserror::Error;

/// One page of the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    pub items: Vec<CatalogItem>,
    /// `None` once the collection is exhausted.
    pub continuation: Option<Continuation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutcome {
    /// Distinct trimmed primary classes, sorted.
    pub values: Vec<String>,
    pub pages_scanned: u32,
    /// False when the build stopped at its cap or on a failed page; the
    /// values are then only a lower bound.
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ScanFinished {
        scan_id: OpId,
        result: Result<ScanBatch, FetchError>,
    },
    IndexFinished {
        build_id: OpId,
        result: Result<IndexOutcome, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "superseded before completion")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed page"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
