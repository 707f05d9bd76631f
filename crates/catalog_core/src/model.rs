use std::collections::BTreeMap;
use std::fmt;

/// Identifier handed out for every scan or index build the controller starts.
pub type OpId = u64;

/// One entry of the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub uid: String,
    pub primary_class: Option<String>,
    pub module: Option<String>,
    pub difficulty: Option<String>,
    /// HTML-bearing body text, passed through untouched.
    pub stem: String,
}

impl CatalogItem {
    /// Trimmed primary class, or `None` when missing or blank.
    pub fn primary_class_key(&self) -> Option<&str> {
        self.primary_class
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn difficulty_band(&self) -> DifficultyBand {
        DifficultyBand::classify(self.difficulty.as_deref())
    }
}

/// Display bucket for the free-form difficulty code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DifficultyBand {
    Easy,
    Medium,
    Hard,
    Other(String),
    Unknown,
}

impl DifficultyBand {
    pub fn classify(code: Option<&str>) -> Self {
        let Some(raw) = code else {
            return DifficultyBand::Unknown;
        };
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() {
            DifficultyBand::Unknown
        } else if lowered == "e" || lowered.contains("easy") {
            DifficultyBand::Easy
        } else if lowered == "m" || lowered.contains("medium") {
            DifficultyBand::Medium
        } else if lowered == "h" || lowered.contains("hard") {
            DifficultyBand::Hard
        } else {
            DifficultyBand::Other(raw.to_string())
        }
    }
}

impl fmt::Display for DifficultyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyBand::Easy => write!(f, "E"),
            DifficultyBand::Medium => write!(f, "M"),
            DifficultyBand::Hard => write!(f, "H"),
            DifficultyBand::Other(raw) => write!(f, "{raw}"),
            DifficultyBand::Unknown => write!(f, "-"),
        }
    }
}

/// Opaque locator for the page following the one it came with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Continuation(String);

impl Continuation {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trims a raw filter value; blank input means "no filter".
pub fn normalize_filter(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Trimmed equality on the primary class; a missing class never matches a
/// non-blank filter.
pub fn matches_primary_class(item: &CatalogItem, filter: &str) -> bool {
    item.primary_class.as_deref().unwrap_or("").trim() == filter.trim()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    /// Start from the beginning of the collection.
    Reset,
    /// Resume from a cursor saved by an earlier scan.
    Extend(Continuation),
}

/// Everything a scanner needs to produce one batch of visible items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub mode: ScanMode,
    pub filter: Option<String>,
    pub page_size: u32,
    pub target: usize,
    pub scan_cap: u32,
    /// Equality parameters the remote honours itself, sent on the first page.
    pub remote_params: BTreeMap<String, String>,
}

impl ScanRequest {
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self.filter.as_deref() {
            Some(filter) => matches_primary_class(item, filter),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRequest {
    pub page_size: u32,
    pub scan_cap: u32,
    pub remote_params: BTreeMap<String, String>,
}

/// Why a scan stopped fetching pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// Enough matches were gathered.
    TargetReached,
    /// The remote has no further pages.
    Exhausted,
    /// The page cap was hit first; more matches may exist further on.
    CapReached,
    /// A page after the first failed; the batch holds what came before it.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanBatch {
    pub items: Vec<CatalogItem>,
    pub continuation: Option<Continuation>,
    pub stop: ScanStop,
    pub pages_fetched: u32,
}
