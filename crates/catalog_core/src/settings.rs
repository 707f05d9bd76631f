use std::collections::BTreeMap;
use std::time::Duration;

/// Tunables for the browsing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    /// Page size, and match target, for a fresh load.
    pub page_size: u32,
    /// Match target for one "load more" while a filter is active.
    pub load_more_target: usize,
    /// Page cap per filtered scan call.
    pub filter_scan_cap: u32,
    /// Page cap for one index build.
    pub index_scan_cap: u32,
    pub index_page_size: u32,
    pub quiescence_delay: Duration,
    /// Fixed equality parameters sent with every initial query.
    pub remote_params: BTreeMap<String, String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            page_size: 50,
            load_more_target: 50,
            filter_scan_cap: 40,
            index_scan_cap: 200,
            index_page_size: 200,
            quiescence_delay: Duration::from_millis(200),
            remote_params: BTreeMap::new(),
        }
    }
}
