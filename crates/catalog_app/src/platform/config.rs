use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog_core::BrowserSettings;
use catalog_engine::ClientSettings;
use catalog_logging::catalog_info;
use serde::Deserialize;
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILENAME: &str = "catalog.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// On-disk configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub collection_url: String,
    pub page_size: u32,
    pub load_more_target: usize,
    pub filter_scan_cap: u32,
    pub index_scan_cap: u32,
    pub index_page_size: u32,
    pub quiescence_delay_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub remote_params: BTreeMap<String, String>,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let browser = BrowserSettings::default();
        let client = ClientSettings::default();
        Self {
            collection_url: client.collection_url,
            page_size: browser.page_size,
            load_more_target: browser.load_more_target,
            filter_scan_cap: browser.filter_scan_cap,
            index_scan_cap: browser.index_scan_cap,
            index_page_size: browser.index_page_size,
            quiescence_delay_ms: browser.quiescence_delay.as_millis() as u64,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            remote_params: browser.remote_params,
            log_destination: LogDestination::File,
        }
    }
}

impl AppConfig {
    /// Loads `path`, or `./catalog.ron` when no path is given. A missing
    /// default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
        };
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        let config: AppConfig =
            ron::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        config.validate()?;
        catalog_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.index_page_size == 0 {
            return Err(ConfigError::Invalid("page sizes must be positive".into()));
        }
        if self.filter_scan_cap == 0 || self.index_scan_cap == 0 {
            return Err(ConfigError::Invalid("scan caps must be positive".into()));
        }
        if self.load_more_target == 0 {
            return Err(ConfigError::Invalid("load_more_target must be positive".into()));
        }
        Ok(())
    }

    pub fn browser_settings(&self) -> BrowserSettings {
        BrowserSettings {
            page_size: self.page_size,
            load_more_target: self.load_more_target,
            filter_scan_cap: self.filter_scan_cap,
            index_scan_cap: self.index_scan_cap,
            index_page_size: self.index_page_size,
            quiescence_delay: Duration::from_millis(self.quiescence_delay_ms),
            remote_params: self.remote_params.clone(),
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            collection_url: self.collection_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientSettings::default()
        }
    }
}
