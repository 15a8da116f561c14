//! Application configuration

use crate::utils::platform;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// SQLite database location
    pub database_path: PathBuf,

    /// Whole-request timeout for provider calls (seconds)
    pub http_timeout_secs: u64,

    /// Connect timeout for provider calls (seconds)
    pub connect_timeout_secs: u64,

    /// User-Agent sent to providers
    pub user_agent: String,

    /// Languages accepted for the `primary_language` setting
    pub available_languages: Vec<String>,

    /// Provider API hosts
    pub endpoints: ProviderEndpoints,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_path: platform::database_path(),
            http_timeout_secs: 15,
            connect_timeout_secs: 5,
            user_agent: format!("castdesk/{}", env!("CARGO_PKG_VERSION")),
            available_languages: vec!["en".to_string()],
            endpoints: ProviderEndpoints::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let settings: AppSettings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Loaded configuration from {:?}", path);
        Ok(settings)
    }

    /// Load from `--config` if given, otherwise from the platform config directory
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load(&platform::config_dir().join("config.json")),
        }
    }
}

/// Base URLs used for provider API requests.
///
/// Only metadata fetches go through these; the URIs built for stored files
/// always point at the public hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub bliptv: String,
    pub dailymotion: String,
    pub googlevideo: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            bliptv: "http://blip.tv".to_string(),
            dailymotion: "http://www.dailymotion.com".to_string(),
            googlevideo: "http://video.google.com".to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Point every provider at the same host (mock servers in tests)
    pub fn all(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            bliptv: base.clone(),
            dailymotion: base.clone(),
            googlevideo: base,
        }
    }
}
