use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::cache_entry::{DEFAULT_CACHE_KEY, DEFAULT_EXPIRY_SECS, DEFAULT_RETENTION_HOURS};
use crate::errors::CoreError;

/// Default holdings endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://35dee773a9ec441e9f38d5fc249406ce.api.mockbin.io/";

/// Default timeout for the single holdings request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration for the holdings feed.
///
/// Every field has a default, so a partial JSON document is enough:
/// `{"cache_path": "/var/lib/app/holdings.cache"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// URL of the holdings endpoint.
    pub endpoint: String,

    /// Key under which the snapshot is cached.
    pub cache_key: String,

    /// How long a cached snapshot counts as valid, in seconds.
    pub cache_expiry_secs: f64,

    /// Cleanup purges entries older than this, in hours.
    pub cache_retention_hours: i64,

    /// Timeout for the network request, in seconds.
    pub request_timeout_secs: u64,

    /// Where the cache file lives. `None` keeps the cache in memory only.
    pub cache_path: Option<PathBuf>,

    /// Report `AllSourcesFailed` (network + cache errors) instead of the
    /// plain `NoDataAvailable` when the cache read itself fails.
    pub detailed_errors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            cache_expiry_secs: DEFAULT_EXPIRY_SECS,
            cache_retention_hours: DEFAULT_RETENTION_HOURS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_path: None,
            detailed_errors: false,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read settings file {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.endpoint.trim().is_empty() {
            return Err(CoreError::Config("endpoint must not be empty".into()));
        }
        if self.cache_key.trim().is_empty() {
            return Err(CoreError::Config("cache_key must not be empty".into()));
        }
        if !self.cache_expiry_secs.is_finite() || self.cache_expiry_secs <= 0.0 {
            return Err(CoreError::Config(format!(
                "cache_expiry_secs must be a positive number of seconds, got {}",
                self.cache_expiry_secs
            )));
        }
        if self.cache_retention_hours <= 0
            || chrono::Duration::try_hours(self.cache_retention_hours).is_none()
        {
            return Err(CoreError::Config(format!(
                "cache_retention_hours must be a positive, representable number of hours, got {}",
                self.cache_retention_hours
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    /// Retention ceiling for cleanup. Out-of-range values (rejected by
    /// [`validate`](Self::validate)) fall back to the 24 hour default.
    pub fn cache_retention(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.cache_retention_hours)
            .filter(|d| *d > chrono::Duration::zero())
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_RETENTION_HOURS))
    }
}
