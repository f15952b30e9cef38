use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::holding::HoldingSnapshot;

/// A tagged result older than this is reported as stale.
pub const STALE_AFTER_SECS: i64 = 300;

/// Where a [`TaggedSnapshot`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSource {
    /// Fresh response from the remote endpoint
    Network,
    /// Served from the local cache (valid, or stale after a network failure)
    Cache,
    /// Static demo data, used only when no other source produced anything
    Fallback,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Network => write!(f, "network"),
            DataSource::Cache => write!(f, "cache"),
            DataSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Read-only result handed to the presentation layer. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedSnapshot {
    pub holdings: HoldingSnapshot,
    pub source: DataSource,
    pub fetched_at: DateTime<Utc>,
}

impl TaggedSnapshot {
    pub fn new(holdings: HoldingSnapshot, source: DataSource, fetched_at: DateTime<Utc>) -> Self {
        Self {
            holdings,
            source,
            fetched_at,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }

    /// `now − fetched_at > 300s`
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now - self.fetched_at > Duration::seconds(STALE_AFTER_SECS)
    }

    /// Label shown next to the data, e.g. "Cached Data (Stale)".
    pub fn describe_at(&self, now: DateTime<Utc>) -> &'static str {
        let stale = self.is_stale_at(now);
        match (self.source, stale) {
            (DataSource::Network, false) => "Live Data",
            (DataSource::Network, true) => "Live Data (Stale)",
            (DataSource::Cache, false) => "Cached Data",
            (DataSource::Cache, true) => "Cached Data (Stale)",
            (DataSource::Fallback, _) => "Demo Data",
        }
    }
}
